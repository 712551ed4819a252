//! Villa database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Villa, VillaStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "villas")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub address: String,
    pub price_per_night_cents: i64,
    pub cleaning_fee_cents: i64,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Villa {
    fn from(model: Model) -> Self {
        Villa {
            id: model.id,
            owner_id: model.owner_id,
            title: model.title,
            description: model.description,
            location: model.location,
            address: model.address,
            price_per_night_cents: model.price_per_night_cents,
            cleaning_fee_cents: model.cleaning_fee_cents,
            max_guests: model.max_guests,
            bedrooms: model.bedrooms,
            bathrooms: model.bathrooms,
            // Unknown values are hidden rather than exposed
            status: VillaStatus::parse(&model.status).unwrap_or(VillaStatus::Inactive),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
