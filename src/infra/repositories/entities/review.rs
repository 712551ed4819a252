//! Review database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::Review;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub booking_id: Uuid,
    pub villa_id: Uuid,
    pub author_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub is_visible: bool,
    pub is_flagged: bool,
    pub flag_reason: Option<String>,
    pub host_reply: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Review {
    fn from(model: Model) -> Self {
        Review {
            id: model.id,
            booking_id: model.booking_id,
            villa_id: model.villa_id,
            author_id: model.author_id,
            rating: model.rating,
            comment: model.comment,
            is_visible: model.is_visible,
            is_flagged: model.is_flagged,
            flag_reason: model.flag_reason,
            host_reply: model.host_reply,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
