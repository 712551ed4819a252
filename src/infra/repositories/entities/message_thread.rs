use sea_orm::entity::prelude::*;

use crate::domain::MessageThread;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "message_threads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub booking_id: Uuid,
    pub guest_id: Uuid,
    pub host_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MessageThread {
    fn from(model: Model) -> Self {
        MessageThread {
            id: model.id,
            booking_id: model.booking_id,
            guest_id: model.guest_id,
            host_id: model.host_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
