//! Booking database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Booking, BookingStatus, PriceBreakdown, StayDates};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub villa_id: Uuid,
    pub guest_id: Uuid,
    pub check_in: Date,
    pub check_out: Date,
    pub guests: i32,
    pub notes: Option<String>,
    pub status: String,
    pub nightly_rate_cents: i64,
    pub nights: i64,
    pub subtotal_cents: i64,
    pub cleaning_fee_cents: i64,
    pub service_fee_cents: i64,
    pub total_cents: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Booking {
    fn from(model: Model) -> Self {
        Booking {
            id: model.id,
            villa_id: model.villa_id,
            guest_id: model.guest_id,
            // Rows are written through StayDates::new, so the range is valid
            dates: StayDates {
                check_in: model.check_in,
                check_out: model.check_out,
            },
            guests: model.guests,
            notes: model.notes,
            status: BookingStatus::parse(&model.status).unwrap_or(BookingStatus::Cancelled),
            price: PriceBreakdown {
                nightly_rate_cents: model.nightly_rate_cents,
                nights: model.nights,
                subtotal_cents: model.subtotal_cents,
                cleaning_fee_cents: model.cleaning_fee_cents,
                service_fee_cents: model.service_fee_cents,
                total_cents: model.total_cents,
            },
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
