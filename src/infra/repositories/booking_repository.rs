//! Booking repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Select, Set,
};
use uuid::Uuid;

use super::entities::{booking, villa};
use super::paging::fetch_page;
use crate::domain::{Booking, BookingChanges, BookingStatus, NewBooking, StayDates};
use crate::errors::{AppError, AppResult};
use crate::types::{Page, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>>;

    /// Whether a pending or confirmed booking on the villa overlaps `dates`.
    async fn has_overlap(
        &self,
        villa_id: Uuid,
        dates: StayDates,
        exclude: Option<Uuid>,
    ) -> AppResult<bool>;

    async fn list_for_guest(
        &self,
        guest_id: Uuid,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>>;

    /// Bookings on any villa owned by `host_id`.
    async fn list_for_host(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>>;

    async fn list_all(
        &self,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>>;

    /// Move a booking from `from` to `to`. Fails with a conflict if the
    /// stored status is no longer `from`.
    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Booking>;

    async fn update_details(&self, id: Uuid, changes: BookingChanges) -> AppResult<Booking>;

    /// Blocking stays on the villa that touch `[from, to)`.
    async fn blocked_ranges(
        &self,
        villa_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<StayDates>>;

    async fn count_by_status(&self, status: BookingStatus) -> AppResult<u64>;
}

pub struct BookingStore {
    db: DatabaseConnection,
}

impl BookingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn blocking_statuses() -> Vec<&'static str> {
    BookingStatus::blocking().iter().map(|s| s.as_str()).collect()
}

fn overlapping(villa_id: Uuid, from: NaiveDate, to: NaiveDate) -> Select<booking::Entity> {
    booking::Entity::find()
        .filter(booking::Column::VillaId.eq(villa_id))
        .filter(booking::Column::Status.is_in(blocking_statuses()))
        .filter(booking::Column::CheckIn.lt(to))
        .filter(booking::Column::CheckOut.gt(from))
}

fn with_status(query: Select<booking::Entity>, status: Option<BookingStatus>) -> Select<booking::Entity> {
    match status {
        Some(status) => query.filter(booking::Column::Status.eq(status.as_str())),
        None => query,
    }
}

pub(crate) async fn booking_overlaps<C: ConnectionTrait>(
    db: &C,
    villa_id: Uuid,
    dates: StayDates,
    exclude: Option<Uuid>,
) -> AppResult<bool> {
    let mut query = overlapping(villa_id, dates.check_in, dates.check_out);
    if let Some(id) = exclude {
        query = query.filter(booking::Column::Id.ne(id));
    }
    Ok(query.count(db).await? > 0)
}

/// Edit guests and notes; the status filter keeps a concurrent
/// confirmation from being overwritten.
async fn update_pending_details<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    changes: BookingChanges,
) -> AppResult<Booking> {
    let mut update = booking::Entity::update_many()
        .col_expr(booking::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(booking::Column::Id.eq(id))
        .filter(booking::Column::Status.eq(BookingStatus::Pending.as_str()));
    if let Some(guests) = changes.guests {
        update = update.col_expr(booking::Column::Guests, Expr::value(guests));
    }
    if let Some(notes) = changes.notes {
        let notes = notes.trim().to_string();
        let notes = if notes.is_empty() { None } else { Some(notes) };
        update = update.col_expr(booking::Column::Notes, Expr::value(notes));
    }

    if update.exec(db).await?.rows_affected == 0 {
        return Err(AppError::conflict("Only pending bookings can be edited"));
    }

    booking::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(Booking::from)
        .ok_or(AppError::NotFound)
}

pub(crate) async fn insert_booking<C: ConnectionTrait>(
    db: &C,
    new_booking: NewBooking,
) -> AppResult<Booking> {
    let now = chrono::Utc::now();
    let price = new_booking.price;
    let model = booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        villa_id: Set(new_booking.villa_id),
        guest_id: Set(new_booking.guest_id),
        check_in: Set(new_booking.dates.check_in),
        check_out: Set(new_booking.dates.check_out),
        guests: Set(new_booking.guests),
        notes: Set(new_booking.notes),
        status: Set(BookingStatus::Pending.as_str().to_string()),
        nightly_rate_cents: Set(price.nightly_rate_cents),
        nights: Set(price.nights),
        subtotal_cents: Set(price.subtotal_cents),
        cleaning_fee_cents: Set(price.cleaning_fee_cents),
        service_fee_cents: Set(price.service_fee_cents),
        total_cents: Set(price.total_cents),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    Ok(Booking::from(model))
}

#[async_trait]
impl BookingRepository for BookingStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(booking::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Booking::from))
    }

    async fn has_overlap(
        &self,
        villa_id: Uuid,
        dates: StayDates,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        booking_overlaps(&self.db, villa_id, dates, exclude).await
    }

    async fn list_for_guest(
        &self,
        guest_id: Uuid,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>> {
        let query = booking::Entity::find()
            .filter(booking::Column::GuestId.eq(guest_id))
            .order_by_desc(booking::Column::CheckIn);
        let query = with_status(query, status);
        Ok(fetch_page(&self.db, query, &params).await?.map(Booking::from))
    }

    async fn list_for_host(
        &self,
        host_id: Uuid,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>> {
        let query = booking::Entity::find()
            .filter(
                booking::Column::VillaId.in_subquery(
                    Query::select()
                        .column(villa::Column::Id)
                        .from(villa::Entity)
                        .and_where(villa::Column::OwnerId.eq(host_id))
                        .to_owned(),
                ),
            )
            .order_by_desc(booking::Column::CheckIn);
        let query = with_status(query, status);
        Ok(fetch_page(&self.db, query, &params).await?.map(Booking::from))
    }

    async fn list_all(
        &self,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>> {
        let query = with_status(
            booking::Entity::find().order_by_desc(booking::Column::CreatedAt),
            status,
        );
        Ok(fetch_page(&self.db, query, &params).await?.map(Booking::from))
    }

    async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> AppResult<Booking> {
        let result = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(to.as_str()))
            .col_expr(booking::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(from.as_str()))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::conflict("Booking status changed concurrently"));
        }

        booking::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Booking::from)
            .ok_or(AppError::NotFound)
    }

    async fn update_details(&self, id: Uuid, changes: BookingChanges) -> AppResult<Booking> {
        update_pending_details(&self.db, id, changes).await
    }


    async fn blocked_ranges(
        &self,
        villa_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<StayDates>> {
        let rows = overlapping(villa_id, from, to)
            .order_by_asc(booking::Column::CheckIn)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|b| StayDates {
                check_in: b.check_in,
                check_out: b.check_out,
            })
            .collect())
    }

    async fn count_by_status(&self, status: BookingStatus) -> AppResult<u64> {
        Ok(booking::Entity::find()
            .filter(booking::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await?)
    }
}
