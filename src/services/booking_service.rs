//! Booking service: reservations and their status workflow.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::support::{notify, today};
use crate::config::MAX_MESSAGE_LENGTH;
use crate::domain::{
    Actor, Booking, BookingAction, BookingChanges, BookingParty, BookingPolicy, BookingStatus,
    NewBooking, NewNotification, NotificationKind, StayDates, Villa, VillaStatus,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{is_serialization_failure, UnitOfWork};
use crate::types::{Page, PaginationParams};

/// A guest's request to reserve a villa
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub villa_id: Uuid,
    pub dates: StayDates,
    pub guests: i32,
    pub notes: Option<String>,
}

#[async_trait]
pub trait BookingService: Send + Sync {
    /// Create a pending booking. Overlapping dates are a conflict.
    async fn create(&self, actor: Actor, request: BookingRequest) -> AppResult<Booking>;

    /// Visible to the guest, the villa owner and admins.
    async fn get(&self, actor: Actor, id: Uuid) -> AppResult<Booking>;

    async fn list_mine(
        &self,
        actor: Actor,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>>;

    async fn list_for_host(
        &self,
        actor: Actor,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>>;

    /// Guest edits of party size and notes while the booking is pending.
    async fn update(&self, actor: Actor, id: Uuid, changes: BookingChanges) -> AppResult<Booking>;

    async fn change_status(&self, actor: Actor, id: Uuid, action: BookingAction) -> AppResult<Booking>;
}

pub struct BookingManager<U: UnitOfWork> {
    uow: Arc<U>,
    policy: BookingPolicy,
}

impl<U: UnitOfWork> BookingManager<U> {
    pub fn new(uow: Arc<U>, policy: BookingPolicy) -> Self {
        Self { uow, policy }
    }

    /// Load a booking with its villa and the caller's relation to it.
    async fn load_for(&self, actor: Actor, id: Uuid) -> AppResult<(Booking, Villa, BookingParty)> {
        let booking = self
            .uow
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        let villa = self
            .uow
            .villas()
            .find_by_id(booking.villa_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let party = BookingParty::resolve(&booking, villa.owner_id, actor.id, actor.role)
            .ok_or(AppError::Forbidden)?;
        Ok((booking, villa, party))
    }
}

fn clean_notes(notes: Option<String>) -> AppResult<Option<String>> {
    let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    if notes
        .as_ref()
        .is_some_and(|n| n.chars().count() as u64 > MAX_MESSAGE_LENGTH)
    {
        return Err(AppError::validation(format!(
            "Notes are limited to {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(notes)
}

fn unavailable() -> AppError {
    AppError::conflict("The villa is already booked for some of these dates")
}

#[async_trait]
impl<U: UnitOfWork> BookingService for BookingManager<U> {
    async fn create(&self, actor: Actor, request: BookingRequest) -> AppResult<Booking> {
        let villa = match self.uow.villas().find_by_id(request.villa_id).await? {
            Some(villa) if villa.status != VillaStatus::Deleted => villa,
            _ => return Err(AppError::NotFound),
        };
        if villa.is_owned_by(actor.id) {
            return Err(AppError::validation("You cannot book your own villa"));
        }

        let price = self
            .policy
            .quote(&villa, &request.dates, request.guests, today())?;
        let notes = clean_notes(request.notes)?;

        if self
            .uow
            .bookings()
            .has_overlap(villa.id, request.dates, None)
            .await?
        {
            return Err(unavailable());
        }

        let new_booking = NewBooking {
            villa_id: villa.id,
            guest_id: actor.id,
            dates: request.dates,
            guests: request.guests,
            notes,
            price,
        };

        // Re-check inside a serializable transaction so two concurrent
        // requests cannot both pass the check above.
        let booking = self
            .uow
            .transaction_serializable(move |ctx| {
                Box::pin(async move {
                    let bookings = ctx.bookings();
                    if bookings
                        .has_overlap(new_booking.villa_id, new_booking.dates, None)
                        .await?
                    {
                        return Err(unavailable());
                    }
                    bookings.create(new_booking).await
                })
            })
            .await
            .map_err(|e| match e {
                AppError::Database(db) if is_serialization_failure(&db) => unavailable(),
                other => other,
            })?;

        tracing::info!(
            booking_id = %booking.id,
            villa_id = %booking.villa_id,
            guest_id = %booking.guest_id,
            nights = booking.price.nights,
            total_cents = booking.price.total_cents,
            "booking created"
        );

        notify(
            self.uow.as_ref(),
            NewNotification::new(
                villa.owner_id,
                NotificationKind::BookingRequested,
                "New booking request",
                format!(
                    "{} requested {} to {} ({} guests)",
                    villa.title, booking.dates.check_in, booking.dates.check_out, booking.guests
                ),
                Some(booking.id),
            ),
        )
        .await;

        Ok(booking)
    }

    async fn get(&self, actor: Actor, id: Uuid) -> AppResult<Booking> {
        let (booking, _, _) = self.load_for(actor, id).await?;
        Ok(booking)
    }

    async fn list_mine(
        &self,
        actor: Actor,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>> {
        self.uow.bookings().list_for_guest(actor.id, status, params).await
    }

    async fn list_for_host(
        &self,
        actor: Actor,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>> {
        if !actor.role.can_list_villas() {
            return Err(AppError::Forbidden);
        }
        self.uow.bookings().list_for_host(actor.id, status, params).await
    }

    async fn update(&self, actor: Actor, id: Uuid, changes: BookingChanges) -> AppResult<Booking> {
        let (booking, villa, party) = self.load_for(actor, id).await?;
        if party != BookingParty::Guest {
            return Err(AppError::Forbidden);
        }
        if booking.status != BookingStatus::Pending {
            return Err(AppError::validation("Only pending bookings can be edited"));
        }
        if let Some(guests) = changes.guests {
            villa.check_capacity(guests)?;
        }
        let changes = BookingChanges {
            guests: changes.guests,
            // Some("") clears the notes, None leaves them alone
            notes: match changes.notes {
                Some(notes) => Some(clean_notes(Some(notes))?.unwrap_or_default()),
                None => None,
            },
        };

        let updated = self.uow.bookings().update_details(id, changes).await?;

        notify(
            self.uow.as_ref(),
            NewNotification::new(
                villa.owner_id,
                NotificationKind::BookingUpdated,
                "Booking updated",
                format!("A guest updated their request for {}", villa.title),
                Some(updated.id),
            ),
        )
        .await;

        Ok(updated)
    }

    async fn change_status(&self, actor: Actor, id: Uuid, action: BookingAction) -> AppResult<Booking> {
        let (booking, villa, party) = self.load_for(actor, id).await?;
        let next = booking.check_action(action, party, today())?;

        let updated = self
            .uow
            .bookings()
            .update_status(id, booking.status, next)
            .await?;

        tracing::info!(
            booking_id = %id,
            actor_id = %actor.id,
            from = %booking.status,
            to = %next,
            "booking status changed"
        );

        let recipients = match party {
            BookingParty::Guest => vec![villa.owner_id],
            BookingParty::Host => vec![booking.guest_id],
            BookingParty::Admin => vec![booking.guest_id, villa.owner_id],
        };
        for user_id in recipients {
            notify(
                self.uow.as_ref(),
                NewNotification::new(
                    user_id,
                    NotificationKind::BookingStatusChanged,
                    format!("Booking {}", next),
                    format!(
                        "The booking for {} ({} to {}) is now {}",
                        villa.title, booking.dates.check_in, booking.dates.check_out, next
                    ),
                    Some(id),
                ),
            )
            .await;
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::repositories::entities::booking as booking_entity;
    use crate::services::test_support::{
        booking, count_row, delivered, mock_db, stay, villa, BuiltUnitOfWork, TestUnitOfWork,
        SERIALIZATION_FAILURE,
    };
    use chrono::Utc;
    use mockall::predicate::eq;
    use sea_orm::{DbErr, RuntimeErr};

    const POLICY: BookingPolicy = BookingPolicy {
        service_fee_percent: 10,
        max_nights: 90,
    };

    fn service(uow: TestUnitOfWork) -> BookingManager<BuiltUnitOfWork> {
        BookingManager::new(uow.build(), POLICY)
    }

    fn guest() -> Actor {
        Actor::new(Uuid::new_v4(), UserRole::Guest)
    }

    /// The row Postgres hands back from the booking insert.
    fn stored(villa_id: Uuid, guest_id: Uuid, dates: StayDates) -> booking_entity::Model {
        let now = Utc::now();
        booking_entity::Model {
            id: Uuid::new_v4(),
            villa_id,
            guest_id,
            check_in: dates.check_in,
            check_out: dates.check_out,
            guests: 2,
            notes: None,
            status: "pending".to_string(),
            nightly_rate_cents: 15_000,
            nights: dates.nights(),
            subtotal_cents: 15_000 * dates.nights(),
            cleaning_fee_cents: 3_000,
            service_fee_cents: 1_500 * dates.nights(),
            total_cents: 16_500 * dates.nights() + 3_000,
            created_at: now,
            updated_at: now,
        }
    }

    /// Villa lookup and the pre-check pass; the transaction decides.
    fn bookable(uow: &mut TestUnitOfWork, host_id: Uuid) {
        uow.villas
            .expect_find_by_id()
            .returning(move |id| Ok(Some(villa(id, host_id, 4))));
        uow.bookings
            .expect_has_overlap()
            .times(1)
            .returning(|_, _, _| Ok(false));
    }

    #[tokio::test]
    async fn create_inserts_inside_the_transaction_and_notifies_host() {
        let me = guest();
        let host_id = Uuid::new_v4();
        let villa_id = Uuid::new_v4();
        let dates = stay(14, 4);
        let db = mock_db()
            .append_query_results([[count_row(0)]])
            .append_query_results([[stored(villa_id, me.id, dates)]])
            .into_connection();

        let mut uow = TestUnitOfWork::default();
        bookable(&mut uow, host_id);
        uow.notifications
            .expect_create()
            .withf(move |n| n.user_id == host_id && n.kind == NotificationKind::BookingRequested)
            .times(1)
            .returning(delivered);
        uow.db = Some(db.clone());

        let created = service(uow)
            .create(me, request(villa_id, dates, 2))
            .await
            .unwrap();
        assert_eq!(created.villa_id, villa_id);
        assert_eq!(created.guest_id, me.id);
        assert_eq!(created.status, BookingStatus::Pending);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("COUNT(*)"));
        assert!(log.contains("INSERT INTO"));
    }

    #[tokio::test]
    async fn create_recheck_inside_transaction_rejects_overlap() {
        let db = mock_db().append_query_results([[count_row(1)]]).into_connection();

        let mut uow = TestUnitOfWork::default();
        bookable(&mut uow, Uuid::new_v4());
        uow.notifications.expect_create().never();
        uow.db = Some(db.clone());

        let result = service(uow)
            .create(guest(), request(Uuid::new_v4(), stay(14, 4), 2))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("INSERT INTO"));
    }

    #[tokio::test]
    async fn create_maps_serialization_failure_to_conflict() {
        let db = mock_db()
            .append_query_results([[count_row(0)]])
            .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                SERIALIZATION_FAILURE.to_string(),
            ))])
            .into_connection();

        let mut uow = TestUnitOfWork::default();
        bookable(&mut uow, Uuid::new_v4());
        uow.notifications.expect_create().never();
        uow.db = Some(db);

        let result = service(uow)
            .create(guest(), request(Uuid::new_v4(), stay(14, 4), 2))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_keeps_other_insert_failures_as_database_errors() {
        let db = mock_db()
            .append_query_results([[count_row(0)]])
            .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                "connection reset by peer".to_string(),
            ))])
            .into_connection();

        let mut uow = TestUnitOfWork::default();
        bookable(&mut uow, Uuid::new_v4());
        uow.db = Some(db);

        let result = service(uow)
            .create(guest(), request(Uuid::new_v4(), stay(14, 4), 2))
            .await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    fn request(villa_id: Uuid, dates: StayDates, guests: i32) -> BookingRequest {
        BookingRequest {
            villa_id,
            dates,
            guests,
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_rejects_overlapping_dates() {
        let villa_id = Uuid::new_v4();
        let dates = stay(14, 4);
        let mut uow = TestUnitOfWork::default();
        uow.villas
            .expect_find_by_id()
            .returning(|id| Ok(Some(villa(id, Uuid::new_v4(), 4))));
        uow.bookings
            .expect_has_overlap()
            .with(eq(villa_id), eq(dates), eq(None))
            .returning(|_, _, _| Ok(true));

        let result = service(uow).create(guest(), request(villa_id, dates, 2)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn create_rejects_over_capacity() {
        let mut uow = TestUnitOfWork::default();
        uow.villas
            .expect_find_by_id()
            .returning(|id| Ok(Some(villa(id, Uuid::new_v4(), 4))));
        uow.bookings.expect_has_overlap().never();

        let result = service(uow)
            .create(guest(), request(Uuid::new_v4(), stay(14, 4), 5))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_rejects_past_check_in() {
        let mut uow = TestUnitOfWork::default();
        uow.villas
            .expect_find_by_id()
            .returning(|id| Ok(Some(villa(id, Uuid::new_v4(), 4))));

        let result = service(uow)
            .create(guest(), request(Uuid::new_v4(), stay(-2, 4), 2))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_rejects_own_villa() {
        let host = Actor::new(Uuid::new_v4(), UserRole::Host);
        let mut uow = TestUnitOfWork::default();
        uow.villas
            .expect_find_by_id()
            .returning(move |id| Ok(Some(villa(id, host.id, 4))));

        let result = service(uow)
            .create(host, request(Uuid::new_v4(), stay(14, 2), 2))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_rejects_unknown_villa() {
        let mut uow = TestUnitOfWork::default();
        uow.villas.expect_find_by_id().returning(|_| Ok(None));

        let result = service(uow)
            .create(guest(), request(Uuid::new_v4(), stay(14, 2), 2))
            .await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn strangers_cannot_view_bookings() {
        let mut uow = TestUnitOfWork::default();
        uow.bookings.expect_find_by_id().returning(|id| {
            let mut b = booking(Uuid::new_v4(), Uuid::new_v4(), BookingStatus::Pending, stay(5, 2));
            b.id = id;
            Ok(Some(b))
        });
        uow.villas
            .expect_find_by_id()
            .returning(|id| Ok(Some(villa(id, Uuid::new_v4(), 4))));

        let result = service(uow).get(guest(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn host_confirms_pending_booking_and_guest_is_notified() {
        let host = Actor::new(Uuid::new_v4(), UserRole::Host);
        let guest_id = Uuid::new_v4();
        let pending = booking(Uuid::new_v4(), guest_id, BookingStatus::Pending, stay(10, 3));
        let booking_id = pending.id;

        let mut uow = TestUnitOfWork::default();
        let found = pending.clone();
        uow.bookings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        uow.villas
            .expect_find_by_id()
            .returning(move |id| Ok(Some(villa(id, host.id, 4))));
        let confirmed = pending.clone();
        uow.bookings
            .expect_update_status()
            .with(eq(booking_id), eq(BookingStatus::Pending), eq(BookingStatus::Confirmed))
            .times(1)
            .returning(move |_, _, to| {
                let mut b = confirmed.clone();
                b.status = to;
                Ok(b)
            });
        uow.notifications
            .expect_create()
            .withf(move |n| n.user_id == guest_id && n.kind == NotificationKind::BookingStatusChanged)
            .times(1)
            .returning(delivered);

        let updated = service(uow)
            .change_status(host, booking_id, BookingAction::Confirm)
            .await
            .unwrap();
        assert_eq!(updated.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn guest_cannot_confirm_own_booking() {
        let me = guest();
        let pending = booking(Uuid::new_v4(), me.id, BookingStatus::Pending, stay(10, 3));

        let mut uow = TestUnitOfWork::default();
        uow.bookings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(pending.clone())));
        uow.villas
            .expect_find_by_id()
            .returning(|id| Ok(Some(villa(id, Uuid::new_v4(), 4))));
        uow.bookings.expect_update_status().never();

        let result = service(uow)
            .change_status(me, Uuid::new_v4(), BookingAction::Confirm)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn only_pending_bookings_can_be_edited() {
        let me = guest();
        let confirmed = booking(Uuid::new_v4(), me.id, BookingStatus::Confirmed, stay(10, 3));

        let mut uow = TestUnitOfWork::default();
        uow.bookings
            .expect_find_by_id()
            .returning(move |_| Ok(Some(confirmed.clone())));
        uow.villas
            .expect_find_by_id()
            .returning(|id| Ok(Some(villa(id, Uuid::new_v4(), 4))));
        uow.bookings.expect_update_details().never();

        let changes = BookingChanges {
            guests: Some(3),
            notes: None,
        };
        let result = service(uow).update(me, Uuid::new_v4(), changes).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn guests_cannot_list_host_bookings() {
        let result = service(TestUnitOfWork::default())
            .list_for_host(guest(), None, PaginationParams::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }
}
