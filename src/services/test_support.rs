//! Unit-of-work double over mockall repositories.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{DatabaseBackend, DatabaseConnection, IsolationLevel, MockDatabase, Value};
use uuid::Uuid;

use crate::domain::{
    Booking, BookingStatus, NewNotification, Notification, PriceBreakdown, StayDates, User,
    UserRole, Villa, VillaStatus,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{
    AdminActionRepository, BookingRepository, MessageRepository, MockAdminActionRepository,
    MockBookingRepository, MockMessageRepository, MockNotificationRepository,
    MockReviewRepository, MockUserRepository, MockVillaRepository, NotificationRepository,
    ReviewRepository, TransactionContext, UnitOfWork, UserRepository, VillaRepository,
};
use crate::infra::unit_of_work::run_transaction;

/// Each repository defaults to a mock with no expectations; any call it
/// receives fails the test. Transactions run against `db` when one is set
/// and fail otherwise.
#[derive(Default)]
pub struct TestUnitOfWork {
    pub users: MockUserRepository,
    pub villas: MockVillaRepository,
    pub bookings: MockBookingRepository,
    pub reviews: MockReviewRepository,
    pub messages: MockMessageRepository,
    pub notifications: MockNotificationRepository,
    pub admin_actions: MockAdminActionRepository,
    pub db: Option<DatabaseConnection>,
}

impl TestUnitOfWork {
    pub fn build(self) -> Arc<BuiltUnitOfWork> {
        Arc::new(BuiltUnitOfWork {
            users: Arc::new(self.users),
            villas: Arc::new(self.villas),
            bookings: Arc::new(self.bookings),
            reviews: Arc::new(self.reviews),
            messages: Arc::new(self.messages),
            notifications: Arc::new(self.notifications),
            admin_actions: Arc::new(self.admin_actions),
            db: self.db,
        })
    }
}

pub struct BuiltUnitOfWork {
    users: Arc<MockUserRepository>,
    villas: Arc<MockVillaRepository>,
    bookings: Arc<MockBookingRepository>,
    reviews: Arc<MockReviewRepository>,
    messages: Arc<MockMessageRepository>,
    notifications: Arc<MockNotificationRepository>,
    admin_actions: Arc<MockAdminActionRepository>,
    db: Option<DatabaseConnection>,
}

impl BuiltUnitOfWork {
    fn db(&self) -> AppResult<&DatabaseConnection> {
        self.db
            .as_ref()
            .ok_or_else(|| AppError::internal("No database behind this test unit of work"))
    }
}

#[async_trait]
impl UnitOfWork for BuiltUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn villas(&self) -> Arc<dyn VillaRepository> {
        self.villas.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingRepository> {
        self.bookings.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        self.reviews.clone()
    }

    fn messages(&self) -> Arc<dyn MessageRepository> {
        self.messages.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationRepository> {
        self.notifications.clone()
    }

    fn admin_actions(&self) -> Arc<dyn AdminActionRepository> {
        self.admin_actions.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        run_transaction(self.db()?, IsolationLevel::ReadCommitted, f).await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        run_transaction(self.db()?, IsolationLevel::Serializable, f).await
    }
}

pub fn user(id: Uuid, role: UserRole) -> User {
    let now = Utc::now();
    User {
        id,
        email: format!("{}@example.com", role),
        password_hash: "hashed".to_string(),
        name: "Test User".to_string(),
        role,
        phone: None,
        bio: None,
        avatar_url: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn villa(id: Uuid, owner_id: Uuid, max_guests: i32) -> Villa {
    let now = Utc::now();
    Villa {
        id,
        owner_id,
        title: "Villa Lemonia".to_string(),
        description: "Stone villa among lemon trees".to_string(),
        location: "Crete".to_string(),
        address: "Chania 731 00".to_string(),
        price_per_night_cents: 15_000,
        cleaning_fee_cents: 3_000,
        max_guests,
        bedrooms: 3,
        bathrooms: 2,
        status: VillaStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

/// A stay `offset` days from today lasting `nights` nights.
pub fn stay(offset: i64, nights: i64) -> StayDates {
    let start: NaiveDate = Utc::now().date_naive() + Duration::days(offset);
    StayDates {
        check_in: start,
        check_out: start + Duration::days(nights),
    }
}

pub fn booking(villa_id: Uuid, guest_id: Uuid, status: BookingStatus, dates: StayDates) -> Booking {
    let now = Utc::now();
    Booking {
        id: Uuid::new_v4(),
        villa_id,
        guest_id,
        dates,
        guests: 2,
        notes: None,
        status,
        price: PriceBreakdown::compute(15_000, dates.nights(), 3_000, 10).unwrap(),
        created_at: now,
        updated_at: now,
    }
}

/// Echo a notification insert back as the stored row.
pub fn delivered(n: NewNotification) -> AppResult<Notification> {
    Ok(Notification {
        id: Uuid::new_v4(),
        user_id: n.user_id,
        kind: n.kind,
        title: n.title,
        body: n.body,
        link_id: n.link_id,
        is_read: false,
        created_at: Utc::now(),
    })
}

/// An empty Postgres-flavoured mock; queue results on it before use.
pub fn mock_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

/// The single row a `COUNT(*)` paginator query reads.
pub fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

/// Postgres' message for SQLSTATE 40001.
pub const SERIALIZATION_FAILURE: &str =
    "could not serialize access due to read/write dependencies among transactions";
