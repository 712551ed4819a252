//! Unit of Work: repository access plus transaction management.
//!
//! Services reach every store through `UnitOfWork`. Work that must be
//! atomic (booking insert after the overlap re-check, admin mutations
//! with their audit row) runs inside `transaction`/`transaction_serializable`
//! against the transaction-scoped repositories on `TransactionContext`.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{
    booking_overlaps, delete_user, find_user, find_villa, insert_booking, record_admin_action,
    set_review_visibility, set_user_role, set_villa_status, villa_ids_by_owner,
    AdminActionRepository, AdminActionStore, BookingRepository, BookingStore, MessageRepository,
    MessageStore, NotificationRepository, NotificationStore, ReviewRepository, ReviewStore,
    UserRepository, UserStore, VillaRepository, VillaStore,
};
use crate::domain::{
    AdminAction, Booking, NewAdminAction, NewBooking, Review, StayDates, User, UserRole, Villa,
    VillaStatus,
};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic transaction methods;
/// tests implement it by hand over mocked repositories.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn villas(&self) -> Arc<dyn VillaRepository>;

    fn bookings(&self) -> Arc<dyn BookingRepository>;

    fn reviews(&self) -> Arc<dyn ReviewRepository>;

    fn messages(&self) -> Arc<dyn MessageRepository>;

    fn notifications(&self) -> Arc<dyn NotificationRepository>;

    fn admin_actions(&self) -> Arc<dyn AdminActionRepository>;

    /// Run `f` in a read-committed transaction, committing on `Ok` and
    /// rolling back on `Err`.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;

    /// Same as `transaction` with serializable isolation.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Repository access bound to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository { txn: self.txn }
    }

    pub fn villas(&self) -> TxVillaRepository<'_> {
        TxVillaRepository { txn: self.txn }
    }

    pub fn bookings(&self) -> TxBookingRepository<'_> {
        TxBookingRepository { txn: self.txn }
    }

    pub fn reviews(&self) -> TxReviewRepository<'_> {
        TxReviewRepository { txn: self.txn }
    }

    pub fn admin_actions(&self) -> TxAdminActionRepository<'_> {
        TxAdminActionRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    users: Arc<UserStore>,
    villas: Arc<VillaStore>,
    bookings: Arc<BookingStore>,
    reviews: Arc<ReviewStore>,
    messages: Arc<MessageStore>,
    notifications: Arc<NotificationStore>,
    admin_actions: Arc<AdminActionStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            villas: Arc::new(VillaStore::new(db.clone())),
            bookings: Arc::new(BookingStore::new(db.clone())),
            reviews: Arc::new(ReviewStore::new(db.clone())),
            messages: Arc::new(MessageStore::new(db.clone())),
            notifications: Arc::new(NotificationStore::new(db.clone())),
            admin_actions: Arc::new(AdminActionStore::new(db.clone())),
            db,
        }
    }
}

/// Open a transaction on `db`, hand it to `f`, then commit on `Ok` or roll
/// back on `Err`.
pub(crate) async fn run_transaction<F, T>(
    db: &DatabaseConnection,
    isolation: IsolationLevel,
    f: F,
) -> AppResult<T>
where
    F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
        > + Send,
    T: Send,
{
    let txn = db
        .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
        .await
        .map_err(AppError::from)?;

    let ctx = TransactionContext::new(&txn);

    match f(ctx).await {
        Ok(result) => {
            txn.commit().await.map_err(AppError::from)?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
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
        run_transaction(&self.db, IsolationLevel::ReadCommitted, f).await
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        run_transaction(&self.db, IsolationLevel::Serializable, f).await
    }
}

pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        find_user(self.txn, id).await
    }

    pub async fn set_role(&self, id: Uuid, role: UserRole) -> AppResult<User> {
        set_user_role(self.txn, id, role).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        delete_user(self.txn, id).await
    }
}

pub struct TxVillaRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxVillaRepository<'a> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Villa>> {
        find_villa(self.txn, id).await
    }

    pub async fn set_status(&self, id: Uuid, status: VillaStatus) -> AppResult<Villa> {
        set_villa_status(self.txn, id, status).await
    }

    pub async fn ids_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Uuid>> {
        villa_ids_by_owner(self.txn, owner_id).await
    }
}

pub struct TxBookingRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxBookingRepository<'a> {
    pub async fn has_overlap(
        &self,
        villa_id: Uuid,
        dates: StayDates,
        exclude: Option<Uuid>,
    ) -> AppResult<bool> {
        booking_overlaps(self.txn, villa_id, dates, exclude).await
    }

    pub async fn create(&self, booking: NewBooking) -> AppResult<Booking> {
        insert_booking(self.txn, booking).await
    }
}

pub struct TxReviewRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxReviewRepository<'a> {
    pub async fn set_visibility(&self, id: Uuid, is_visible: bool) -> AppResult<Review> {
        set_review_visibility(self.txn, id, is_visible).await
    }
}

pub struct TxAdminActionRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxAdminActionRepository<'a> {
    pub async fn record(&self, action: NewAdminAction) -> AppResult<AdminAction> {
        record_admin_action(self.txn, action).await
    }
}

