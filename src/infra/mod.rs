//! Infrastructure layer - External systems integration
//!
//! - PostgreSQL through SeaORM: connection, migrations, repositories
//! - Redis: villa detail cache and rate limit counters
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, RateLimitStatus};
pub use db::{Database, Migrator};
pub use repositories::{
    is_serialization_failure, AdminActionRepository, BookingRepository, MessageRepository,
    NotificationRepository, ReviewRepository, UserRepository, VillaRepository,
};
pub use unit_of_work::{Persistence, TransactionContext, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockAdminActionRepository, MockBookingRepository, MockMessageRepository,
    MockNotificationRepository, MockReviewRepository, MockUserRepository, MockVillaRepository,
};
