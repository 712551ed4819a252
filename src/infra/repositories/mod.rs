//! Repository layer - Data access abstraction
//!
//! One trait per aggregate with a SeaORM-backed store. Free functions
//! generic over `ConnectionTrait` are shared with the transaction-scoped
//! repositories in `unit_of_work`.

mod admin_action_repository;
mod booking_repository;
pub(crate) mod entities;
mod message_repository;
mod notification_repository;
mod paging;
mod review_repository;
mod user_repository;
mod villa_repository;

pub use admin_action_repository::{AdminActionRepository, AdminActionStore};
pub use paging::is_serialization_failure;
pub use booking_repository::{BookingRepository, BookingStore};
pub use message_repository::{MessageRepository, MessageStore};
pub use notification_repository::{NotificationRepository, NotificationStore};
pub use review_repository::{ReviewRepository, ReviewStore};
pub use user_repository::{UserRepository, UserStore};
pub use villa_repository::{VillaRepository, VillaStore};

pub(crate) use admin_action_repository::record_admin_action;
pub(crate) use booking_repository::{booking_overlaps, insert_booking};
pub(crate) use review_repository::set_review_visibility;
pub(crate) use user_repository::{delete_user, find_user, set_user_role};
pub(crate) use villa_repository::{find_villa, set_villa_status, villa_ids_by_owner};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use admin_action_repository::MockAdminActionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use booking_repository::MockBookingRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use message_repository::MockMessageRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use notification_repository::MockNotificationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use review_repository::MockReviewRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use villa_repository::MockVillaRepository;
