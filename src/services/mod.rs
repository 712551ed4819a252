//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use Unit of Work pattern for centralized repository
//! access and transaction management.

mod admin_service;
mod auth_service;
mod booking_service;
pub mod container;
mod message_service;
mod notification_service;
mod review_service;
mod support;
mod user_service;
mod villa_service;

#[cfg(test)]
mod test_support;

// Service Container
pub use container::{ServiceContainer, Services};
pub use support::VillaCache;

// Service traits and implementations
pub use admin_service::{AdminManager, AdminService};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use booking_service::{BookingManager, BookingRequest, BookingService};
pub use message_service::{MessageManager, MessageService};
pub use notification_service::{NotificationManager, NotificationService};
pub use review_service::{ReviewManager, ReviewService};
pub use user_service::{UserManager, UserService};
pub use villa_service::{VillaManager, VillaService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
