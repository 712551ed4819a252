//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod booking_handler;
pub mod host_handler;
pub mod notification_handler;
pub mod review_handler;
pub mod thread_handler;
pub mod user_handler;
pub mod villa_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use booking_handler::booking_routes;
pub use host_handler::host_routes;
pub use notification_handler::notification_routes;
pub use review_handler::review_routes;
pub use thread_handler::thread_routes;
pub use user_handler::user_routes;
pub use villa_handler::villa_routes;
