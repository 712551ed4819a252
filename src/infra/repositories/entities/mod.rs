//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod admin_action;
pub mod booking;
pub mod message;
pub mod message_thread;
pub mod notification;
pub mod review;
pub mod user;
pub mod villa;
pub mod villa_amenity;
pub mod villa_rule;
