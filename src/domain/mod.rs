//! Domain layer - Core business entities and logic
//!
//! Entities and value objects for the marketplace, independent of
//! storage and HTTP. Booking dates, pricing and the booking state
//! machine live here so services and tests share one definition.

pub mod admin;
pub mod booking;
pub mod message;
pub mod notification;
pub mod password;
pub mod review;
pub mod user;
pub mod villa;

pub use admin::{AdminAction, AdminActionKind, NewAdminAction, PlatformStats};
pub use booking::{
    Booking, BookingAction, BookingChanges, BookingParty, BookingPolicy, BookingStatus, NewBooking,
    PriceBreakdown, StayDates,
};
pub use message::{Message, MessageThread, ThreadSummary};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use password::Password;
pub use review::{validate_rating, NewReview, Review};
pub use user::{Actor, NewUser, ProfileUpdate, PublicProfile, User, UserResponse, UserRole};
pub use villa::{
    normalize_amenities, NewVilla, ReviewSummary, Villa, VillaChanges, VillaDetail, VillaSearch,
    VillaSort, VillaStatus,
};
