//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, auth_handler, booking_handler, host_handler, notification_handler,
    review_handler, thread_handler, user_handler, villa_handler,
};
use crate::domain::{
    AdminAction, Booking, BookingAction, BookingStatus, Message, MessageThread, Notification,
    NotificationKind, PlatformStats, PriceBreakdown, PublicProfile, Review, ReviewSummary,
    StayDates, ThreadSummary, UserResponse, UserRole, Villa, VillaDetail, VillaSort, VillaStatus,
};
use crate::services::TokenResponse;
use crate::types::{CountResponse, MessageResponse};

/// OpenAPI documentation for the villa marketplace
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Villa Market API",
        version = "0.1.0",
        description = "Vacation villa marketplace: listings, bookings, messaging, reviews and moderation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        user_handler::get_current_user,
        user_handler::update_current_user,
        user_handler::change_password,
        user_handler::get_profile,
        villa_handler::search_villas,
        villa_handler::get_villa,
        villa_handler::get_availability,
        villa_handler::get_quote,
        villa_handler::list_villa_reviews,
        villa_handler::create_villa,
        villa_handler::update_villa,
        villa_handler::delete_villa,
        host_handler::list_own_villas,
        host_handler::list_host_bookings,
        booking_handler::create_booking,
        booking_handler::list_my_bookings,
        booking_handler::get_booking,
        booking_handler::update_booking,
        booking_handler::change_booking_status,
        booking_handler::open_booking_thread,
        thread_handler::list_threads,
        thread_handler::list_messages,
        thread_handler::send_message,
        thread_handler::mark_thread_read,
        review_handler::create_review,
        review_handler::flag_review,
        review_handler::reply_to_review,
        notification_handler::list_notifications,
        notification_handler::unread_count,
        notification_handler::mark_read,
        notification_handler::mark_all_read,
        notification_handler::delete_notification,
        admin_handler::list_users,
        admin_handler::change_user_role,
        admin_handler::delete_user,
        admin_handler::list_villas,
        admin_handler::set_villa_status,
        admin_handler::list_bookings,
        admin_handler::list_reviews,
        admin_handler::set_review_visibility,
        admin_handler::list_actions,
        admin_handler::get_stats,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            PublicProfile,
            Villa,
            VillaStatus,
            VillaSort,
            VillaDetail,
            ReviewSummary,
            StayDates,
            PriceBreakdown,
            Booking,
            BookingStatus,
            BookingAction,
            MessageThread,
            ThreadSummary,
            Message,
            Review,
            Notification,
            NotificationKind,
            AdminAction,
            PlatformStats,
            // Shared responses
            TokenResponse,
            MessageResponse,
            CountResponse,
            // Request bodies
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            user_handler::UpdateProfileRequest,
            user_handler::ChangePasswordRequest,
            villa_handler::CreateVillaRequest,
            villa_handler::UpdateVillaRequest,
            booking_handler::CreateBookingRequest,
            booking_handler::UpdateBookingRequest,
            booking_handler::StatusChangeRequest,
            thread_handler::SendMessageRequest,
            review_handler::CreateReviewRequest,
            review_handler::FlagReviewRequest,
            review_handler::ReplyReviewRequest,
            admin_handler::ChangeRoleRequest,
            admin_handler::VillaStatusRequest,
            admin_handler::ReviewVisibilityRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Users", description = "Own account and public profiles"),
        (name = "Villas", description = "Listings, search, availability and quotes"),
        (name = "Host", description = "Host dashboard"),
        (name = "Bookings", description = "Reservations and their status workflow"),
        (name = "Messages", description = "Booking message threads"),
        (name = "Reviews", description = "Guest reviews and host replies"),
        (name = "Notifications", description = "In-app notification inbox"),
        (name = "Admin", description = "Moderation, audit log and platform stats")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_booking_and_admin_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/bookings"));
        assert!(doc.paths.paths.contains_key("/admin/stats"));
        assert!(doc.paths.paths.contains_key("/villas/{id}/quote"));
    }
}
