//! Booking handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{AppPath, AppQuery, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Booking, BookingAction, BookingChanges, BookingStatus, MessageThread, StayDates};
use crate::errors::AppResult;
use crate::services::BookingRequest;
use crate::types::{Created, Paginated, PaginationParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    pub villa_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2026-07-01")]
    pub check_in: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2026-07-08")]
    pub check_out: NaiveDate,
    #[schema(example = 4)]
    pub guests: i32,
    #[validate(length(max = 4000, message = "Notes are limited to 4000 characters"))]
    pub notes: Option<String>,
}

/// Guest edits while the booking is pending
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookingRequest {
    pub guests: Option<i32>,
    /// An empty string clears the notes
    #[validate(length(max = 4000, message = "Notes are limited to 4000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StatusChangeRequest {
    pub action: BookingAction,
}

/// Optional status filter for booking lists
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingStatusQuery {
    pub status: Option<BookingStatus>,
}

/// Create booking routes
pub fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_bookings).post(create_booking))
        .route("/:id", get(get_booking).patch(update_booking))
        .route("/:id/status", post(change_booking_status))
        .route("/:id/thread", post(open_booking_thread))
}

/// Request a booking
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created in pending state", body = Booking),
        (status = 400, description = "Invalid dates, guest count or villa"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Villa not found"),
        (status = 409, description = "Dates overlap an existing booking")
    )
)]
pub async fn create_booking(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBookingRequest>,
) -> AppResult<Created<Booking>> {
    let request = BookingRequest {
        villa_id: payload.villa_id,
        dates: StayDates::new(payload.check_in, payload.check_out)?,
        guests: payload.guests,
        notes: payload.notes,
    };

    let booking = state
        .services
        .bookings()
        .create(current_user.actor(), request)
        .await?;
    Ok(Created(booking))
}

/// Own bookings as a guest
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(BookingStatusQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated bookings", body = [Booking]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_my_bookings(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<BookingStatusQuery>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Booking>>> {
    let page = state
        .services
        .bookings()
        .list_mine(current_user.actor(), filter.status, params)
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

/// One booking (guest, villa owner or admin)
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking", body = Booking),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a party to this booking"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .services
        .bookings()
        .get(current_user.actor(), id)
        .await?;
    Ok(Json(booking))
}

/// Change guest count or notes of a pending booking
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingRequest,
    responses(
        (status = 200, description = "Booking updated", body = Booking),
        (status = 400, description = "Not pending or over capacity"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only the guest may edit"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn update_booking(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateBookingRequest>,
) -> AppResult<Json<Booking>> {
    let changes = BookingChanges {
        guests: payload.guests,
        notes: payload.notes,
    };
    let booking = state
        .services
        .bookings()
        .update(current_user.actor(), id, changes)
        .await?;
    Ok(Json(booking))
}

/// Confirm, reject, cancel or complete a booking
#[utoipa::path(
    post,
    path = "/bookings/{id}/status",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed", body = Booking),
        (status = 400, description = "Transition not allowed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Action not allowed for this user"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking changed concurrently")
    )
)]
pub async fn change_booking_status(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<StatusChangeRequest>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .services
        .bookings()
        .change_status(current_user.actor(), id, payload.action)
        .await?;
    Ok(Json(booking))
}

/// Get or create the message thread for a booking
#[utoipa::path(
    post,
    path = "/bookings/{id}/thread",
    tag = "Bookings",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "The booking's thread", body = MessageThread),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only the guest and host may message"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn open_booking_thread(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<MessageThread>> {
    let thread = state
        .services
        .messages()
        .open_thread(current_user.actor(), id)
        .await?;
    Ok(Json(thread))
}
