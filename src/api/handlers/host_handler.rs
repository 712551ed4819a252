//! Host dashboard handlers.

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};

use super::booking_handler::BookingStatusQuery;
use crate::api::extractors::AppQuery;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Booking, Villa};
use crate::errors::AppResult;
use crate::types::{Paginated, PaginationParams};

/// Create host routes
pub fn host_routes() -> Router<AppState> {
    Router::new()
        .route("/villas", get(list_own_villas))
        .route("/bookings", get(list_host_bookings))
}

/// Own villas in every status except deleted
#[utoipa::path(
    get,
    path = "/host/villas",
    tag = "Host",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated villas", body = [Villa]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Guests have no listings")
    )
)]
pub async fn list_own_villas(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Villa>>> {
    let page = state
        .services
        .villas()
        .list_own(current_user.actor(), params)
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

/// Bookings on own villas
#[utoipa::path(
    get,
    path = "/host/bookings",
    tag = "Host",
    security(("bearer_auth" = [])),
    params(BookingStatusQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated bookings", body = [Booking]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Guests have no listings")
    )
)]
pub async fn list_host_bookings(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<BookingStatusQuery>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Booking>>> {
    let page = state
        .services
        .bookings()
        .list_for_host(current_user.actor(), filter.status, params)
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}
