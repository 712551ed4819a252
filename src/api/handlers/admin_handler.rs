//! Admin handlers. The router sits behind `auth_middleware` and
//! `admin_middleware`, so every handler here runs for admins only.

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, patch},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::booking_handler::BookingStatusQuery;
use crate::api::extractors::{AppPath, AppQuery, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    AdminAction, Booking, PlatformStats, Review, UserResponse, UserRole, Villa, VillaStatus,
};
use crate::errors::AppResult;
use crate::types::{NoContent, Paginated, PaginationParams};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub role: Option<UserRole>,
    /// Case-insensitive match on name or email
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VillaListQuery {
    pub status: Option<VillaStatus>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReviewListQuery {
    /// Only reviews waiting for moderation
    #[serde(default)]
    pub flagged: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VillaStatusRequest {
    pub status: VillaStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewVisibilityRequest {
    pub is_visible: bool,
}

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/role", patch(change_user_role))
        .route("/villas", get(list_villas))
        .route("/villas/:id/status", patch(set_villa_status))
        .route("/bookings", get(list_bookings))
        .route("/reviews", get(list_reviews))
        .route("/reviews/:id/visibility", patch(set_review_visibility))
        .route("/actions", get(list_actions))
        .route("/stats", get(get_stats))
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(UserListQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated users", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserListQuery>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let search = query.search.filter(|s| !s.trim().is_empty());
    let page = state
        .services
        .admin()
        .list_users(query.role, search, params)
        .await?;
    Ok(Json(Paginated::from_page(page.map(UserResponse::from), &params)))
}

#[utoipa::path(
    patch,
    path = "/admin/users/{id}/role",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role changed", body = UserResponse),
        (status = 400, description = "Cannot change own role"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn change_user_role(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ChangeRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .services
        .admin()
        .change_role(current_user.actor(), id, payload.role)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete user (cannot delete self)
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete your own account"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .admin()
        .delete_user(current_user.actor(), id)
        .await?;
    Ok(NoContent)
}

#[utoipa::path(
    get,
    path = "/admin/villas",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(VillaListQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated villas", body = [Villa]),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_villas(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<VillaListQuery>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Villa>>> {
    let page = state
        .services
        .admin()
        .list_villas(query.status, params)
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

#[utoipa::path(
    patch,
    path = "/admin/villas/{id}/status",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Villa ID")),
    request_body = VillaStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Villa),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Villa not found")
    )
)]
pub async fn set_villa_status(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<VillaStatusRequest>,
) -> AppResult<Json<Villa>> {
    let villa = state
        .services
        .admin()
        .set_villa_status(current_user.actor(), id, payload.status)
        .await?;
    Ok(Json(villa))
}

#[utoipa::path(
    get,
    path = "/admin/bookings",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(BookingStatusQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated bookings", body = [Booking]),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BookingStatusQuery>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Booking>>> {
    let page = state
        .services
        .admin()
        .list_bookings(query.status, params)
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

#[utoipa::path(
    get,
    path = "/admin/reviews",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(ReviewListQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated reviews, hidden ones included", body = [Review]),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ReviewListQuery>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Review>>> {
    let page = state
        .services
        .admin()
        .list_reviews(query.flagged, params)
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

/// Show or hide a review; clears its flag
#[utoipa::path(
    patch,
    path = "/admin/reviews/{id}/visibility",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = ReviewVisibilityRequest,
    responses(
        (status = 200, description = "Visibility changed", body = Review),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn set_review_visibility(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReviewVisibilityRequest>,
) -> AppResult<Json<Review>> {
    let review = state
        .services
        .admin()
        .set_review_visibility(current_user.actor(), id, payload.is_visible)
        .await?;
    Ok(Json(review))
}

/// Audit log, newest first
#[utoipa::path(
    get,
    path = "/admin/actions",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated admin actions", body = [AdminAction]),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn list_actions(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<AdminAction>>> {
    let page = state.services.admin().list_actions(params).await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Platform counts", body = PlatformStats),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<PlatformStats>> {
    let stats = state.services.admin().stats().await?;
    Ok(Json(stats))
}
