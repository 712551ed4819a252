//! Notification inbox handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::api::extractors::{AppPath, AppQuery};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Notification;
use crate::errors::AppResult;
use crate::types::{CountResponse, MessageResponse, NoContent, Paginated, PaginationParams};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

/// Create notification routes
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/read-all", post(mark_all_read))
        .route("/:id/read", post(mark_read))
        .route("/:id", delete(delete_notification))
}

/// Own notifications, newest first
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(NotificationQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated notifications", body = [Notification]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_notifications(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<NotificationQuery>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Notification>>> {
    let page = state
        .services
        .notifications()
        .list(current_user.actor(), query.unread_only, params)
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread notifications", body = CountResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn unread_count(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<CountResponse>> {
    let count = state
        .services
        .notifications()
        .unread_count(current_user.actor())
        .await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Marked read", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .notifications()
        .mark_read(current_user.actor(), id)
        .await?;
    Ok(Json(MessageResponse::new("Notification marked as read")))
}

#[utoipa::path(
    post,
    path = "/notifications/read-all",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Number of notifications marked read", body = CountResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn mark_all_read(
    current_user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<CountResponse>> {
    let count = state
        .services
        .notifications()
        .mark_all_read(current_user.actor())
        .await?;
    Ok(Json(CountResponse { count }))
}

#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "Notifications",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Notification deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn delete_notification(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .notifications()
        .delete(current_user.actor(), id)
        .await?;
    Ok(NoContent)
}
