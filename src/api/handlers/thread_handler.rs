//! Message thread handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{AppPath, AppQuery, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Message, ThreadSummary};
use crate::errors::AppResult;
use crate::types::{CountResponse, Created, Paginated, PaginationParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    #[schema(example = "What time is check-in?")]
    pub content: String,
}

/// Create thread routes
pub fn thread_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_threads))
        .route("/:id/messages", get(list_messages).post(send_message))
        .route("/:id/read", post(mark_thread_read))
}

/// Threads the caller takes part in
#[utoipa::path(
    get,
    path = "/threads",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Threads, most recent activity first", body = [ThreadSummary]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_threads(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<ThreadSummary>>> {
    let page = state
        .services
        .messages()
        .list_threads(current_user.actor(), params)
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

/// Messages in a thread, oldest first
#[utoipa::path(
    get,
    path = "/threads/{id}/messages",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Thread ID"), PaginationParams),
    responses(
        (status = 200, description = "Paginated messages", body = [Message]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn list_messages(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Message>>> {
    let page = state
        .services
        .messages()
        .list_messages(current_user.actor(), id, params)
        .await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

/// Post a message
#[utoipa::path(
    post,
    path = "/threads/{id}/messages",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Thread ID")),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = Message),
        (status = 400, description = "Empty or too long"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn send_message(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<SendMessageRequest>,
) -> AppResult<Created<Message>> {
    let message = state
        .services
        .messages()
        .send(current_user.actor(), id, payload.content)
        .await?;
    Ok(Created(message))
}

/// Mark the other participant's messages as read
#[utoipa::path(
    post,
    path = "/threads/{id}/read",
    tag = "Messages",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Thread ID")),
    responses(
        (status = 200, description = "Number of messages marked read", body = CountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Thread not found")
    )
)]
pub async fn mark_thread_read(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<CountResponse>> {
    let count = state
        .services
        .messages()
        .mark_read(current_user.actor(), id)
        .await?;
    Ok(Json(CountResponse { count }))
}
