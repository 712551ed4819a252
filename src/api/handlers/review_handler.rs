//! Review handlers.

use axum::{
    extract::State,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{AppPath, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Review;
use crate::errors::AppResult;
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    pub booking_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: i32,
    #[validate(length(min = 1, max = 4000, message = "Comment must be 1-4000 characters"))]
    #[schema(example = "Stunning sunsets and a spotless pool.")]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FlagReviewRequest {
    #[validate(length(min = 1, max = 1000, message = "Reason is required"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReplyReviewRequest {
    #[validate(length(min = 1, max = 4000, message = "Reply must be 1-4000 characters"))]
    pub reply: String,
}

/// Create review routes
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/:id/flag", post(flag_review))
        .route("/:id/reply", post(reply_to_review))
}

/// Review a completed stay
#[utoipa::path(
    post,
    path = "/reviews",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 400, description = "Invalid rating or stay not completed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the booking's guest"),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Booking already reviewed")
    )
)]
pub async fn create_review(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateReviewRequest>,
) -> AppResult<Created<Review>> {
    let review = state
        .services
        .reviews()
        .create(
            current_user.actor(),
            payload.booking_id,
            payload.rating,
            payload.comment,
        )
        .await?;
    Ok(Created(review))
}

/// Report a review to moderators
#[utoipa::path(
    post,
    path = "/reviews/{id}/flag",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = FlagReviewRequest,
    responses(
        (status = 200, description = "Review flagged", body = Review),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn flag_review(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<FlagReviewRequest>,
) -> AppResult<Json<Review>> {
    let review = state
        .services
        .reviews()
        .flag(current_user.actor(), id, payload.reason)
        .await?;
    Ok(Json(review))
}

/// Host reply to a review of their villa
#[utoipa::path(
    post,
    path = "/reviews/{id}/reply",
    tag = "Reviews",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review ID")),
    request_body = ReplyReviewRequest,
    responses(
        (status = 200, description = "Reply saved", body = Review),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the villa owner"),
        (status = 404, description = "Review not found")
    )
)]
pub async fn reply_to_review(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReplyReviewRequest>,
) -> AppResult<Json<Review>> {
    let review = state
        .services
        .reviews()
        .reply(current_user.actor(), id, payload.reply)
        .await?;
    Ok(Json(review))
}
