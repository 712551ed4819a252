//! Guest reviews of completed stays.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{MAX_RATING, MIN_RATING};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub villa_id: Uuid,
    pub author_id: Uuid,
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: i32,
    pub comment: String,
    pub is_visible: bool,
    pub is_flagged: bool,
    pub flag_reason: Option<String>,
    pub host_reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub booking_id: Uuid,
    pub villa_id: Uuid,
    pub author_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

pub fn validate_rating(rating: i32) -> AppResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::validation(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    Ok(())
}
