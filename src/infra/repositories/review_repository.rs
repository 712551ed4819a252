//! Review repository.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::entities::review;
use super::paging::{fetch_page, unique_violation};
use crate::domain::{NewReview, Review, ReviewSummary};
use crate::errors::{AppError, AppResult};
use crate::types::{Page, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// A second review for the same booking yields `AppError::Conflict`.
    async fn create(&self, review: NewReview) -> AppResult<Review>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>>;

    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Review>>;

    /// Visible reviews only, newest first.
    async fn list_for_villa(&self, villa_id: Uuid, params: PaginationParams) -> AppResult<Page<Review>>;

    /// Average and count over visible reviews.
    async fn summary(&self, villa_id: Uuid) -> AppResult<ReviewSummary>;

    async fn flag(&self, id: Uuid, reason: String) -> AppResult<Review>;

    async fn reply(&self, id: Uuid, reply: String) -> AppResult<Review>;

    async fn list_admin(&self, flagged_only: bool, params: PaginationParams) -> AppResult<Page<Review>>;

    async fn count_flagged(&self) -> AppResult<u64>;
}

pub struct ReviewStore {
    db: DatabaseConnection,
}

impl ReviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct RatingRow {
    average: Option<f64>,
    total: i64,
}

async fn load(db: &DatabaseConnection, id: Uuid) -> AppResult<review::ActiveModel> {
    let model = review::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(model.into())
}

/// Showing or hiding a review also clears any pending flag.
pub(crate) async fn set_review_visibility<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    is_visible: bool,
) -> AppResult<Review> {
    let model = review::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: review::ActiveModel = model.into();
    active.is_visible = Set(is_visible);
    active.is_flagged = Set(false);
    active.updated_at = Set(chrono::Utc::now());

    Ok(Review::from(active.update(db).await?))
}

#[async_trait]
impl ReviewRepository for ReviewStore {
    async fn create(&self, new_review: NewReview) -> AppResult<Review> {
        let now = chrono::Utc::now();
        let model = review::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(new_review.booking_id),
            villa_id: Set(new_review.villa_id),
            author_id: Set(new_review.author_id),
            rating: Set(new_review.rating),
            comment: Set(new_review.comment),
            is_visible: Set(true),
            is_flagged: Set(false),
            flag_reason: Set(None),
            host_reply: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| unique_violation(e, "This booking has already been reviewed"))?;

        Ok(Review::from(model))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Review>> {
        Ok(review::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Review::from))
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Option<Review>> {
        Ok(review::Entity::find()
            .filter(review::Column::BookingId.eq(booking_id))
            .one(&self.db)
            .await?
            .map(Review::from))
    }

    async fn list_for_villa(&self, villa_id: Uuid, params: PaginationParams) -> AppResult<Page<Review>> {
        let query = review::Entity::find()
            .filter(review::Column::VillaId.eq(villa_id))
            .filter(review::Column::IsVisible.eq(true))
            .order_by_desc(review::Column::CreatedAt);
        Ok(fetch_page(&self.db, query, &params).await?.map(Review::from))
    }

    async fn summary(&self, villa_id: Uuid) -> AppResult<ReviewSummary> {
        let row = review::Entity::find()
            .select_only()
            .column_as(Expr::cust("CAST(AVG(rating) AS DOUBLE PRECISION)"), "average")
            .column_as(Expr::col(review::Column::Id).count(), "total")
            .filter(review::Column::VillaId.eq(villa_id))
            .filter(review::Column::IsVisible.eq(true))
            .into_model::<RatingRow>()
            .one(&self.db)
            .await?;

        Ok(match row {
            Some(row) => ReviewSummary {
                average_rating: row.average.map(|avg| (avg * 100.0).round() / 100.0),
                review_count: row.total.max(0) as u64,
            },
            None => ReviewSummary::default(),
        })
    }

    async fn flag(&self, id: Uuid, reason: String) -> AppResult<Review> {
        let mut active = load(&self.db, id).await?;
        active.is_flagged = Set(true);
        active.flag_reason = Set(Some(reason));
        active.updated_at = Set(chrono::Utc::now());
        Ok(Review::from(active.update(&self.db).await?))
    }

    async fn reply(&self, id: Uuid, reply: String) -> AppResult<Review> {
        let mut active = load(&self.db, id).await?;
        active.host_reply = Set(Some(reply));
        active.updated_at = Set(chrono::Utc::now());
        Ok(Review::from(active.update(&self.db).await?))
    }

    async fn list_admin(&self, flagged_only: bool, params: PaginationParams) -> AppResult<Page<Review>> {
        let mut query = review::Entity::find().order_by_desc(review::Column::CreatedAt);
        if flagged_only {
            query = query.filter(review::Column::IsFlagged.eq(true));
        }
        Ok(fetch_page(&self.db, query, &params).await?.map(Review::from))
    }

    async fn count_flagged(&self) -> AppResult<u64> {
        Ok(review::Entity::find()
            .filter(review::Column::IsFlagged.eq(true))
            .count(&self.db)
            .await?)
    }
}
