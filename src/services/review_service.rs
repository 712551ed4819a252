//! Guest reviews, host replies and flagging.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::support::{notify, today, VillaCache};
use crate::config::MAX_MESSAGE_LENGTH;
use crate::domain::{validate_rating, Actor, NewNotification, NewReview, NotificationKind, Review};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Review a completed stay. One review per booking, by its guest.
    async fn create(
        &self,
        actor: Actor,
        booking_id: Uuid,
        rating: i32,
        comment: String,
    ) -> AppResult<Review>;

    /// Visible reviews, newest first.
    async fn list_for_villa(&self, villa_id: Uuid, params: PaginationParams) -> AppResult<Page<Review>>;

    /// Report a review for moderation.
    async fn flag(&self, actor: Actor, id: Uuid, reason: String) -> AppResult<Review>;

    /// Villa owner's public answer.
    async fn reply(&self, actor: Actor, id: Uuid, reply: String) -> AppResult<Review>;
}

pub struct ReviewManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: VillaCache,
}

impl<U: UnitOfWork> ReviewManager<U> {
    pub fn new(uow: Arc<U>, cache: VillaCache) -> Self {
        Self { uow, cache }
    }
}

fn required_text(value: String, field: &str) -> AppResult<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    if value.chars().count() as u64 > MAX_MESSAGE_LENGTH {
        return Err(AppError::validation(format!(
            "{} is limited to {} characters",
            field, MAX_MESSAGE_LENGTH
        )));
    }
    Ok(value)
}

#[async_trait]
impl<U: UnitOfWork> ReviewService for ReviewManager<U> {
    async fn create(
        &self,
        actor: Actor,
        booking_id: Uuid,
        rating: i32,
        comment: String,
    ) -> AppResult<Review> {
        validate_rating(rating)?;
        let comment = required_text(comment, "Comment")?;

        let booking = self
            .uow
            .bookings()
            .find_by_id(booking_id)
            .await?
            .ok_or_not_found()?;
        if booking.guest_id != actor.id {
            return Err(AppError::Forbidden);
        }
        if !booking.stay_completed(today()) {
            return Err(AppError::validation(
                "Reviews can only be left after a completed stay",
            ));
        }
        if self.uow.reviews().find_by_booking(booking.id).await?.is_some() {
            return Err(AppError::conflict("This booking has already been reviewed"));
        }

        let review = self
            .uow
            .reviews()
            .create(NewReview {
                booking_id: booking.id,
                villa_id: booking.villa_id,
                author_id: actor.id,
                rating,
                comment,
            })
            .await?;

        tracing::info!(
            review_id = %review.id,
            villa_id = %review.villa_id,
            rating = review.rating,
            "review created"
        );
        self.cache.invalidate(review.villa_id).await;

        if let Some(villa) = self.uow.villas().find_by_id(review.villa_id).await? {
            notify(
                self.uow.as_ref(),
                NewNotification::new(
                    villa.owner_id,
                    NotificationKind::NewReview,
                    "New review",
                    format!("{} received a {}-star review", villa.title, review.rating),
                    Some(review.id),
                ),
            )
            .await;
        }

        Ok(review)
    }

    async fn list_for_villa(&self, villa_id: Uuid, params: PaginationParams) -> AppResult<Page<Review>> {
        self.uow.reviews().list_for_villa(villa_id, params).await
    }

    async fn flag(&self, actor: Actor, id: Uuid, reason: String) -> AppResult<Review> {
        let reason = required_text(reason, "Reason")?;
        let review = self.uow.reviews().find_by_id(id).await?.ok_or_not_found()?;
        if !review.is_visible {
            return Err(AppError::NotFound);
        }

        let flagged = self.uow.reviews().flag(review.id, reason).await?;
        tracing::info!(review_id = %id, reporter_id = %actor.id, "review flagged");
        Ok(flagged)
    }

    async fn reply(&self, actor: Actor, id: Uuid, reply: String) -> AppResult<Review> {
        let reply = required_text(reply, "Reply")?;
        let review = self.uow.reviews().find_by_id(id).await?.ok_or_not_found()?;
        let villa = self
            .uow
            .villas()
            .find_by_id(review.villa_id)
            .await?
            .ok_or_not_found()?;
        if !villa.is_owned_by(actor.id) {
            return Err(AppError::Forbidden);
        }

        let updated = self.uow.reviews().reply(review.id, reply).await?;

        notify(
            self.uow.as_ref(),
            NewNotification::new(
                review.author_id,
                NotificationKind::ReviewReply,
                "Your review got a reply",
                format!("The host of {} replied to your review", villa.title),
                Some(review.id),
            ),
        )
        .await;

        Ok(updated)
    }
}
