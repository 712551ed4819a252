//! Admin moderation and dashboard.
//!
//! Every mutation writes its audit row in the same transaction as the
//! change itself.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::support::{notify, VillaCache};
use crate::domain::{
    Actor, AdminAction, AdminActionKind, Booking, BookingStatus, NewAdminAction, NewNotification,
    NotificationKind, PlatformStats, Review, User, UserRole, Villa, VillaStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

#[async_trait]
pub trait AdminService: Send + Sync {
    async fn list_users(
        &self,
        role: Option<UserRole>,
        search: Option<String>,
        params: PaginationParams,
    ) -> AppResult<Page<User>>;

    async fn change_role(&self, admin: Actor, user_id: Uuid, role: UserRole) -> AppResult<User>;

    /// Hard delete. Admins cannot delete themselves.
    async fn delete_user(&self, admin: Actor, user_id: Uuid) -> AppResult<()>;

    async fn list_villas(&self, status: Option<VillaStatus>, params: PaginationParams) -> AppResult<Page<Villa>>;

    async fn set_villa_status(&self, admin: Actor, villa_id: Uuid, status: VillaStatus) -> AppResult<Villa>;

    async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>>;

    async fn list_reviews(&self, flagged_only: bool, params: PaginationParams) -> AppResult<Page<Review>>;

    /// Show or hide a review; either way the flag is cleared.
    async fn set_review_visibility(&self, admin: Actor, review_id: Uuid, is_visible: bool) -> AppResult<Review>;

    async fn list_actions(&self, params: PaginationParams) -> AppResult<Page<AdminAction>>;

    async fn stats(&self) -> AppResult<PlatformStats>;
}

pub struct AdminManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: VillaCache,
}

impl<U: UnitOfWork> AdminManager<U> {
    pub fn new(uow: Arc<U>, cache: VillaCache) -> Self {
        Self { uow, cache }
    }
}

#[async_trait]
impl<U: UnitOfWork> AdminService for AdminManager<U> {
    async fn list_users(
        &self,
        role: Option<UserRole>,
        search: Option<String>,
        params: PaginationParams,
    ) -> AppResult<Page<User>> {
        self.uow.users().list(role, search, params).await
    }

    async fn change_role(&self, admin: Actor, user_id: Uuid, role: UserRole) -> AppResult<User> {
        if user_id == admin.id {
            return Err(AppError::validation("You cannot change your own role"));
        }

        let user = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let current = ctx.users().find_by_id(user_id).await?.ok_or_not_found()?;
                    let updated = ctx.users().set_role(user_id, role).await?;
                    ctx.admin_actions()
                        .record(NewAdminAction {
                            admin_id: admin.id,
                            kind: AdminActionKind::ChangeUserRole,
                            target_id: user_id,
                            details: Some(format!("{} -> {}", current.role, role)),
                        })
                        .await?;
                    Ok(updated)
                })
            })
            .await?;

        notify(
            self.uow.as_ref(),
            NewNotification::new(
                user.id,
                NotificationKind::AccountUpdated,
                "Account role changed",
                format!("Your account role is now {}", user.role),
                None,
            ),
        )
        .await;

        Ok(user)
    }

    async fn delete_user(&self, admin: Actor, user_id: Uuid) -> AppResult<()> {
        if user_id == admin.id {
            return Err(AppError::validation("You cannot delete your own account"));
        }

        // the cascade takes the host's villas with the user
        let villa_ids = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let user = ctx.users().find_by_id(user_id).await?.ok_or_not_found()?;
                    let villa_ids = ctx.villas().ids_by_owner(user_id).await?;
                    ctx.users().delete(user_id).await?;
                    ctx.admin_actions()
                        .record(NewAdminAction {
                            admin_id: admin.id,
                            kind: AdminActionKind::DeleteUser,
                            target_id: user_id,
                            details: Some(user.email),
                        })
                        .await?;
                    Ok(villa_ids)
                })
            })
            .await?;

        for villa_id in villa_ids {
            self.cache.invalidate(villa_id).await;
        }
        Ok(())
    }

    async fn list_villas(&self, status: Option<VillaStatus>, params: PaginationParams) -> AppResult<Page<Villa>> {
        self.uow.villas().list_all(status, params).await
    }

    async fn set_villa_status(&self, admin: Actor, villa_id: Uuid, status: VillaStatus) -> AppResult<Villa> {
        let villa = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let current = ctx.villas().find_by_id(villa_id).await?.ok_or_not_found()?;
                    let updated = ctx.villas().set_status(villa_id, status).await?;
                    ctx.admin_actions()
                        .record(NewAdminAction {
                            admin_id: admin.id,
                            kind: AdminActionKind::SetVillaStatus,
                            target_id: villa_id,
                            details: Some(format!("{} -> {}", current.status, status)),
                        })
                        .await?;
                    Ok(updated)
                })
            })
            .await?;

        self.cache.invalidate(villa.id).await;
        Ok(villa)
    }

    async fn list_bookings(
        &self,
        status: Option<BookingStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Booking>> {
        self.uow.bookings().list_all(status, params).await
    }

    async fn list_reviews(&self, flagged_only: bool, params: PaginationParams) -> AppResult<Page<Review>> {
        self.uow.reviews().list_admin(flagged_only, params).await
    }

    async fn set_review_visibility(&self, admin: Actor, review_id: Uuid, is_visible: bool) -> AppResult<Review> {
        let review = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let updated = ctx.reviews().set_visibility(review_id, is_visible).await?;
                    ctx.admin_actions()
                        .record(NewAdminAction {
                            admin_id: admin.id,
                            kind: AdminActionKind::SetReviewVisibility,
                            target_id: review_id,
                            details: Some(if is_visible { "shown" } else { "hidden" }.to_string()),
                        })
                        .await?;
                    Ok(updated)
                })
            })
            .await?;

        // the rating summary on the villa page changes with visibility
        self.cache.invalidate(review.villa_id).await;
        Ok(review)
    }

    async fn list_actions(&self, params: PaginationParams) -> AppResult<Page<AdminAction>> {
        self.uow.admin_actions().list(params).await
    }

    async fn stats(&self) -> AppResult<PlatformStats> {
        let users = self.uow.users();
        let villas = self.uow.villas();
        let bookings = self.uow.bookings();
        let reviews = self.uow.reviews();

        let (all_users, hosts, active_villas, pending, confirmed, completed, flagged) = tokio::try_join!(
            users.count(None),
            users.count(Some(UserRole::Host)),
            villas.count_by_status(VillaStatus::Active),
            bookings.count_by_status(BookingStatus::Pending),
            bookings.count_by_status(BookingStatus::Confirmed),
            bookings.count_by_status(BookingStatus::Completed),
            reviews.count_flagged(),
        )?;

        Ok(PlatformStats {
            users: all_users,
            hosts,
            active_villas,
            pending_bookings: pending,
            confirmed_bookings: confirmed,
            completed_bookings: completed,
            flagged_reviews: flagged,
        })
    }
}
