//! Notification repository. Every query is scoped to the owning user.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::notification;
use super::paging::fetch_page;
use crate::domain::{NewNotification, Notification};
use crate::errors::{AppError, AppResult};
use crate::types::{Page, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create(&self, notification: NewNotification) -> AppResult<Notification>;

    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>>;

    async fn unread_count(&self, user_id: Uuid) -> AppResult<u64>;

    /// `NotFound` unless the notification belongs to `user_id`.
    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<()>;

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64>;

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()>;
}

pub struct NotificationStore {
    db: DatabaseConnection,
}

impl NotificationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

async fn insert_notification<C: ConnectionTrait>(
    db: &C,
    new: NewNotification,
) -> AppResult<Notification> {
    let model = notification::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(new.user_id),
        kind: Set(new.kind.as_str().to_string()),
        title: Set(new.title),
        body: Set(new.body),
        link_id: Set(new.link_id),
        is_read: Set(false),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await?;

    Ok(Notification::from(model))
}

#[async_trait]
impl NotificationRepository for NotificationStore {
    async fn create(&self, new: NewNotification) -> AppResult<Notification> {
        insert_notification(&self.db, new).await
    }

    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>> {
        let mut query = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .order_by_desc(notification::Column::CreatedAt);
        if unread_only {
            query = query.filter(notification::Column::IsRead.eq(false));
        }
        Ok(fetch_page(&self.db, query, &params).await?.map(Notification::from))
    }

    async fn unread_count(&self, user_id: Uuid) -> AppResult<u64> {
        Ok(notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(&self.db)
            .await?)
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = notification::Entity::delete_many()
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
