//! In-app notification inbox.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Actor, Notification};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

/// Every operation is scoped to the caller's own notifications; ids
/// belonging to someone else behave as missing.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn list(
        &self,
        actor: Actor,
        unread_only: bool,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>>;

    async fn unread_count(&self, actor: Actor) -> AppResult<u64>;

    async fn mark_read(&self, actor: Actor, id: Uuid) -> AppResult<()>;

    async fn mark_all_read(&self, actor: Actor) -> AppResult<u64>;

    async fn delete(&self, actor: Actor, id: Uuid) -> AppResult<()>;
}

pub struct NotificationManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> NotificationManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> NotificationService for NotificationManager<U> {
    async fn list(
        &self,
        actor: Actor,
        unread_only: bool,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>> {
        self.uow
            .notifications()
            .list(actor.id, unread_only, params)
            .await
    }

    async fn unread_count(&self, actor: Actor) -> AppResult<u64> {
        self.uow.notifications().unread_count(actor.id).await
    }

    async fn mark_read(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        self.uow.notifications().mark_read(id, actor.id).await
    }

    async fn mark_all_read(&self, actor: Actor) -> AppResult<u64> {
        let updated = self.uow.notifications().mark_all_read(actor.id).await?;
        tracing::debug!(user_id = %actor.id, updated, "notifications marked read");
        Ok(updated)
    }

    async fn delete(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        self.uow.notifications().delete(id, actor.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::errors::AppError;
    use crate::services::test_support::TestUnitOfWork;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn operations_are_scoped_to_the_caller() {
        let actor = Actor::new(Uuid::new_v4(), UserRole::Guest);
        let foreign = Uuid::new_v4();

        let mut uow = TestUnitOfWork::default();
        uow.notifications
            .expect_mark_read()
            .with(eq(foreign), eq(actor.id))
            .returning(|_, _| Err(AppError::NotFound));
        uow.notifications
            .expect_unread_count()
            .with(eq(actor.id))
            .returning(|_| Ok(3));

        let svc = NotificationManager::new(uow.build());
        assert!(matches!(
            svc.mark_read(actor, foreign).await,
            Err(AppError::NotFound)
        ));
        assert_eq!(svc.unread_count(actor).await.unwrap(), 3);
    }
}
