//! Admin audit log.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use super::entities::admin_action;
use super::paging::fetch_page;
use crate::domain::{AdminAction, NewAdminAction};
use crate::errors::AppResult;
use crate::types::{Page, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AdminActionRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, params: PaginationParams) -> AppResult<Page<AdminAction>>;
}

pub struct AdminActionStore {
    db: DatabaseConnection,
}

impl AdminActionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Insert an audit row; callers pass the transaction of the mutation it records.
pub(crate) async fn record_admin_action<C: ConnectionTrait>(
    db: &C,
    action: NewAdminAction,
) -> AppResult<AdminAction> {
    let model = admin_action::ActiveModel {
        id: Set(Uuid::new_v4()),
        admin_id: Set(action.admin_id),
        action: Set(action.kind.as_str().to_string()),
        target_type: Set(action.kind.target_type().to_string()),
        target_id: Set(action.target_id),
        details: Set(action.details),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(db)
    .await?;

    tracing::info!(
        admin_id = %model.admin_id,
        action = %model.action,
        target_id = %model.target_id,
        "admin action recorded"
    );
    Ok(AdminAction::from(model))
}

#[async_trait]
impl AdminActionRepository for AdminActionStore {
    async fn list(&self, params: PaginationParams) -> AppResult<Page<AdminAction>> {
        let query = admin_action::Entity::find().order_by_desc(admin_action::Column::CreatedAt);
        Ok(fetch_page(&self.db, query, &params).await?.map(AdminAction::from))
    }
}
