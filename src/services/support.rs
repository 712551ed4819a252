//! Helpers shared by several services.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewNotification, VillaDetail};
use crate::infra::{Cache, UnitOfWork};

/// Optional Redis cache for villa detail pages.
///
/// Cache errors never fail a request: reads degrade to a miss and
/// writes are skipped, both with a warning.
#[derive(Clone, Default)]
pub struct VillaCache {
    cache: Option<Arc<Cache>>,
}

impl VillaCache {
    pub fn new(cache: Option<Arc<Cache>>) -> Self {
        Self { cache }
    }

    pub fn disabled() -> Self {
        Self { cache: None }
    }

    pub async fn get(&self, villa_id: Uuid) -> Option<VillaDetail> {
        let cache = self.cache.as_ref()?;
        match cache.get_villa(villa_id).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(villa_id = %villa_id, error = %e, "villa cache read failed");
                None
            }
        }
    }

    pub async fn put(&self, detail: &VillaDetail) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_villa(detail).await {
                tracing::warn!(villa_id = %detail.villa.id, error = %e, "villa cache write failed");
            }
        }
    }

    pub async fn invalidate(&self, villa_id: Uuid) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.invalidate_villa(villa_id).await {
                tracing::warn!(villa_id = %villa_id, error = %e, "villa cache invalidation failed");
            }
        }
    }
}

/// Deliver an in-app notification. The triggering operation has already
/// succeeded, so a failed insert is logged rather than returned.
pub(crate) async fn notify<U: UnitOfWork>(uow: &U, notification: NewNotification) {
    let user_id = notification.user_id;
    let kind = notification.kind.as_str();
    if let Err(e) = uow.notifications().create(notification).await {
        tracing::warn!(user_id = %user_id, kind, error = %e, "notification delivery failed");
    }
}

/// Today's date in UTC; stay dates are calendar days.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
