//! Booking-scoped conversations between guest and host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageThread {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub guest_id: Uuid,
    pub host_id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Bumped on every new message
    pub updated_at: DateTime<Utc>,
}

impl MessageThread {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.guest_id == user_id || self.host_id == user_id
    }

    /// The participant on the other side of `user_id`.
    pub fn counterpart(&self, user_id: Uuid) -> Uuid {
        if self.guest_id == user_id {
            self.host_id
        } else {
            self.guest_id
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub id: Uuid,
    pub thread_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Thread row plus the caller's unread count, for inbox listings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ThreadSummary {
    #[serde(flatten)]
    pub thread: MessageThread,
    pub unread_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counterpart_is_the_other_side() {
        let now = Utc::now();
        let thread = MessageThread {
            id: Uuid::new_v4(),
            booking_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            host_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(thread.counterpart(thread.guest_id), thread.host_id);
        assert_eq!(thread.counterpart(thread.host_id), thread.guest_id);
        assert!(thread.is_participant(thread.host_id));
        assert!(!thread.is_participant(Uuid::new_v4()));
    }
}
