//! In-app notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    BookingRequested,
    BookingStatusChanged,
    BookingUpdated,
    NewMessage,
    NewReview,
    ReviewReply,
    AccountUpdated,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::BookingRequested => "booking_requested",
            NotificationKind::BookingStatusChanged => "booking_status_changed",
            NotificationKind::BookingUpdated => "booking_updated",
            NotificationKind::NewMessage => "new_message",
            NotificationKind::NewReview => "new_review",
            NotificationKind::ReviewReply => "review_reply",
            NotificationKind::AccountUpdated => "account_updated",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "booking_requested" => NotificationKind::BookingRequested,
            "booking_status_changed" => NotificationKind::BookingStatusChanged,
            "booking_updated" => NotificationKind::BookingUpdated,
            "new_message" => NotificationKind::NewMessage,
            "new_review" => NotificationKind::NewReview,
            "review_reply" => NotificationKind::ReviewReply,
            _ => NotificationKind::AccountUpdated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Id of the booking, thread or review the notification is about
    pub link_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub link_id: Option<Uuid>,
}

impl NewNotification {
    pub fn new(
        user_id: Uuid,
        kind: NotificationKind,
        title: impl Into<String>,
        body: impl Into<String>,
        link_id: Option<Uuid>,
    ) -> Self {
        Self {
            user_id,
            kind,
            title: title.into(),
            body: body.into(),
            link_id,
        }
    }
}
