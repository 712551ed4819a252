//! Admin audit trail and dashboard figures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AdminActionKind {
    ChangeUserRole,
    DeleteUser,
    SetVillaStatus,
    SetReviewVisibility,
}

impl AdminActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminActionKind::ChangeUserRole => "change_user_role",
            AdminActionKind::DeleteUser => "delete_user",
            AdminActionKind::SetVillaStatus => "set_villa_status",
            AdminActionKind::SetReviewVisibility => "set_review_visibility",
        }
    }

    pub fn target_type(&self) -> &'static str {
        match self {
            AdminActionKind::ChangeUserRole | AdminActionKind::DeleteUser => "user",
            AdminActionKind::SetVillaStatus => "villa",
            AdminActionKind::SetReviewVisibility => "review",
        }
    }
}

/// One row of the admin audit log
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminAction {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Uuid,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAdminAction {
    pub admin_id: Uuid,
    pub kind: AdminActionKind,
    pub target_id: Uuid,
    pub details: Option<String>,
}

/// Counts for the admin dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PlatformStats {
    pub users: u64,
    pub hosts: u64,
    pub active_villas: u64,
    pub pending_bookings: u64,
    pub confirmed_bookings: u64,
    pub completed_bookings: u64,
    pub flagged_reviews: u64,
}
