//! Villa listing entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Listing status. `Deleted` is the soft-delete marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VillaStatus {
    Active,
    Inactive,
    Suspended,
    Deleted,
}

impl VillaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VillaStatus::Active => "active",
            VillaStatus::Inactive => "inactive",
            VillaStatus::Suspended => "suspended",
            VillaStatus::Deleted => "deleted",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "active" => Ok(VillaStatus::Active),
            "inactive" => Ok(VillaStatus::Inactive),
            "suspended" => Ok(VillaStatus::Suspended),
            "deleted" => Ok(VillaStatus::Deleted),
            other => Err(AppError::validation(format!("Invalid villa status '{}'", other))),
        }
    }

    /// Visible in search and bookable.
    pub fn is_public(&self) -> bool {
        matches!(self, VillaStatus::Active)
    }

    /// Owners toggle between active and inactive; suspension and
    /// deletion go through admin and delete endpoints.
    pub fn owner_settable(&self) -> bool {
        matches!(self, VillaStatus::Active | VillaStatus::Inactive)
    }
}

impl std::fmt::Display for VillaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Villa {
    pub id: Uuid,
    pub owner_id: Uuid,
    #[schema(example = "Seaside Villa Aurora")]
    pub title: String,
    pub description: String,
    #[schema(example = "Santorini")]
    pub location: String,
    pub address: String,
    /// Nightly price in cents
    #[schema(example = 25000)]
    pub price_per_night_cents: i64,
    /// One-off cleaning fee in cents
    #[schema(example = 5000)]
    pub cleaning_fee_cents: i64,
    #[schema(example = 6)]
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub status: VillaStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Villa {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    /// Check a requested party size against capacity.
    pub fn check_capacity(&self, guests: i32) -> AppResult<()> {
        if guests < 1 {
            return Err(AppError::validation("At least one guest is required"));
        }
        if guests > self.max_guests {
            return Err(AppError::validation(format!(
                "This villa accommodates at most {} guests",
                self.max_guests
            )));
        }
        Ok(())
    }
}

/// Fields for a new listing
#[derive(Debug, Clone)]
pub struct NewVilla {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub address: String,
    pub price_per_night_cents: i64,
    pub cleaning_fee_cents: i64,
    pub max_guests: i32,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub amenities: Vec<String>,
    pub rules: Vec<String>,
}

/// Partial update; list fields replace the stored set when present.
#[derive(Debug, Clone, Default)]
pub struct VillaChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub price_per_night_cents: Option<i64>,
    pub cleaning_fee_cents: Option<i64>,
    pub max_guests: Option<i32>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub status: Option<VillaStatus>,
    pub amenities: Option<Vec<String>>,
    pub rules: Option<Vec<String>>,
}

/// Sort order for villa search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VillaSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

/// Search filters; every field is optional.
#[derive(Debug, Clone, Default)]
pub struct VillaSearch {
    pub location: Option<String>,
    pub min_price_cents: Option<i64>,
    pub max_price_cents: Option<i64>,
    pub guests: Option<i32>,
    pub available: Option<super::StayDates>,
    pub amenity: Option<String>,
    pub sort: VillaSort,
}

/// Average star rating over visible reviews
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ReviewSummary {
    pub average_rating: Option<f64>,
    pub review_count: u64,
}

/// Listing with its child rows and rating, as shown on the detail page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VillaDetail {
    #[serde(flatten)]
    pub villa: Villa,
    pub amenities: Vec<String>,
    pub rules: Vec<String>,
    pub reviews: ReviewSummary,
}

/// Normalize a user-supplied amenity list: trim, drop blanks, dedupe
/// case-insensitively while keeping first spelling and order.
pub fn normalize_amenities(amenities: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    amenities
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .filter(|a| seen.insert(a.to_lowercase()))
        .collect()
}
