//! Villa listing handlers: public search and detail, host management.
//!
//! The whole router runs behind `optional_auth_middleware`; write
//! endpoints take `CurrentUser` and answer 401 for anonymous callers.

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::{AppPath, AppQuery, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    NewVilla, PriceBreakdown, Review, StayDates, Villa, VillaChanges, VillaDetail, VillaSearch,
    VillaSort, VillaStatus,
};
use crate::errors::{AppError, AppResult};
use crate::types::{Created, NoContent, Paginated, PaginationParams};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVillaRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[schema(example = "Seaside Villa Aurora")]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, max = 200, message = "Location is required"))]
    #[schema(example = "Santorini")]
    pub location: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
    /// Nightly price in cents
    #[validate(range(min = 1, max = 100_000_000, message = "Price must be 1-100000000 cents"))]
    #[schema(example = 25000)]
    pub price_per_night_cents: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 100_000_000, message = "Cleaning fee must be 0-100000000 cents"))]
    pub cleaning_fee_cents: i64,
    #[validate(range(min = 1, max = 100, message = "Max guests must be 1-100"))]
    pub max_guests: i32,
    #[validate(range(min = 0, max = 100))]
    pub bedrooms: i32,
    #[validate(range(min = 0, max = 100))]
    pub bathrooms: i32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub rules: Vec<String>,
}

/// Partial update; `amenities` and `rules` replace the stored lists.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateVillaRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Location cannot be empty"))]
    pub location: Option<String>,
    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: Option<String>,
    #[validate(range(min = 1, max = 100_000_000, message = "Price must be 1-100000000 cents"))]
    pub price_per_night_cents: Option<i64>,
    #[validate(range(min = 0, max = 100_000_000, message = "Cleaning fee must be 0-100000000 cents"))]
    pub cleaning_fee_cents: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "Max guests must be 1-100"))]
    pub max_guests: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub bathrooms: Option<i32>,
    pub status: Option<VillaStatus>,
    pub amenities: Option<Vec<String>>,
    pub rules: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring of the location
    pub location: Option<String>,
    /// Lowest nightly price in cents
    pub min_price: Option<i64>,
    /// Highest nightly price in cents
    pub max_price: Option<i64>,
    /// Party size the villa must fit
    pub guests: Option<i32>,
    /// With `check_out`, only villas free for the whole stay
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub amenity: Option<String>,
    pub sort: Option<VillaSort>,
}

impl SearchQuery {
    fn into_filter(self) -> AppResult<VillaSearch> {
        let available = match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) => Some(StayDates::new(check_in, check_out)?),
            (None, None) => None,
            _ => {
                return Err(AppError::validation(
                    "check_in and check_out must be given together",
                ))
            }
        };

        Ok(VillaSearch {
            location: self.location.filter(|l| !l.trim().is_empty()),
            min_price_cents: self.min_price,
            max_price_cents: self.max_price,
            guests: self.guests,
            available,
            amenity: self.amenity.filter(|a| !a.trim().is_empty()),
            sort: self.sort.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuoteQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i32,
}

/// Create villa routes
pub fn villa_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search_villas).post(create_villa))
        .route(
            "/:id",
            get(get_villa).patch(update_villa).delete(delete_villa),
        )
        .route("/:id/availability", get(get_availability))
        .route("/:id/quote", get(get_quote))
        .route("/:id/reviews", get(list_villa_reviews))
}

/// Search active villas
#[utoipa::path(
    get,
    path = "/villas",
    tag = "Villas",
    params(SearchQuery, PaginationParams),
    responses(
        (status = 200, description = "Paginated matching villas", body = [Villa]),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn search_villas(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SearchQuery>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Villa>>> {
    let filter = query.into_filter()?;
    let page = state.services.villas().search(filter, params).await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

/// Villa detail with amenities, rules and rating summary
#[utoipa::path(
    get,
    path = "/villas/{id}",
    tag = "Villas",
    params(("id" = Uuid, Path, description = "Villa ID")),
    responses(
        (status = 200, description = "Villa detail", body = VillaDetail),
        (status = 404, description = "Villa not found or not visible")
    )
)]
pub async fn get_villa(
    current_user: Option<CurrentUser>,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<Json<VillaDetail>> {
    let viewer = current_user.map(|u| u.actor());
    let detail = state.services.villas().get(id, viewer).await?;
    Ok(Json(detail))
}

/// Date ranges already taken
#[utoipa::path(
    get,
    path = "/villas/{id}/availability",
    tag = "Villas",
    params(("id" = Uuid, Path, description = "Villa ID"), AvailabilityQuery),
    responses(
        (status = 200, description = "Blocked date ranges", body = [StayDates]),
        (status = 400, description = "Invalid window"),
        (status = 404, description = "Villa not found")
    )
)]
pub async fn get_availability(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<AvailabilityQuery>,
) -> AppResult<Json<Vec<StayDates>>> {
    let blocked = state
        .services
        .villas()
        .availability(id, query.from, query.to)
        .await?;
    Ok(Json(blocked))
}

/// Price a prospective stay
#[utoipa::path(
    get,
    path = "/villas/{id}/quote",
    tag = "Villas",
    params(("id" = Uuid, Path, description = "Villa ID"), QuoteQuery),
    responses(
        (status = 200, description = "Price breakdown", body = PriceBreakdown),
        (status = 400, description = "Invalid stay"),
        (status = 404, description = "Villa not found"),
        (status = 409, description = "Dates already booked")
    )
)]
pub async fn get_quote(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(query): AppQuery<QuoteQuery>,
) -> AppResult<Json<PriceBreakdown>> {
    let dates = StayDates::new(query.check_in, query.check_out)?;
    let price = state.services.villas().quote(id, dates, query.guests).await?;
    Ok(Json(price))
}

/// Visible reviews of a villa
#[utoipa::path(
    get,
    path = "/villas/{id}/reviews",
    tag = "Villas",
    params(("id" = Uuid, Path, description = "Villa ID"), PaginationParams),
    responses(
        (status = 200, description = "Paginated reviews", body = [Review])
    )
)]
pub async fn list_villa_reviews(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(params): AppQuery<PaginationParams>,
) -> AppResult<Json<Paginated<Review>>> {
    let page = state.services.reviews().list_for_villa(id, params).await?;
    Ok(Json(Paginated::from_page(page, &params)))
}

/// List a new villa (hosts and admins)
#[utoipa::path(
    post,
    path = "/villas",
    tag = "Villas",
    security(("bearer_auth" = [])),
    request_body = CreateVillaRequest,
    responses(
        (status = 201, description = "Villa created", body = VillaDetail),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Guests cannot list villas")
    )
)]
pub async fn create_villa(
    current_user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateVillaRequest>,
) -> AppResult<Created<VillaDetail>> {
    let new_villa = NewVilla {
        owner_id: current_user.id,
        title: payload.title,
        description: payload.description,
        location: payload.location,
        address: payload.address,
        price_per_night_cents: payload.price_per_night_cents,
        cleaning_fee_cents: payload.cleaning_fee_cents,
        max_guests: payload.max_guests,
        bedrooms: payload.bedrooms,
        bathrooms: payload.bathrooms,
        amenities: payload.amenities,
        rules: payload.rules,
    };

    let detail = state
        .services
        .villas()
        .create(current_user.actor(), new_villa)
        .await?;
    Ok(Created(detail))
}

/// Update a villa (owner or admin)
#[utoipa::path(
    patch,
    path = "/villas/{id}",
    tag = "Villas",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Villa ID")),
    request_body = UpdateVillaRequest,
    responses(
        (status = 200, description = "Villa updated", body = VillaDetail),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Villa not found")
    )
)]
pub async fn update_villa(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateVillaRequest>,
) -> AppResult<Json<VillaDetail>> {
    let changes = VillaChanges {
        title: payload.title,
        description: payload.description,
        location: payload.location,
        address: payload.address,
        price_per_night_cents: payload.price_per_night_cents,
        cleaning_fee_cents: payload.cleaning_fee_cents,
        max_guests: payload.max_guests,
        bedrooms: payload.bedrooms,
        bathrooms: payload.bathrooms,
        status: payload.status,
        amenities: payload.amenities,
        rules: payload.rules,
    };

    let detail = state
        .services
        .villas()
        .update(current_user.actor(), id, changes)
        .await?;
    Ok(Json(detail))
}

/// Remove a villa from the marketplace (owner or admin)
#[utoipa::path(
    delete,
    path = "/villas/{id}",
    tag = "Villas",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Villa ID")),
    responses(
        (status = 204, description = "Villa deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Villa not found")
    )
)]
pub async fn delete_villa(
    current_user: CurrentUser,
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> AppResult<NoContent> {
    state
        .services
        .villas()
        .delete(current_user.actor(), id)
        .await?;
    Ok(NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn search_needs_both_dates_or_neither() {
        let half = SearchQuery {
            check_in: Some(d("2026-07-01")),
            ..Default::default()
        };
        assert!(matches!(half.into_filter(), Err(AppError::Validation(_))));

        let full = SearchQuery {
            check_in: Some(d("2026-07-01")),
            check_out: Some(d("2026-07-05")),
            location: Some("  ".to_string()),
            ..Default::default()
        };
        let filter = full.into_filter().unwrap();
        assert_eq!(filter.available.map(|s| s.nights()), Some(4));
        assert!(filter.location.is_none());
        assert_eq!(filter.sort, VillaSort::Newest);
    }
}
