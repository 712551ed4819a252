//! Villa service: listings, search, availability and quotes.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use uuid::Uuid;

use super::support::{today, VillaCache};
use crate::config::{MAX_CLEANING_FEE_CENTS, MAX_NIGHTLY_PRICE_CENTS};
use crate::domain::{
    normalize_amenities, Actor, BookingPolicy, NewVilla, PriceBreakdown, StayDates, Villa,
    VillaChanges, VillaDetail, VillaSearch, VillaStatus,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

/// Longest window the availability endpoint will scan.
const MAX_AVAILABILITY_DAYS: i64 = 366;

#[async_trait]
pub trait VillaService: Send + Sync {
    /// Hosts and admins only; the caller becomes the owner.
    async fn create(&self, actor: Actor, villa: NewVilla) -> AppResult<VillaDetail>;

    /// Active listings are public. Owners and admins also see their
    /// inactive or suspended ones; deleted listings are gone for everyone.
    async fn get(&self, id: Uuid, viewer: Option<Actor>) -> AppResult<VillaDetail>;

    async fn update(&self, actor: Actor, id: Uuid, changes: VillaChanges) -> AppResult<VillaDetail>;

    /// Soft delete.
    async fn delete(&self, actor: Actor, id: Uuid) -> AppResult<()>;

    async fn search(&self, filter: VillaSearch, params: PaginationParams) -> AppResult<Page<Villa>>;

    async fn list_own(&self, actor: Actor, params: PaginationParams) -> AppResult<Page<Villa>>;

    /// Date ranges held by pending or confirmed bookings within `[from, to)`.
    async fn availability(&self, id: Uuid, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<StayDates>>;

    async fn quote(&self, id: Uuid, dates: StayDates, guests: i32) -> AppResult<PriceBreakdown>;
}

pub struct VillaManager<U: UnitOfWork> {
    uow: Arc<U>,
    cache: VillaCache,
    policy: BookingPolicy,
}

impl<U: UnitOfWork> VillaManager<U> {
    pub fn new(uow: Arc<U>, cache: VillaCache, policy: BookingPolicy) -> Self {
        Self { uow, cache, policy }
    }

    async fn find_live(&self, id: Uuid) -> AppResult<Villa> {
        match self.uow.villas().find_by_id(id).await? {
            Some(villa) if villa.status != VillaStatus::Deleted => Ok(villa),
            _ => Err(AppError::NotFound),
        }
    }

    /// Load a listing the actor may modify.
    async fn find_managed(&self, actor: Actor, id: Uuid) -> AppResult<Villa> {
        let villa = self.find_live(id).await?;
        if !actor.is_admin() && !villa.is_owned_by(actor.id) {
            return Err(AppError::Forbidden);
        }
        Ok(villa)
    }

    async fn load_detail(&self, villa: Villa) -> AppResult<VillaDetail> {
        let villas = self.uow.villas();
        let reviews = self.uow.reviews();
        let (amenities, rules, summary) = tokio::try_join!(
            villas.amenities(villa.id),
            villas.rules(villa.id),
            reviews.summary(villa.id),
        )?;

        Ok(VillaDetail {
            villa,
            amenities,
            rules,
            reviews: summary,
        })
    }
}

fn validate_listing(
    price_per_night_cents: Option<i64>,
    cleaning_fee_cents: Option<i64>,
    max_guests: Option<i32>,
    rooms: [Option<i32>; 2],
) -> AppResult<()> {
    if price_per_night_cents.is_some_and(|p| p <= 0 || p > MAX_NIGHTLY_PRICE_CENTS) {
        return Err(AppError::validation(format!(
            "Nightly price must be between 1 and {} cents",
            MAX_NIGHTLY_PRICE_CENTS
        )));
    }
    if cleaning_fee_cents.is_some_and(|f| !(0..=MAX_CLEANING_FEE_CENTS).contains(&f)) {
        return Err(AppError::validation(format!(
            "Cleaning fee must be between 0 and {} cents",
            MAX_CLEANING_FEE_CENTS
        )));
    }
    if max_guests.is_some_and(|g| g < 1) {
        return Err(AppError::validation("A villa must accommodate at least one guest"));
    }
    if rooms.iter().flatten().any(|&n| n < 0) {
        return Err(AppError::validation("Room counts cannot be negative"));
    }
    Ok(())
}

#[async_trait]
impl<U: UnitOfWork> VillaService for VillaManager<U> {
    async fn create(&self, actor: Actor, mut villa: NewVilla) -> AppResult<VillaDetail> {
        if !actor.role.can_list_villas() {
            return Err(AppError::Forbidden);
        }
        validate_listing(
            Some(villa.price_per_night_cents),
            Some(villa.cleaning_fee_cents),
            Some(villa.max_guests),
            [Some(villa.bedrooms), Some(villa.bathrooms)],
        )?;

        villa.owner_id = actor.id;
        villa.amenities = normalize_amenities(villa.amenities);
        let created = self.uow.villas().create(villa).await?;

        tracing::info!(villa_id = %created.id, owner_id = %created.owner_id, "villa created");
        self.load_detail(created).await
    }

    async fn get(&self, id: Uuid, viewer: Option<Actor>) -> AppResult<VillaDetail> {
        if let Some(detail) = self.cache.get(id).await {
            return Ok(detail);
        }

        let villa = self.find_live(id).await?;
        if !villa.status.is_public() {
            let allowed = viewer.is_some_and(|v| v.is_admin() || villa.is_owned_by(v.id));
            if !allowed {
                return Err(AppError::NotFound);
            }
        }

        let detail = self.load_detail(villa).await?;
        if detail.villa.status.is_public() {
            self.cache.put(&detail).await;
        }
        Ok(detail)
    }

    async fn update(&self, actor: Actor, id: Uuid, mut changes: VillaChanges) -> AppResult<VillaDetail> {
        let villa = self.find_managed(actor, id).await?;

        if let Some(status) = changes.status {
            if !actor.is_admin() {
                if !status.owner_settable() {
                    return Err(AppError::Forbidden);
                }
                if villa.status == VillaStatus::Suspended {
                    return Err(AppError::validation(
                        "This villa is suspended; contact support to reinstate it",
                    ));
                }
            }
            if status == VillaStatus::Deleted {
                return Err(AppError::validation("Use DELETE to remove a villa"));
            }
        }
        validate_listing(
            changes.price_per_night_cents,
            changes.cleaning_fee_cents,
            changes.max_guests,
            [changes.bedrooms, changes.bathrooms],
        )?;
        changes.amenities = changes.amenities.map(normalize_amenities);

        let updated = self.uow.villas().update(id, changes).await?;
        self.cache.invalidate(id).await;
        self.load_detail(updated).await
    }

    async fn delete(&self, actor: Actor, id: Uuid) -> AppResult<()> {
        self.find_managed(actor, id).await?;
        self.uow.villas().set_status(id, VillaStatus::Deleted).await?;
        self.cache.invalidate(id).await;

        tracing::info!(villa_id = %id, actor_id = %actor.id, "villa deleted");
        Ok(())
    }

    async fn search(&self, filter: VillaSearch, params: PaginationParams) -> AppResult<Page<Villa>> {
        if let (Some(min), Some(max)) = (filter.min_price_cents, filter.max_price_cents) {
            if min > max {
                return Err(AppError::validation("min_price cannot exceed max_price"));
            }
        }
        if filter.guests.is_some_and(|g| g < 1) {
            return Err(AppError::validation("guests must be at least 1"));
        }
        self.uow.villas().search(filter, params).await
    }

    async fn list_own(&self, actor: Actor, params: PaginationParams) -> AppResult<Page<Villa>> {
        if !actor.role.can_list_villas() {
            return Err(AppError::Forbidden);
        }
        self.uow.villas().list_by_owner(actor.id, params).await
    }

    async fn availability(&self, id: Uuid, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<StayDates>> {
        if to <= from {
            return Err(AppError::validation("'to' must be after 'from'"));
        }
        if (to - from).num_days() > MAX_AVAILABILITY_DAYS {
            return Err(AppError::validation(format!(
                "Availability can be queried for at most {} days",
                MAX_AVAILABILITY_DAYS
            )));
        }
        self.find_live(id).await?;
        self.uow.bookings().blocked_ranges(id, from, to).await
    }

    async fn quote(&self, id: Uuid, dates: StayDates, guests: i32) -> AppResult<PriceBreakdown> {
        let villa = self.find_live(id).await?;
        let price = self.policy.quote(&villa, &dates, guests, today())?;

        if self.uow.bookings().has_overlap(id, dates, None).await? {
            return Err(AppError::conflict("The villa is not available for these dates"));
        }
        Ok(price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ReviewSummary, UserRole};
    use crate::services::test_support::{stay, villa, BuiltUnitOfWork, TestUnitOfWork};

    const POLICY: BookingPolicy = BookingPolicy {
        service_fee_percent: 10,
        max_nights: 90,
    };

    fn service(uow: TestUnitOfWork) -> VillaManager<BuiltUnitOfWork> {
        VillaManager::new(uow.build(), VillaCache::disabled(), POLICY)
    }

    fn expect_detail(uow: &mut TestUnitOfWork) {
        uow.villas
            .expect_amenities()
            .returning(|_| Ok(vec!["Pool".to_string()]));
        uow.villas.expect_rules().returning(|_| Ok(vec![]));
        uow.reviews
            .expect_summary()
            .returning(|_| Ok(ReviewSummary::default()));
    }

    fn new_villa() -> NewVilla {
        NewVilla {
            owner_id: Uuid::nil(),
            title: "Villa Thalassa".to_string(),
            description: "Sea views".to_string(),
            location: "Paros".to_string(),
            address: "Naoussa".to_string(),
            price_per_night_cents: 30_000,
            cleaning_fee_cents: 5_000,
            max_guests: 6,
            bedrooms: 3,
            bathrooms: 2,
            amenities: vec!["Pool".to_string(), " pool ".to_string(), "Wifi".to_string()],
            rules: vec![],
        }
    }

    #[tokio::test]
    async fn guests_cannot_create_villas() {
        let uow = TestUnitOfWork::default();
        let actor = Actor::new(Uuid::new_v4(), UserRole::Guest);

        let result = service(uow).create(actor, new_villa()).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn create_sets_owner_and_normalizes_amenities() {
        let host = Actor::new(Uuid::new_v4(), UserRole::Host);
        let mut uow = TestUnitOfWork::default();
        uow.villas.expect_create().returning(move |v| {
            assert_eq!(v.owner_id, host.id);
            assert_eq!(v.amenities, vec!["Pool".to_string(), "Wifi".to_string()]);
            Ok(villa(Uuid::new_v4(), v.owner_id, v.max_guests))
        });
        expect_detail(&mut uow);

        let detail = service(uow).create(host, new_villa()).await.unwrap();
        assert_eq!(detail.villa.owner_id, host.id);
    }

    #[tokio::test]
    async fn create_rejects_non_positive_price() {
        let host = Actor::new(Uuid::new_v4(), UserRole::Host);
        let mut input = new_villa();
        input.price_per_night_cents = 0;

        let result = service(TestUnitOfWork::default()).create(host, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn create_rejects_prices_above_the_cap() {
        let host = Actor::new(Uuid::new_v4(), UserRole::Host);
        let mut input = new_villa();
        input.price_per_night_cents = 200_000_000_000_000_000;
        let result = service(TestUnitOfWork::default()).create(host, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let mut input = new_villa();
        input.cleaning_fee_cents = MAX_CLEANING_FEE_CENTS + 1;
        let result = service(TestUnitOfWork::default()).create(host, input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn inactive_villa_is_hidden_from_strangers() {
        let owner = Uuid::new_v4();
        let mut uow = TestUnitOfWork::default();
        uow.villas.expect_find_by_id().returning(move |id| {
            let mut v = villa(id, owner, 4);
            v.status = VillaStatus::Inactive;
            Ok(Some(v))
        });
        expect_detail(&mut uow);
        let svc = service(uow);

        let stranger = Actor::new(Uuid::new_v4(), UserRole::Guest);
        assert!(matches!(
            svc.get(Uuid::new_v4(), Some(stranger)).await,
            Err(AppError::NotFound)
        ));
        assert!(matches!(svc.get(Uuid::new_v4(), None).await, Err(AppError::NotFound)));

        let detail = svc
            .get(Uuid::new_v4(), Some(Actor::new(owner, UserRole::Host)))
            .await
            .unwrap();
        assert_eq!(detail.villa.status, VillaStatus::Inactive);
    }

    #[tokio::test]
    async fn deleted_villa_is_not_found() {
        let mut uow = TestUnitOfWork::default();
        uow.villas.expect_find_by_id().returning(|id| {
            let mut v = villa(id, Uuid::new_v4(), 4);
            v.status = VillaStatus::Deleted;
            Ok(Some(v))
        });

        let admin = Actor::new(Uuid::new_v4(), UserRole::Admin);
        let result = service(uow).get(Uuid::new_v4(), Some(admin)).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn only_owner_or_admin_may_update() {
        let mut uow = TestUnitOfWork::default();
        uow.villas
            .expect_find_by_id()
            .returning(|id| Ok(Some(villa(id, Uuid::new_v4(), 4))));
        uow.villas.expect_update().never();

        let other_host = Actor::new(Uuid::new_v4(), UserRole::Host);
        let result = service(uow)
            .update(other_host, Uuid::new_v4(), VillaChanges::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn owner_cannot_suspend_own_villa() {
        let owner = Uuid::new_v4();
        let mut uow = TestUnitOfWork::default();
        uow.villas
            .expect_find_by_id()
            .returning(move |id| Ok(Some(villa(id, owner, 4))));

        let changes = VillaChanges {
            status: Some(VillaStatus::Suspended),
            ..Default::default()
        };
        let result = service(uow)
            .update(Actor::new(owner, UserRole::Host), Uuid::new_v4(), changes)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn quote_rejects_over_capacity() {
        let mut uow = TestUnitOfWork::default();
        uow.villas
            .expect_find_by_id()
            .returning(|id| Ok(Some(villa(id, Uuid::new_v4(), 2))));
        uow.bookings.expect_has_overlap().never();

        let result = service(uow).quote(Uuid::new_v4(), stay(10, 3), 5).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn quote_prices_free_dates() {
        let mut uow = TestUnitOfWork::default();
        uow.villas
            .expect_find_by_id()
            .returning(|id| Ok(Some(villa(id, Uuid::new_v4(), 4))));
        uow.bookings.expect_has_overlap().returning(|_, _, _| Ok(false));

        let price = service(uow).quote(Uuid::new_v4(), stay(10, 3), 2).await.unwrap();
        assert_eq!(price.nights, 3);
        assert_eq!(price.subtotal_cents, 45_000);
        assert_eq!(price.service_fee_cents, 4_500);
        assert_eq!(price.total_cents, 52_500);
    }

    #[tokio::test]
    async fn availability_rejects_inverted_window() {
        let from = stay(5, 1).check_in;
        let result = service(TestUnitOfWork::default())
            .availability(Uuid::new_v4(), from, from)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn search_rejects_inverted_price_range() {
        let filter = VillaSearch {
            min_price_cents: Some(50_000),
            max_price_cents: Some(10_000),
            ..Default::default()
        };
        let result = service(TestUnitOfWork::default())
            .search(filter, PaginationParams::default())
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
