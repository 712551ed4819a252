//! Villa repository: listings plus their amenity and rule rows.

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Func, Query},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{booking, villa, villa_amenity, villa_rule};
use super::paging::{contains_pattern, fetch_page};
use crate::domain::{BookingStatus, NewVilla, Villa, VillaChanges, VillaSearch, VillaSort, VillaStatus};
use crate::errors::{AppError, AppResult};
use crate::types::{Page, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait VillaRepository: Send + Sync {
    /// Insert the listing with its amenities and rules in one transaction.
    async fn create(&self, villa: NewVilla) -> AppResult<Villa>;

    /// Any status, including deleted.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Villa>>;

    async fn amenities(&self, villa_id: Uuid) -> AppResult<Vec<String>>;

    async fn rules(&self, villa_id: Uuid) -> AppResult<Vec<String>>;

    /// Apply a partial update; amenity and rule lists are replaced when given.
    async fn update(&self, id: Uuid, changes: VillaChanges) -> AppResult<Villa>;

    async fn set_status(&self, id: Uuid, status: VillaStatus) -> AppResult<Villa>;

    /// Public search over active listings.
    async fn search(&self, filter: VillaSearch, params: PaginationParams) -> AppResult<Page<Villa>>;

    /// An owner's listings in every status except deleted.
    async fn list_by_owner(&self, owner_id: Uuid, params: PaginationParams) -> AppResult<Page<Villa>>;

    async fn list_all(
        &self,
        status: Option<VillaStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Villa>>;

    async fn count_by_status(&self, status: VillaStatus) -> AppResult<u64>;
}

pub struct VillaStore {
    db: DatabaseConnection,
}

impl VillaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(crate) async fn find_villa<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<Villa>> {
    Ok(villa::Entity::find_by_id(id).one(db).await?.map(Villa::from))
}

/// Ids of every villa `owner_id` lists, whatever their status.
pub(crate) async fn villa_ids_by_owner<C: ConnectionTrait>(
    db: &C,
    owner_id: Uuid,
) -> AppResult<Vec<Uuid>> {
    let ids = villa::Entity::find()
        .select_only()
        .column(villa::Column::Id)
        .filter(villa::Column::OwnerId.eq(owner_id))
        .into_tuple::<Uuid>()
        .all(db)
        .await?;
    Ok(ids)
}

pub(crate) async fn set_villa_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: VillaStatus,
) -> AppResult<Villa> {
    let model = villa::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: villa::ActiveModel = model.into();
    active.status = Set(status.as_str().to_string());
    active.updated_at = Set(chrono::Utc::now());

    Ok(Villa::from(active.update(db).await?))
}

async fn replace_amenities<C: ConnectionTrait>(
    db: &C,
    villa_id: Uuid,
    names: Vec<String>,
) -> AppResult<()> {
    villa_amenity::Entity::delete_many()
        .filter(villa_amenity::Column::VillaId.eq(villa_id))
        .exec(db)
        .await?;

    if names.is_empty() {
        return Ok(());
    }

    let rows = names
        .into_iter()
        .enumerate()
        .map(|(position, name)| villa_amenity::ActiveModel {
            id: Set(Uuid::new_v4()),
            villa_id: Set(villa_id),
            name: Set(name),
            position: Set(position as i32),
        });
    villa_amenity::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

async fn replace_rules<C: ConnectionTrait>(
    db: &C,
    villa_id: Uuid,
    rules: Vec<String>,
) -> AppResult<()> {
    villa_rule::Entity::delete_many()
        .filter(villa_rule::Column::VillaId.eq(villa_id))
        .exec(db)
        .await?;

    let rows: Vec<_> = rules
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .enumerate()
        .map(|(position, rule)| villa_rule::ActiveModel {
            id: Set(Uuid::new_v4()),
            villa_id: Set(villa_id),
            rule: Set(rule),
            position: Set(position as i32),
        })
        .collect();

    if rows.is_empty() {
        return Ok(());
    }
    villa_rule::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

fn apply_sort(query: Select<villa::Entity>, sort: VillaSort) -> Select<villa::Entity> {
    match sort {
        VillaSort::Newest => query.order_by_desc(villa::Column::CreatedAt),
        VillaSort::PriceAsc => query
            .order_by_asc(villa::Column::PricePerNightCents)
            .order_by_desc(villa::Column::CreatedAt),
        VillaSort::PriceDesc => query
            .order_by_desc(villa::Column::PricePerNightCents)
            .order_by_desc(villa::Column::CreatedAt),
    }
}

fn search_query(filter: VillaSearch) -> Select<villa::Entity> {
    let mut query =
        villa::Entity::find().filter(villa::Column::Status.eq(VillaStatus::Active.as_str()));

    if let Some(location) = filter
        .location
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty())
    {
        query = query.filter(
            Expr::expr(Func::lower(Expr::col(villa::Column::Location)))
                .like(contains_pattern(&location)),
        );
    }
    if let Some(min) = filter.min_price_cents {
        query = query.filter(villa::Column::PricePerNightCents.gte(min));
    }
    if let Some(max) = filter.max_price_cents {
        query = query.filter(villa::Column::PricePerNightCents.lte(max));
    }
    if let Some(guests) = filter.guests {
        query = query.filter(villa::Column::MaxGuests.gte(guests));
    }
    if let Some(dates) = filter.available {
        let blocking: Vec<&str> = BookingStatus::blocking().iter().map(|s| s.as_str()).collect();
        query = query.filter(
            villa::Column::Id.not_in_subquery(
                Query::select()
                    .column(booking::Column::VillaId)
                    .from(booking::Entity)
                    .and_where(booking::Column::Status.is_in(blocking))
                    .and_where(booking::Column::CheckIn.lt(dates.check_out))
                    .and_where(booking::Column::CheckOut.gt(dates.check_in))
                    .to_owned(),
            ),
        );
    }
    if let Some(amenity) = filter
        .amenity
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
    {
        query = query.filter(
            villa::Column::Id.in_subquery(
                Query::select()
                    .column(villa_amenity::Column::VillaId)
                    .from(villa_amenity::Entity)
                    .and_where(
                        Expr::expr(Func::lower(Expr::col(villa_amenity::Column::Name))).eq(amenity),
                    )
                    .to_owned(),
            ),
        );
    }

    apply_sort(query, filter.sort)
}

#[async_trait]
impl VillaRepository for VillaStore {
    async fn create(&self, new_villa: NewVilla) -> AppResult<Villa> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now();
        let id = Uuid::new_v4();

        let model = villa::ActiveModel {
            id: Set(id),
            owner_id: Set(new_villa.owner_id),
            title: Set(new_villa.title),
            description: Set(new_villa.description),
            location: Set(new_villa.location),
            address: Set(new_villa.address),
            price_per_night_cents: Set(new_villa.price_per_night_cents),
            cleaning_fee_cents: Set(new_villa.cleaning_fee_cents),
            max_guests: Set(new_villa.max_guests),
            bedrooms: Set(new_villa.bedrooms),
            bathrooms: Set(new_villa.bathrooms),
            status: Set(VillaStatus::Active.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        replace_amenities(&txn, id, new_villa.amenities).await?;
        replace_rules(&txn, id, new_villa.rules).await?;
        txn.commit().await?;

        Ok(Villa::from(model))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Villa>> {
        find_villa(&self.db, id).await
    }

    async fn amenities(&self, villa_id: Uuid) -> AppResult<Vec<String>> {
        let rows = villa_amenity::Entity::find()
            .filter(villa_amenity::Column::VillaId.eq(villa_id))
            .order_by_asc(villa_amenity::Column::Position)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|r| r.name).collect())
    }

    async fn rules(&self, villa_id: Uuid) -> AppResult<Vec<String>> {
        let rows = villa_rule::Entity::find()
            .filter(villa_rule::Column::VillaId.eq(villa_id))
            .order_by_asc(villa_rule::Column::Position)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(|r| r.rule).collect())
    }

    async fn update(&self, id: Uuid, changes: VillaChanges) -> AppResult<Villa> {
        let txn = self.db.begin().await?;

        let model = villa::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: villa::ActiveModel = model.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(location) = changes.location {
            active.location = Set(location);
        }
        if let Some(address) = changes.address {
            active.address = Set(address);
        }
        if let Some(price) = changes.price_per_night_cents {
            active.price_per_night_cents = Set(price);
        }
        if let Some(fee) = changes.cleaning_fee_cents {
            active.cleaning_fee_cents = Set(fee);
        }
        if let Some(max_guests) = changes.max_guests {
            active.max_guests = Set(max_guests);
        }
        if let Some(bedrooms) = changes.bedrooms {
            active.bedrooms = Set(bedrooms);
        }
        if let Some(bathrooms) = changes.bathrooms {
            active.bathrooms = Set(bathrooms);
        }
        if let Some(status) = changes.status {
            active.status = Set(status.as_str().to_string());
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&txn).await?;

        if let Some(amenities) = changes.amenities {
            replace_amenities(&txn, id, amenities).await?;
        }
        if let Some(rules) = changes.rules {
            replace_rules(&txn, id, rules).await?;
        }
        txn.commit().await?;

        Ok(Villa::from(model))
    }

    async fn set_status(&self, id: Uuid, status: VillaStatus) -> AppResult<Villa> {
        set_villa_status(&self.db, id, status).await
    }

    async fn search(&self, filter: VillaSearch, params: PaginationParams) -> AppResult<Page<Villa>> {
        let query = search_query(filter);
        Ok(fetch_page(&self.db, query, &params).await?.map(Villa::from))
    }

    async fn list_by_owner(&self, owner_id: Uuid, params: PaginationParams) -> AppResult<Page<Villa>> {
        let query = villa::Entity::find()
            .filter(villa::Column::OwnerId.eq(owner_id))
            .filter(villa::Column::Status.ne(VillaStatus::Deleted.as_str()))
            .order_by_desc(villa::Column::CreatedAt);
        Ok(fetch_page(&self.db, query, &params).await?.map(Villa::from))
    }

    async fn list_all(
        &self,
        status: Option<VillaStatus>,
        params: PaginationParams,
    ) -> AppResult<Page<Villa>> {
        let mut query = villa::Entity::find().order_by_desc(villa::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(villa::Column::Status.eq(status.as_str()));
        }
        Ok(fetch_page(&self.db, query, &params).await?.map(Villa::from))
    }

    async fn count_by_status(&self, status: VillaStatus) -> AppResult<u64> {
        Ok(villa::Entity::find()
            .filter(villa::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await?)
    }
}
