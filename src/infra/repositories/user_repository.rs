//! User repository.

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::paging::{contains_pattern, fetch_page, unique_violation};
use crate::domain::{NewUser, ProfileUpdate, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::types::{Page, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Emails are compared case-insensitively.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a user; a duplicate email yields `AppError::Conflict`.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User>;

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Filter by role and by a name/email substring.
    async fn list(
        &self,
        role: Option<UserRole>,
        search: Option<String>,
        params: PaginationParams,
    ) -> AppResult<Page<User>>;

    async fn count(&self, role: Option<UserRole>) -> AppResult<u64>;
}

pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Empty strings clear optional profile fields.
fn blank_to_none(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) async fn find_user<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<User>> {
    let model = UserEntity::find_by_id(id).one(db).await?;
    Ok(model.map(User::from))
}

pub(crate) async fn set_user_role<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    role: UserRole,
) -> AppResult<User> {
    let model = UserEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = model.into();
    active.role = Set(role.as_str().to_string());
    active.updated_at = Set(chrono::Utc::now());

    Ok(User::from(active.update(db).await?))
}

/// Hard delete; dependent rows go with it through `ON DELETE CASCADE`.
pub(crate) async fn delete_user<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<()> {
    let result = UserEntity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        find_user(&self.db, id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(new_user.email.trim().to_lowercase()),
            password_hash: Set(new_user.password_hash),
            name: Set(new_user.name),
            role: Set(new_user.role.as_str().to_string()),
            phone: Set(None),
            bio: Set(None),
            avatar_url: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| unique_violation(e, "Email is already registered"))?;
        Ok(User::from(model))
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = model.into();
        if let Some(name) = update.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(phone) = update.phone {
            active.phone = Set(blank_to_none(phone));
        }
        if let Some(bio) = update.bio {
            active.bio = Set(blank_to_none(bio));
        }
        if let Some(avatar_url) = update.avatar_url {
            active.avatar_url = Set(blank_to_none(avatar_url));
        }
        active.updated_at = Set(chrono::Utc::now());

        Ok(User::from(active.update(&self.db).await?))
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list(
        &self,
        role: Option<UserRole>,
        search: Option<String>,
        params: PaginationParams,
    ) -> AppResult<Page<User>> {
        let mut query = UserEntity::find().order_by_desc(user::Column::CreatedAt);

        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role.as_str()));
        }
        if let Some(term) = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Name)))
                            .like(contains_pattern(&term)),
                    )
                    .add(Expr::col(user::Column::Email).like(contains_pattern(&term))),
            );
        }

        Ok(fetch_page(&self.db, query, &params).await?.map(User::from))
    }

    async fn count(&self, role: Option<UserRole>) -> AppResult<u64> {
        let mut query = UserEntity::find();
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role.as_str()));
        }
        Ok(query.count(&self.db).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_clear_fields() {
        assert_eq!(blank_to_none("   ".to_string()), None);
        assert_eq!(blank_to_none(" +30 210 ".to_string()), Some("+30 210".to_string()));
    }
}
