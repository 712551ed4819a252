//! User service: own account and public profiles.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{ProfileUpdate, PublicProfile, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User>;

    async fn public_profile(&self, id: Uuid) -> AppResult<PublicProfile>;
}

pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Name cannot be empty"));
            }
        }
        if update == ProfileUpdate::default() {
            return self.get_user(id).await;
        }
        self.uow.users().update_profile(id, update).await
    }

    async fn public_profile(&self, id: Uuid) -> AppResult<PublicProfile> {
        self.get_user(id).await.map(PublicProfile::from)
    }
}
