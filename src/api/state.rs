//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database};
use crate::services::{ServiceContainer, Services};

/// Shared by every handler. Redis and the database handle are optional
/// so the router can run over fake services in tests.
#[derive(Clone)]
pub struct AppState {
    /// Service container
    pub services: Arc<dyn ServiceContainer>,
    /// Redis cache, absent when `REDIS_URL` is unset
    pub cache: Option<Arc<Cache>>,
    /// Database handle for health checks
    pub database: Option<Arc<Database>>,
    /// Whether forwarding headers identify the client
    pub trust_proxy: bool,
}

impl AppState {
    /// Wire the real services over a connected database.
    pub fn from_config(database: Arc<Database>, cache: Option<Arc<Cache>>, config: Config) -> Self {
        let trust_proxy = config.trust_proxy;
        let services = Services::from_connection(database.get_connection(), config, cache.clone());

        Self {
            services: Arc::new(services),
            cache,
            database: Some(database),
            trust_proxy,
        }
    }

    /// State over an arbitrary service container, without infrastructure.
    pub fn new(services: Arc<dyn ServiceContainer>) -> Self {
        Self {
            services,
            cache: None,
            database: None,
            trust_proxy: false,
        }
    }
}
