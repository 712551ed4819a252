//! Service container: one place that wires every service to the
//! shared unit of work, cache and configuration.
//!
//! Handlers depend on `ServiceContainer`, never on the concrete
//! managers, so router tests can swap in fakes.

use std::sync::Arc;

use super::support::VillaCache;
use super::{
    AdminManager, AdminService, AuthService, Authenticator, BookingManager, BookingService,
    MessageManager, MessageService, NotificationManager, NotificationService, ReviewManager,
    ReviewService, UserManager, UserService, VillaManager, VillaService,
};
use crate::config::Config;
use crate::infra::{Cache, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn villas(&self) -> Arc<dyn VillaService>;

    fn bookings(&self) -> Arc<dyn BookingService>;

    fn messages(&self) -> Arc<dyn MessageService>;

    fn reviews(&self) -> Arc<dyn ReviewService>;

    fn notifications(&self) -> Arc<dyn NotificationService>;

    fn admin(&self) -> Arc<dyn AdminService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub villas: Arc<dyn VillaService>,
    pub bookings: Arc<dyn BookingService>,
    pub messages: Arc<dyn MessageService>,
    pub reviews: Arc<dyn ReviewService>,
    pub notifications: Arc<dyn NotificationService>,
    pub admin: Arc<dyn AdminService>,
}

impl Services {
    /// Build every service over one `Persistence`. `cache` is `None` when
    /// Redis is not configured.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        cache: Option<Arc<Cache>>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let villa_cache = VillaCache::new(cache);
        let policy = config.booking_policy();

        Self {
            users: Arc::new(UserManager::new(uow.clone())),
            villas: Arc::new(VillaManager::new(uow.clone(), villa_cache.clone(), policy)),
            bookings: Arc::new(BookingManager::new(uow.clone(), policy)),
            messages: Arc::new(MessageManager::new(uow.clone())),
            reviews: Arc::new(ReviewManager::new(uow.clone(), villa_cache.clone())),
            notifications: Arc::new(NotificationManager::new(uow.clone())),
            admin: Arc::new(AdminManager::new(uow.clone(), villa_cache)),
            auth: Arc::new(Authenticator::new(uow, config)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.users.clone()
    }

    fn villas(&self) -> Arc<dyn VillaService> {
        self.villas.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingService> {
        self.bookings.clone()
    }

    fn messages(&self) -> Arc<dyn MessageService> {
        self.messages.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewService> {
        self.reviews.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationService> {
        self.notifications.clone()
    }

    fn admin(&self) -> Arc<dyn AdminService> {
        self.admin.clone()
    }
}
