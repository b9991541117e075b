//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::infra::{Cache, Database};
use crate::services::{
    AuthService, BillingService, CatalogService, ServiceContainer, Services, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Catalog service
    pub catalog_service: Arc<dyn CatalogService>,
    /// Billing service
    pub billing_service: Arc<dyn BillingService>,
    /// Redis cache
    pub cache: Arc<Cache>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from database connection and config.
    ///
    /// This is the recommended way to create AppState as it wires every
    /// service, including the payment provider clients, from one place.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        config: crate::config::Config,
    ) -> Self {
        let container = Services::from_connection(database.get_connection(), config);

        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            catalog_service: container.catalog(),
            billing_service: container.billing(),
            cache,
            database,
        }
    }

    /// Create new application state with manually injected services.
    ///
    /// Used by tests to swap in mock services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        catalog_service: Arc<dyn CatalogService>,
        billing_service: Arc<dyn BillingService>,
        cache: Arc<Cache>,
        database: Arc<Database>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            catalog_service,
            billing_service,
            cache,
            database,
        }
    }
}
