//! Service container: centralized service construction and access.

use std::sync::Arc;

use super::{AuthService, BillingService, CatalogService, UserService};
use crate::config::Config;
use crate::infra::Persistence;
use crate::payments::PaymentProvider;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get catalog service
    fn catalog(&self) -> Arc<dyn CatalogService>;

    /// Get billing service
    fn billing(&self) -> Arc<dyn BillingService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    catalog_service: Arc<dyn CatalogService>,
    billing_service: Arc<dyn BillingService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        catalog_service: Arc<dyn CatalogService>,
        billing_service: Arc<dyn BillingService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            catalog_service,
            billing_service,
        }
    }

    /// Create service container from database connection and config.
    ///
    /// Provider clients share one HTTP connection pool and are injected
    /// into the billing service; nothing reads provider credentials at
    /// call time.
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        use super::{Authenticator, BillingManager, CatalogManager, UserManager};
        use crate::payments::{RazorpayClient, StripeClient};

        let uow = Arc::new(Persistence::new(db));

        let http = reqwest::Client::new();
        let providers: Vec<Arc<dyn PaymentProvider>> = vec![
            Arc::new(RazorpayClient::new(http.clone(), config.razorpay.clone())),
            Arc::new(StripeClient::new(
                http,
                config.stripe.clone(),
                config.checkout_origin.clone(),
            )),
        ];

        let auth_service = Arc::new(Authenticator::new(uow.clone(), config.clone()));
        let user_service = Arc::new(UserManager::new(uow.clone()));
        let catalog_service = Arc::new(CatalogManager::new(uow.clone()));
        let billing_service = Arc::new(BillingManager::new(
            uow,
            providers,
            config.currency.clone(),
        ));

        Self {
            auth_service,
            user_service,
            catalog_service,
            billing_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }

    fn billing(&self) -> Arc<dyn BillingService> {
        self.billing_service.clone()
    }
}
