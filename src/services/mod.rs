//! Business logic layer. Services depend on repository traits through the
//! Unit of Work and are themselves exposed as traits for handler injection.

pub mod auth_service;
pub mod billing_service;
pub mod catalog_service;
pub mod container;
pub mod user_service;

pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use billing_service::{
    reconcile_captured_payment, BillingManager, BillingService, DashboardStats, WebhookOutcome,
};
pub use catalog_service::{CatalogManager, CatalogService};
pub use container::{ServiceContainer, Services};
pub use user_service::{UserManager, UserService};
