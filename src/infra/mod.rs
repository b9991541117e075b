//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - Caching (Redis)
//! - Unit of Work for transaction management

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{
    BillingRepository, BillingStore, CatalogRepository, CatalogStore, UserRepository, UserStore,
};
pub use unit_of_work::{
    Persistence, ReconciliationStore, TransactionContext, TxBillingRepository, UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockBillingRepository, MockCatalogRepository, MockUserRepository};
