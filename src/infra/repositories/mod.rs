//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod billing_repository;
mod catalog_repository;
pub(crate) mod entities;
mod user_repository;

pub use billing_repository::{BillingRepository, BillingStore};
pub use catalog_repository::{CatalogRepository, CatalogStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use billing_repository::MockBillingRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use catalog_repository::MockCatalogRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
