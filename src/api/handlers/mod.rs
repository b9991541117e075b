//! HTTP request handlers.

pub mod admin_handler;
pub mod auth_handler;
pub mod billing_handler;
pub mod catalog_handler;

pub use admin_handler::admin_routes;
pub use auth_handler::auth_routes;
pub use billing_handler::{billing_routes, webhook_routes};
pub use catalog_handler::catalog_routes;
