//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod category;
pub mod content;
pub mod course;
pub mod lesson;
pub mod order;
pub mod purchase;
pub mod user;
