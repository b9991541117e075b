//! Domain layer - Core business entities and logic
//!
//! This module contains the core domain models that represent
//! business concepts independent of infrastructure concerns.

pub mod billing;
pub mod category;
pub mod course;
pub mod lesson;
pub mod password;
pub mod user;

pub use billing::{
    from_minor_units, to_minor_units, NewOrder, Order, OrderStatus, Purchase, PurchaseStatus,
};
pub use category::{slugify, Category};
pub use course::{
    Course, CourseDetail, CreateCourse, EntitledCourse, LessonSummary, UpdateCourse,
};
pub use lesson::{
    build_lesson_tree, Content, ContentKind, CreateContent, CreateLesson, Lesson, LessonDetail,
    LessonNode, UpdateContent, UpdateLesson,
};
pub use password::Password;
pub use user::{User, UserResponse, UserRole};
