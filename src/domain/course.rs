//! Course domain entity and DTOs.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::lesson::LessonNode;

/// Course domain entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: Uuid,
    #[schema(example = "Rust for Backend Engineers")]
    pub title: String,
    pub description: String,
    /// Price in major currency units (e.g. 499.00 INR)
    #[schema(value_type = f64, example = 499.0)]
    pub price: Decimal,
    pub image_url: String,
    pub category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Course detail with its server-built lesson tree.
///
/// Lessons are nested under their parents and serialized depth-first, so
/// clients never reconstruct the hierarchy themselves.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub lessons: Vec<LessonNode>,
}

/// One course a user is entitled to, with lesson summaries for display.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntitledCourse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub image_url: String,
    pub purchased_at: DateTime<Utc>,
    pub lessons: Vec<LessonSummary>,
}

/// Minimal lesson info for entitlement listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LessonSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

/// Fields for creating a course (admin)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
    #[schema(value_type = f64, example = 499.0)]
    pub price: Decimal,
    pub image_url: String,
    pub category_id: Option<Uuid>,
}

/// Fields for updating a course (admin); absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
}
