//! Public storefront handlers: course catalog browsing.
//!
//! Everything here is unauthenticated; lesson video URLs and content
//! bodies are public by design, entitlements only gate the "my courses"
//! view in the billing handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::domain::{Category, Course, CourseDetail, LessonDetail};
use crate::errors::AppResult;

/// Create public catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/:id", get(get_course))
        .route("/courses/:course_id/lessons/:lesson_id", get(get_lesson))
        .route("/categories", get(list_categories))
}

/// List all courses, newest first
#[utoipa::path(
    get,
    path = "/courses",
    tag = "Catalog",
    responses(
        (status = 200, description = "List of courses", body = [Course])
    )
)]
pub async fn list_courses(State(state): State<AppState>) -> AppResult<Json<Vec<Course>>> {
    let courses = state.catalog_service.list_courses().await?;
    Ok(Json(courses))
}

/// Get one course with its lesson tree
#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course detail with nested lessons", body = CourseDetail),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CourseDetail>> {
    let detail = state.catalog_service.course_detail(id).await?;
    Ok(Json(detail))
}

/// Get one lesson of a course with its content blocks
#[utoipa::path(
    get,
    path = "/courses/{course_id}/lessons/{lesson_id}",
    tag = "Catalog",
    params(
        ("course_id" = Uuid, Path, description = "Course id"),
        ("lesson_id" = Uuid, Path, description = "Lesson id")
    ),
    responses(
        (status = 200, description = "Lesson with ordered content blocks", body = LessonDetail),
        (status = 404, description = "Lesson not found in this course")
    )
)]
pub async fn get_lesson(
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<LessonDetail>> {
    let detail = state
        .catalog_service
        .lesson_detail(course_id, lesson_id)
        .await?;
    Ok(Json(detail))
}

/// List all categories, alphabetically
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Catalog",
    responses(
        (status = 200, description = "List of categories", body = [Category])
    )
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    let categories = state.catalog_service.list_categories().await?;
    Ok(Json(categories))
}
