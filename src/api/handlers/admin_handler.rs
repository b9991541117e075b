//! Admin panel handlers: catalog management, users and dashboard stats.
//!
//! All routes are nested behind the JWT middleware; each handler checks
//! the admin role on the typed `CurrentUser` before doing anything.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, patch, post, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{
    Category, Content, Course, CourseDetail, CreateContent, CreateCourse, CreateLesson, Lesson,
    UpdateContent, UpdateCourse, UpdateLesson, UserResponse, UserRole,
};
use crate::errors::{AppError, AppResult};
use crate::services::DashboardStats;
use crate::types::{Created, NoContent};

/// Category create/update request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryRequest {
    /// Category name; the slug is derived from it server-side
    #[validate(length(min = 1, message = "Category name is required"))]
    #[schema(example = "Web Development")]
    pub name: String,
    pub description: Option<String>,
}

/// Role change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeRoleRequest {
    pub role: UserRole,
}

/// Create admin routes (JWT middleware is applied by the router)
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // Users
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id", delete(delete_user))
        .route("/users/:id/role", patch(change_role))
        // Stats
        .route("/stats", get(stats))
        // Categories
        .route("/categories", get(list_categories))
        .route("/categories", post(create_category))
        .route("/categories/:id", put(update_category))
        .route("/categories/:id", delete(delete_category))
        // Courses
        .route("/courses", post(create_course))
        .route("/courses/:id", get(get_course))
        .route("/courses/:id", put(update_course))
        .route("/courses/:id", delete(delete_course))
        // Lessons
        .route("/lessons", post(create_lesson))
        .route("/lessons/:id", put(update_lesson))
        .route("/lessons/:id", delete(delete_lesson))
        // Content blocks
        .route("/contents", post(create_content))
        .route("/contents/:id", put(update_content))
        .route("/contents/:id", delete(delete_content))
}

/// List all users
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = [UserResponse]),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<UserResponse>>> {
    require_admin(&user)?;
    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get one user
#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&user)?;
    let found = state.user_service.get_user(id).await?;
    Ok(Json(UserResponse::from(found)))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete own account"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    if user.id == id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".into(),
        ));
    }
    state.user_service.delete_user(id).await?;
    Ok(NoContent)
}

/// Change a user's role
#[utoipa::path(
    patch,
    path = "/admin/users/{id}/role",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    request_body = ChangeRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 404, description = "User not found")
    )
)]
pub async fn change_role(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    require_admin(&user)?;
    if user.id == id {
        return Err(AppError::BadRequest(
            "You cannot change your own role".into(),
        ));
    }
    let updated = state.user_service.set_role(id, payload.role).await?;
    Ok(Json(UserResponse::from(updated)))
}

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<DashboardStats>> {
    require_admin(&user)?;
    let stats = state.billing_service.dashboard_stats().await?;
    Ok(Json(stats))
}

/// List categories for the admin panel
#[utoipa::path(
    get,
    path = "/admin/categories",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of categories", body = [Category]),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Category>>> {
    require_admin(&user)?;
    let categories = state.catalog_service.list_categories().await?;
    Ok(Json(categories))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/admin/categories",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 409, description = "Category with this slug already exists")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CategoryRequest>,
) -> AppResult<Created<Category>> {
    require_admin(&user)?;
    let category = state
        .catalog_service
        .create_category(payload.name, payload.description)
        .await?;
    Ok(Created(category))
}

/// Update a category (rename re-derives the slug)
#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category with this slug already exists")
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CategoryRequest>,
) -> AppResult<Json<Category>> {
    require_admin(&user)?;
    let category = state
        .catalog_service
        .update_category(id, payload.name, payload.description)
        .await?;
    Ok(Json(category))
}

/// Delete a category; courses in it keep existing without a category
#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found")
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    state.catalog_service.delete_category(id).await?;
    Ok(NoContent)
}

/// Create a course
#[utoipa::path(
    post,
    path = "/admin/courses",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateCourse,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateCourse>,
) -> AppResult<Created<Course>> {
    require_admin(&user)?;
    let course = state.catalog_service.create_course(payload).await?;
    Ok(Created(course))
}

/// Get a course with its lesson tree for editing
#[utoipa::path(
    get,
    path = "/admin/courses/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course detail", body = CourseDetail),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<CourseDetail>> {
    require_admin(&user)?;
    let detail = state.catalog_service.course_detail(id).await?;
    Ok(Json(detail))
}

/// Update a course; absent fields are left unchanged
#[utoipa::path(
    put,
    path = "/admin/courses/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = UpdateCourse,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 404, description = "Course not found")
    )
)]
pub async fn update_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCourse>,
) -> AppResult<Json<Course>> {
    require_admin(&user)?;
    let course = state.catalog_service.update_course(id, payload).await?;
    Ok(Json(course))
}

/// Delete a course and, via cascade, its lessons and content
#[utoipa::path(
    delete,
    path = "/admin/courses/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    state.catalog_service.delete_course(id).await?;
    Ok(NoContent)
}

/// Create a lesson
#[utoipa::path(
    post,
    path = "/admin/lessons",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateLesson,
    responses(
        (status = 201, description = "Lesson created", body = Lesson),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Lesson title already used in this course")
    )
)]
pub async fn create_lesson(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateLesson>,
) -> AppResult<Created<Lesson>> {
    require_admin(&user)?;
    let lesson = state.catalog_service.create_lesson(payload).await?;
    Ok(Created(lesson))
}

/// Update a lesson; absent fields are left unchanged
#[utoipa::path(
    put,
    path = "/admin/lessons/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lesson id")),
    request_body = UpdateLesson,
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 404, description = "Lesson not found"),
        (status = 409, description = "Lesson title already used in this course")
    )
)]
pub async fn update_lesson(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLesson>,
) -> AppResult<Json<Lesson>> {
    require_admin(&user)?;
    let lesson = state.catalog_service.update_lesson(id, payload).await?;
    Ok(Json(lesson))
}

/// Delete a lesson and its content blocks
#[utoipa::path(
    delete,
    path = "/admin/lessons/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Lesson id")),
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn delete_lesson(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    state.catalog_service.delete_lesson(id).await?;
    Ok(NoContent)
}

/// Create a content block
#[utoipa::path(
    post,
    path = "/admin/contents",
    tag = "Admin",
    security(("bearer_auth" = [])),
    request_body = CreateContent,
    responses(
        (status = 201, description = "Content created", body = Content),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn create_content(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<CreateContent>,
) -> AppResult<Created<Content>> {
    require_admin(&user)?;
    let content = state.catalog_service.create_content(payload).await?;
    Ok(Created(content))
}

/// Update a content block
#[utoipa::path(
    put,
    path = "/admin/contents/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Content id")),
    request_body = UpdateContent,
    responses(
        (status = 200, description = "Content updated", body = Content),
        (status = 404, description = "Content not found")
    )
)]
pub async fn update_content(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContent>,
) -> AppResult<Json<Content>> {
    require_admin(&user)?;
    let content = state.catalog_service.update_content(id, payload).await?;
    Ok(Json(content))
}

/// Delete a content block
#[utoipa::path(
    delete,
    path = "/admin/contents/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Content id")),
    responses(
        (status = 204, description = "Content deleted"),
        (status = 404, description = "Content not found")
    )
)]
pub async fn delete_content(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin(&user)?;
    state.catalog_service.delete_content(id).await?;
    Ok(NoContent)
}
