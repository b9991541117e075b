//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{admin_handler, auth_handler, billing_handler, catalog_handler};
use crate::domain::{
    Category, Content, ContentKind, Course, CourseDetail, CreateContent, CreateCourse,
    CreateLesson, EntitledCourse, Lesson, LessonDetail, LessonNode, LessonSummary, UpdateContent,
    UpdateCourse, UpdateLesson, UserResponse, UserRole,
};
use crate::payments::CheckoutSession;
use crate::services::{DashboardStats, TokenResponse};
use crate::types::MessageResponse;

/// OpenAPI documentation for the CourseHub API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "CourseHub API",
        version = "0.1.0",
        description = "Course-selling platform: public catalog, admin panel and payment reconciliation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        // Public catalog endpoints
        catalog_handler::list_courses,
        catalog_handler::get_course,
        catalog_handler::get_lesson,
        catalog_handler::list_categories,
        // Billing endpoints
        billing_handler::checkout,
        billing_handler::webhook,
        billing_handler::my_courses,
        // Admin endpoints
        admin_handler::list_users,
        admin_handler::get_user,
        admin_handler::delete_user,
        admin_handler::change_role,
        admin_handler::stats,
        admin_handler::list_categories,
        admin_handler::create_category,
        admin_handler::update_category,
        admin_handler::delete_category,
        admin_handler::create_course,
        admin_handler::get_course,
        admin_handler::update_course,
        admin_handler::delete_course,
        admin_handler::create_lesson,
        admin_handler::update_lesson,
        admin_handler::delete_lesson,
        admin_handler::create_content,
        admin_handler::update_content,
        admin_handler::delete_content,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            Category,
            Course,
            CourseDetail,
            Lesson,
            LessonNode,
            LessonDetail,
            LessonSummary,
            Content,
            ContentKind,
            CreateCourse,
            UpdateCourse,
            CreateLesson,
            UpdateLesson,
            CreateContent,
            UpdateContent,
            EntitledCourse,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            TokenResponse,
            // Billing types
            billing_handler::CheckoutPayload,
            CheckoutSession,
            DashboardStats,
            // Admin types
            admin_handler::CategoryRequest,
            admin_handler::ChangeRoleRequest,
            // Shared types
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "User registration and login"),
        (name = "Catalog", description = "Public course catalog"),
        (name = "Billing", description = "Checkout, webhooks and purchased courses"),
        (name = "Admin", description = "Catalog and user management")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
