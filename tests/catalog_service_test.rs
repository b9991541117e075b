//! Catalog service unit tests.
//!
//! Uses mock repositories to exercise slug derivation, conflict detection
//! and lesson hierarchy validation without a database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal_macros::dec;
use uuid::Uuid;

use coursehub::domain::{Category, Course, CreateCourse, CreateLesson, Lesson, UpdateLesson};
use coursehub::errors::{AppError, AppResult};
use coursehub::infra::repositories::{
    MockBillingRepository, MockCatalogRepository, MockUserRepository,
};
use coursehub::infra::{
    BillingRepository, CatalogRepository, TransactionContext, UnitOfWork, UserRepository,
};
use coursehub::services::{CatalogManager, CatalogService};

// =============================================================================
// Test doubles
// =============================================================================

struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    catalog: Arc<MockCatalogRepository>,
    billing: Arc<MockBillingRepository>,
}

impl TestUnitOfWork {
    fn with_catalog(catalog: MockCatalogRepository) -> Self {
        Self {
            users: Arc::new(MockUserRepository::new()),
            catalog: Arc::new(catalog),
            billing: Arc::new(MockBillingRepository::new()),
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogRepository> {
        self.catalog.clone()
    }

    fn billing(&self) -> Arc<dyn BillingRepository> {
        self.billing.clone()
    }

    async fn transaction_serializable<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn manager(catalog: MockCatalogRepository) -> CatalogManager<TestUnitOfWork> {
    CatalogManager::new(Arc::new(TestUnitOfWork::with_catalog(catalog)))
}

fn test_category(name: &str, slug: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slug.to_string(),
        description: None,
        created_at: Utc::now(),
    }
}

fn test_course(id: Uuid) -> Course {
    Course {
        id,
        title: "Rust for Backend Engineers".to_string(),
        description: "Ownership, lifetimes, async".to_string(),
        price: dec!(499),
        image_url: "https://img.example.com/rust.png".to_string(),
        category_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_lesson(id: Uuid, course_id: Uuid, parent_id: Option<Uuid>) -> Lesson {
    Lesson {
        id,
        title: "Ownership".to_string(),
        course_id,
        video_url: None,
        description: None,
        thumbnail_url: None,
        parent_id,
        created_at: Utc::now(),
    }
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn create_category_derives_slug_from_name() {
    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_category_by_slug()
        .withf(|slug| slug == "web-development")
        .returning(|_| Ok(None));
    catalog
        .expect_create_category()
        .withf(|name, slug, _| name == "Web Development" && slug == "web-development")
        .returning(|name, slug, description| {
            let mut category = test_category(&name, &slug);
            category.description = description;
            Ok(category)
        });

    let category = manager(catalog)
        .create_category("Web Development".to_string(), None)
        .await
        .unwrap();

    assert_eq!(category.slug, "web-development");
}

#[tokio::test]
async fn create_category_rejects_duplicate_slug() {
    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_category_by_slug()
        .returning(|slug| Ok(Some(test_category("Web Development", slug))));

    let result = manager(catalog)
        .create_category("Web   Development!".to_string(), None)
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
}

#[tokio::test]
async fn create_category_rejects_name_with_empty_slug() {
    let result = manager(MockCatalogRepository::new())
        .create_category("!!!".to_string(), None)
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn update_category_allows_keeping_its_own_slug() {
    let id = Uuid::new_v4();

    let mut catalog = MockCatalogRepository::new();
    catalog.expect_find_category_by_slug().returning(move |slug| {
        let mut category = test_category("Web Development", slug);
        category.id = id;
        Ok(Some(category))
    });
    catalog
        .expect_update_category()
        .returning(|id, name, slug, description| {
            let mut category = test_category(&name, &slug);
            category.id = id;
            category.description = description;
            Ok(category)
        });

    let result = manager(catalog)
        .update_category(id, "Web Development".to_string(), None)
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn update_category_rejects_slug_owned_by_another_category() {
    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_category_by_slug()
        .returning(|slug| Ok(Some(test_category("Other", slug))));

    let result = manager(catalog)
        .update_category(Uuid::new_v4(), "Other".to_string(), None)
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
}

// =============================================================================
// Courses
// =============================================================================

#[tokio::test]
async fn create_course_rejects_non_positive_price() {
    let result = manager(MockCatalogRepository::new())
        .create_course(CreateCourse {
            title: "Free Course".to_string(),
            description: "".to_string(),
            price: dec!(0),
            image_url: "".to_string(),
            category_id: None,
        })
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn course_detail_for_missing_course_is_not_found() {
    let mut catalog = MockCatalogRepository::new();
    catalog.expect_find_course().returning(|_| Ok(None));

    let result = manager(catalog).course_detail(Uuid::new_v4()).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn course_detail_nests_sublessons_under_parents() {
    let course_id = Uuid::new_v4();
    let parent_id = Uuid::new_v4();

    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_course()
        .returning(move |id| Ok(Some(test_course(id))));
    catalog.expect_lessons_for_course().returning(move |id| {
        let parent = test_lesson(parent_id, id, None);
        let mut child = test_lesson(Uuid::new_v4(), id, Some(parent_id));
        child.title = "Borrowing".to_string();
        Ok(vec![parent, child])
    });

    let detail = manager(catalog).course_detail(course_id).await.unwrap();

    assert_eq!(detail.lessons.len(), 1);
    assert_eq!(detail.lessons[0].children.len(), 1);
    assert_eq!(detail.lessons[0].children[0].lesson.title, "Borrowing");
}

// =============================================================================
// Lessons
// =============================================================================

#[tokio::test]
async fn lesson_detail_through_wrong_course_is_not_found() {
    let lesson_course = Uuid::new_v4();

    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_lesson()
        .returning(move |id| Ok(Some(test_lesson(id, lesson_course, None))));

    let result = manager(catalog)
        .lesson_detail(Uuid::new_v4(), Uuid::new_v4())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn create_lesson_rejects_duplicate_title_in_course() {
    let course_id = Uuid::new_v4();

    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_course()
        .returning(move |id| Ok(Some(test_course(id))));
    catalog
        .expect_lesson_title_exists()
        .returning(|_, _| Ok(true));

    let result = manager(catalog)
        .create_lesson(CreateLesson {
            title: "Ownership".to_string(),
            course_id,
            video_url: None,
            description: None,
            thumbnail_url: None,
            parent_id: None,
        })
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
}

#[tokio::test]
async fn create_lesson_rejects_parent_from_another_course() {
    let course_id = Uuid::new_v4();
    let other_course = Uuid::new_v4();

    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_course()
        .returning(move |id| Ok(Some(test_course(id))));
    catalog
        .expect_lesson_title_exists()
        .returning(|_, _| Ok(false));
    catalog
        .expect_find_lesson()
        .returning(move |id| Ok(Some(test_lesson(id, other_course, None))));

    let result = manager(catalog)
        .create_lesson(CreateLesson {
            title: "Ownership".to_string(),
            course_id,
            video_url: None,
            description: None,
            thumbnail_url: None,
            parent_id: Some(Uuid::new_v4()),
        })
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn create_lesson_rejects_nesting_under_a_sublesson() {
    let course_id = Uuid::new_v4();
    let grandparent = Uuid::new_v4();

    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_course()
        .returning(move |id| Ok(Some(test_course(id))));
    catalog
        .expect_lesson_title_exists()
        .returning(|_, _| Ok(false));
    catalog
        .expect_find_lesson()
        .returning(move |id| Ok(Some(test_lesson(id, course_id, Some(grandparent)))));

    let result = manager(catalog)
        .create_lesson(CreateLesson {
            title: "Ownership".to_string(),
            course_id,
            video_url: None,
            description: None,
            thumbnail_url: None,
            parent_id: Some(Uuid::new_v4()),
        })
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn update_lesson_rejects_being_its_own_parent() {
    let lesson_id = Uuid::new_v4();
    let course_id = Uuid::new_v4();

    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_lesson()
        .returning(move |id| Ok(Some(test_lesson(id, course_id, None))));

    let result = manager(catalog)
        .update_lesson(
            lesson_id,
            UpdateLesson {
                parent_id: Some(lesson_id),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn update_lesson_keeps_its_own_title_without_conflict() {
    let course_id = Uuid::new_v4();

    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_lesson()
        .returning(move |id| Ok(Some(test_lesson(id, course_id, None))));
    // lesson_title_exists must not be consulted for an unchanged title
    catalog
        .expect_update_lesson()
        .returning(move |id, _| Ok(test_lesson(id, course_id, None)));

    let result = manager(catalog)
        .update_lesson(
            Uuid::new_v4(),
            UpdateLesson {
                title: Some("Ownership".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(result.is_ok());
}
