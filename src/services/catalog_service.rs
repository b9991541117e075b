//! Catalog service: categories, courses, lessons and content blocks.
//!
//! Slugs are derived server-side at write time, and course detail responses
//! carry the fully built lesson tree so clients never assemble hierarchy.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    build_lesson_tree, slugify, Category, Content, Course, CourseDetail, CreateContent,
    CreateCourse, CreateLesson, Lesson, LessonDetail, UpdateContent, UpdateCourse, UpdateLesson,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Catalog service trait for dependency injection.
#[async_trait]
pub trait CatalogService: Send + Sync {
    // Categories
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn create_category(&self, name: String, description: Option<String>)
        -> AppResult<Category>;
    async fn update_category(
        &self,
        id: Uuid,
        name: String,
        description: Option<String>,
    ) -> AppResult<Category>;
    async fn delete_category(&self, id: Uuid) -> AppResult<()>;

    // Courses
    async fn list_courses(&self) -> AppResult<Vec<Course>>;
    async fn course_detail(&self, id: Uuid) -> AppResult<CourseDetail>;
    async fn create_course(&self, data: CreateCourse) -> AppResult<Course>;
    async fn update_course(&self, id: Uuid, data: UpdateCourse) -> AppResult<Course>;
    async fn delete_course(&self, id: Uuid) -> AppResult<()>;

    // Lessons
    async fn lesson_detail(&self, course_id: Uuid, lesson_id: Uuid) -> AppResult<LessonDetail>;
    async fn create_lesson(&self, data: CreateLesson) -> AppResult<Lesson>;
    async fn update_lesson(&self, id: Uuid, data: UpdateLesson) -> AppResult<Lesson>;
    async fn delete_lesson(&self, id: Uuid) -> AppResult<()>;

    // Content
    async fn create_content(&self, data: CreateContent) -> AppResult<Content>;
    async fn update_content(&self, id: Uuid, data: UpdateContent) -> AppResult<Content>;
    async fn delete_content(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of CatalogService using Unit of Work.
pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Derive a slug and reject names that produce an empty one.
    fn derive_slug(name: &str) -> AppResult<String> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(AppError::validation(
                "Category name must contain letters or digits",
            ));
        }
        Ok(slug)
    }

    fn check_price(price: Decimal) -> AppResult<()> {
        if price <= Decimal::ZERO {
            return Err(AppError::validation("Price must be greater than zero"));
        }
        Ok(())
    }

    /// Validate a lesson's parent: it must exist, belong to the same course,
    /// and itself be a top-level lesson (nesting is one level deep).
    async fn check_parent(&self, course_id: Uuid, parent_id: Uuid) -> AppResult<()> {
        let parent = self
            .uow
            .catalog()
            .find_lesson(parent_id)
            .await?
            .ok_or_else(|| AppError::validation("Parent lesson does not exist"))?;

        if parent.course_id != course_id {
            return Err(AppError::validation(
                "Parent lesson belongs to a different course",
            ));
        }
        if parent.parent_id.is_some() {
            return Err(AppError::validation(
                "Sublessons cannot have their own sublessons",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for CatalogManager<U> {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.uow.catalog().list_categories().await
    }

    async fn create_category(
        &self,
        name: String,
        description: Option<String>,
    ) -> AppResult<Category> {
        let slug = Self::derive_slug(&name)?;
        if self.uow.catalog().find_category_by_slug(&slug).await?.is_some() {
            return Err(AppError::conflict("Category"));
        }
        self.uow.catalog().create_category(name, slug, description).await
    }

    async fn update_category(
        &self,
        id: Uuid,
        name: String,
        description: Option<String>,
    ) -> AppResult<Category> {
        let slug = Self::derive_slug(&name)?;
        if let Some(existing) = self.uow.catalog().find_category_by_slug(&slug).await? {
            if existing.id != id {
                return Err(AppError::conflict("Category"));
            }
        }
        self.uow.catalog().update_category(id, name, slug, description).await
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        // Courses keep existing; their category_id is nulled by the schema
        self.uow.catalog().delete_category(id).await
    }

    async fn list_courses(&self) -> AppResult<Vec<Course>> {
        self.uow.catalog().list_courses().await
    }

    async fn course_detail(&self, id: Uuid) -> AppResult<CourseDetail> {
        let course = self
            .uow
            .catalog()
            .find_course(id)
            .await?
            .ok_or(AppError::NotFound)?;

        let lessons = self.uow.catalog().lessons_for_course(id).await?;

        Ok(CourseDetail {
            course,
            lessons: build_lesson_tree(lessons),
        })
    }

    async fn create_course(&self, data: CreateCourse) -> AppResult<Course> {
        Self::check_price(data.price)?;
        self.uow.catalog().create_course(data).await
    }

    async fn update_course(&self, id: Uuid, data: UpdateCourse) -> AppResult<Course> {
        if let Some(price) = data.price {
            Self::check_price(price)?;
        }
        self.uow.catalog().update_course(id, data).await
    }

    async fn delete_course(&self, id: Uuid) -> AppResult<()> {
        self.uow.catalog().delete_course(id).await
    }

    async fn lesson_detail(&self, course_id: Uuid, lesson_id: Uuid) -> AppResult<LessonDetail> {
        let lesson = self
            .uow
            .catalog()
            .find_lesson(lesson_id)
            .await?
            // A lesson fetched through the wrong course is a 404, not a leak
            .filter(|lesson| lesson.course_id == course_id)
            .ok_or(AppError::NotFound)?;

        let contents = self.uow.catalog().contents_for_lesson(lesson_id).await?;

        Ok(LessonDetail { lesson, contents })
    }

    async fn create_lesson(&self, data: CreateLesson) -> AppResult<Lesson> {
        if self.uow.catalog().find_course(data.course_id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        if self
            .uow
            .catalog()
            .lesson_title_exists(data.course_id, &data.title)
            .await?
        {
            return Err(AppError::conflict("Lesson"));
        }
        if let Some(parent_id) = data.parent_id {
            self.check_parent(data.course_id, parent_id).await?;
        }
        self.uow.catalog().create_lesson(data).await
    }

    async fn update_lesson(&self, id: Uuid, data: UpdateLesson) -> AppResult<Lesson> {
        let lesson = self
            .uow
            .catalog()
            .find_lesson(id)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(title) = &data.title {
            if *title != lesson.title
                && self
                    .uow
                    .catalog()
                    .lesson_title_exists(lesson.course_id, title)
                    .await?
            {
                return Err(AppError::conflict("Lesson"));
            }
        }
        if let Some(parent_id) = data.parent_id {
            if parent_id == id {
                return Err(AppError::validation("A lesson cannot be its own parent"));
            }
            self.check_parent(lesson.course_id, parent_id).await?;
        }

        self.uow.catalog().update_lesson(id, data).await
    }

    async fn delete_lesson(&self, id: Uuid) -> AppResult<()> {
        self.uow.catalog().delete_lesson(id).await
    }

    async fn create_content(&self, data: CreateContent) -> AppResult<Content> {
        if self.uow.catalog().find_lesson(data.lesson_id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        self.uow.catalog().create_content(data).await
    }

    async fn update_content(&self, id: Uuid, data: UpdateContent) -> AppResult<Content> {
        self.uow.catalog().update_content(id, data).await
    }

    async fn delete_content(&self, id: Uuid) -> AppResult<()> {
        self.uow.catalog().delete_content(id).await
    }
}
