//! Catalog repository - persistence for categories, courses, lessons and
//! their content blocks.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{
    category::{self, Entity as CategoryEntity},
    content::{self, Entity as ContentEntity},
    course::{self, Entity as CourseEntity},
    lesson::{self, Entity as LessonEntity},
};
use crate::domain::{
    Category, Content, Course, CreateContent, CreateCourse, CreateLesson, Lesson, UpdateContent,
    UpdateCourse, UpdateLesson,
};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Catalog repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // Categories
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn find_category_by_slug(&self, slug: &str) -> AppResult<Option<Category>>;
    async fn create_category(
        &self,
        name: String,
        slug: String,
        description: Option<String>,
    ) -> AppResult<Category>;
    async fn update_category(
        &self,
        id: Uuid,
        name: String,
        slug: String,
        description: Option<String>,
    ) -> AppResult<Category>;
    async fn delete_category(&self, id: Uuid) -> AppResult<()>;

    // Courses
    async fn list_courses(&self) -> AppResult<Vec<Course>>;
    async fn find_course(&self, id: Uuid) -> AppResult<Option<Course>>;
    async fn create_course(&self, data: CreateCourse) -> AppResult<Course>;
    async fn update_course(&self, id: Uuid, data: UpdateCourse) -> AppResult<Course>;
    /// Delete a course; lessons and their content cascade at the database
    async fn delete_course(&self, id: Uuid) -> AppResult<()>;
    async fn count_courses(&self) -> AppResult<u64>;

    // Lessons
    async fn lessons_for_course(&self, course_id: Uuid) -> AppResult<Vec<Lesson>>;
    async fn find_lesson(&self, id: Uuid) -> AppResult<Option<Lesson>>;
    async fn lesson_title_exists(&self, course_id: Uuid, title: &str) -> AppResult<bool>;
    async fn create_lesson(&self, data: CreateLesson) -> AppResult<Lesson>;
    async fn update_lesson(&self, id: Uuid, data: UpdateLesson) -> AppResult<Lesson>;
    async fn delete_lesson(&self, id: Uuid) -> AppResult<()>;
    async fn count_lessons(&self) -> AppResult<u64>;

    // Content
    async fn contents_for_lesson(&self, lesson_id: Uuid) -> AppResult<Vec<Content>>;
    async fn create_content(&self, data: CreateContent) -> AppResult<Content>;
    async fn update_content(&self, id: Uuid, data: UpdateContent) -> AppResult<Content>;
    async fn delete_content(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed catalog repository.
pub struct CatalogStore {
    db: DatabaseConnection,
}

impl CatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for CatalogStore {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let models = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn find_category_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        Ok(result.map(Category::from))
    }

    async fn create_category(
        &self,
        name: String,
        slug: String,
        description: Option<String>,
    ) -> AppResult<Category> {
        let active_model = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            slug: Set(slug),
            description: Set(description),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Category::from(model))
    }

    async fn update_category(
        &self,
        id: Uuid,
        name: String,
        slug: String,
        description: Option<String>,
    ) -> AppResult<Category> {
        let model = CategoryEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: category::ActiveModel = model.into();
        active.name = Set(name);
        active.slug = Set(slug);
        active.description = Set(description);

        let model = active.update(&self.db).await?;
        Ok(Category::from(model))
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let result = CategoryEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn list_courses(&self) -> AppResult<Vec<Course>> {
        let models = CourseEntity::find()
            .order_by_desc(course::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn find_course(&self, id: Uuid) -> AppResult<Option<Course>> {
        let result = CourseEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Course::from))
    }

    async fn create_course(&self, data: CreateCourse) -> AppResult<Course> {
        let now = Utc::now();
        let active_model = course::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(data.title),
            description: Set(data.description),
            price: Set(data.price),
            image_url: Set(data.image_url),
            category_id: Set(data.category_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Course::from(model))
    }

    async fn update_course(&self, id: Uuid, data: UpdateCourse) -> AppResult<Course> {
        let model = CourseEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: course::ActiveModel = model.into();
        if let Some(title) = data.title {
            active.title = Set(title);
        }
        if let Some(description) = data.description {
            active.description = Set(description);
        }
        if let Some(price) = data.price {
            active.price = Set(price);
        }
        if let Some(image_url) = data.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(category_id) = data.category_id {
            active.category_id = Set(Some(category_id));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Course::from(model))
    }

    async fn delete_course(&self, id: Uuid) -> AppResult<()> {
        let result = CourseEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn count_courses(&self) -> AppResult<u64> {
        CourseEntity::find()
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn lessons_for_course(&self, course_id: Uuid) -> AppResult<Vec<Lesson>> {
        let models = LessonEntity::find()
            .filter(lesson::Column::CourseId.eq(course_id))
            .order_by_asc(lesson::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Lesson::from).collect())
    }

    async fn find_lesson(&self, id: Uuid) -> AppResult<Option<Lesson>> {
        let result = LessonEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Lesson::from))
    }

    async fn lesson_title_exists(&self, course_id: Uuid, title: &str) -> AppResult<bool> {
        let count = LessonEntity::find()
            .filter(lesson::Column::CourseId.eq(course_id))
            .filter(lesson::Column::Title.eq(title))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn create_lesson(&self, data: CreateLesson) -> AppResult<Lesson> {
        let active_model = lesson::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(data.title),
            course_id: Set(data.course_id),
            video_url: Set(data.video_url),
            description: Set(data.description),
            thumbnail_url: Set(data.thumbnail_url),
            parent_id: Set(data.parent_id),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Lesson::from(model))
    }

    async fn update_lesson(&self, id: Uuid, data: UpdateLesson) -> AppResult<Lesson> {
        let model = LessonEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: lesson::ActiveModel = model.into();
        if let Some(title) = data.title {
            active.title = Set(title);
        }
        if let Some(video_url) = data.video_url {
            active.video_url = Set(Some(video_url));
        }
        if let Some(description) = data.description {
            active.description = Set(Some(description));
        }
        if let Some(thumbnail_url) = data.thumbnail_url {
            active.thumbnail_url = Set(Some(thumbnail_url));
        }
        if let Some(parent_id) = data.parent_id {
            active.parent_id = Set(Some(parent_id));
        }

        let model = active.update(&self.db).await?;
        Ok(Lesson::from(model))
    }

    async fn delete_lesson(&self, id: Uuid) -> AppResult<()> {
        let result = LessonEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn count_lessons(&self) -> AppResult<u64> {
        LessonEntity::find()
            .count(&self.db)
            .await
            .map_err(AppError::from)
    }

    async fn contents_for_lesson(&self, lesson_id: Uuid) -> AppResult<Vec<Content>> {
        let models = ContentEntity::find()
            .filter(content::Column::LessonId.eq(lesson_id))
            .order_by_asc(content::Column::Position)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Content::from).collect())
    }

    async fn create_content(&self, data: CreateContent) -> AppResult<Content> {
        let active_model = content::ActiveModel {
            id: Set(Uuid::new_v4()),
            lesson_id: Set(data.lesson_id),
            kind: Set(data.kind.as_str().to_string()),
            body: Set(data.body),
            position: Set(data.position),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Content::from(model))
    }

    async fn update_content(&self, id: Uuid, data: UpdateContent) -> AppResult<Content> {
        let model = ContentEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: content::ActiveModel = model.into();
        if let Some(kind) = data.kind {
            active.kind = Set(kind.as_str().to_string());
        }
        if let Some(body) = data.body {
            active.body = Set(body);
        }
        if let Some(position) = data.position {
            active.position = Set(position);
        }

        let model = active.update(&self.db).await?;
        Ok(Content::from(model))
    }

    async fn delete_content(&self, id: Uuid) -> AppResult<()> {
        let result = ContentEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
