//! SeaORM entity for the `lessons` table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::domain::Lesson;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub course_id: Uuid,
    pub video_url: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    /// Self-referential parent for sublessons (one level of nesting)
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id",
        on_delete = "Cascade"
    )]
    Course,
    #[sea_orm(has_many = "super::content::Entity")]
    Content,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Lesson {
    fn from(model: Model) -> Self {
        Lesson {
            id: model.id,
            title: model.title,
            course_id: model.course_id,
            video_url: model.video_url,
            description: model.description,
            thumbnail_url: model.thumbnail_url,
            parent_id: model.parent_id,
            created_at: model.created_at,
        }
    }
}
