//! SeaORM entity for the `contents` table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::domain::{Content, ContentKind};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "contents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    /// Sort key within the lesson
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lesson::Entity",
        from = "Column::LessonId",
        to = "super::lesson::Column::Id",
        on_delete = "Cascade"
    )]
    Lesson,
}

impl Related<super::lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lesson.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Content {
    fn from(model: Model) -> Self {
        Content {
            id: model.id,
            lesson_id: model.lesson_id,
            // Stored kinds are constrained at write time; fall back to text
            // rather than failing a whole read on a legacy row.
            kind: ContentKind::parse(&model.kind).unwrap_or(ContentKind::Text),
            body: model.body,
            position: model.position,
            created_at: model.created_at,
        }
    }
}
