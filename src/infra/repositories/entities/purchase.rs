//! SeaORM entity for the `purchases` table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::domain::{Purchase, PurchaseStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Cleared when the course is deleted; the purchase stays as history
    pub course_id: Option<Uuid>,
    pub amount_minor: i64,
    pub status: String,
    pub order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id",
        on_delete = "SetNull"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "SetNull"
    )]
    Order,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Purchase {
    fn from(model: Model) -> Self {
        Purchase {
            id: model.id,
            user_id: model.user_id,
            course_id: model.course_id,
            amount_minor: model.amount_minor,
            status: PurchaseStatus::parse(&model.status).unwrap_or(PurchaseStatus::Completed),
            order_id: model.order_id,
            created_at: model.created_at,
        }
    }
}
