//! SeaORM entity for the `orders` table.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::domain::{Order, OrderStatus};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider: String,
    /// Provider-assigned session/order id; uniqueness keys reconciliation
    #[sea_orm(unique)]
    pub provider_order_id: String,
    pub user_id: Uuid,
    /// Cleared when the course is deleted; the order stays as history
    pub course_id: Option<Uuid>,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
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
    #[sea_orm(has_many = "super::purchase::Entity")]
    Purchase,
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

impl Related<super::purchase::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(model: Model) -> Self {
        Order {
            id: model.id,
            provider: model.provider,
            provider_order_id: model.provider_order_id,
            user_id: model.user_id,
            course_id: model.course_id,
            amount_minor: model.amount_minor,
            currency: model.currency,
            status: OrderStatus::parse(&model.status).unwrap_or(OrderStatus::Created),
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
