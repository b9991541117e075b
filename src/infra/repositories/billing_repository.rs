//! Billing repository - persistence for orders and purchases.
//!
//! Reads and the initial order insert go through this repository; the
//! webhook reconciliation writes go through the transactional repository in
//! the Unit of Work instead.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{
    order::{self, Entity as OrderEntity},
    purchase::{self, Entity as PurchaseEntity},
};
use crate::domain::{NewOrder, Order, OrderStatus, Purchase, PurchaseStatus};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Billing repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BillingRepository: Send + Sync {
    /// Look up an order by the provider-assigned id
    async fn find_order_by_provider_id(&self, provider_order_id: &str)
        -> AppResult<Option<Order>>;

    /// Persist a freshly created provider session
    async fn create_order(&self, data: NewOrder) -> AppResult<Order>;

    /// Whether the user already holds a completed purchase for the course
    async fn has_completed_purchase(&self, user_id: Uuid, course_id: Uuid) -> AppResult<bool>;

    /// All completed purchases for a user, newest first
    async fn purchases_for_user(&self, user_id: Uuid) -> AppResult<Vec<Purchase>>;

    /// Sum of all completed purchase amounts, in minor units
    async fn revenue_minor(&self) -> AppResult<i64>;
}

/// SeaORM-backed billing repository.
pub struct BillingStore {
    db: DatabaseConnection,
}

impl BillingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BillingRepository for BillingStore {
    async fn find_order_by_provider_id(
        &self,
        provider_order_id: &str,
    ) -> AppResult<Option<Order>> {
        let result = OrderEntity::find()
            .filter(order::Column::ProviderOrderId.eq(provider_order_id))
            .one(&self.db)
            .await?;
        Ok(result.map(Order::from))
    }

    async fn create_order(&self, data: NewOrder) -> AppResult<Order> {
        let now = Utc::now();
        let active_model = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            provider: Set(data.provider),
            provider_order_id: Set(data.provider_order_id),
            user_id: Set(data.user_id),
            course_id: Set(Some(data.course_id)),
            amount_minor: Set(data.amount_minor),
            currency: Set(data.currency),
            status: Set(OrderStatus::Created.as_str().to_string()),
            notes: Set(data.notes),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Order::from(model))
    }

    async fn has_completed_purchase(&self, user_id: Uuid, course_id: Uuid) -> AppResult<bool> {
        use sea_orm::PaginatorTrait;

        let count = PurchaseEntity::find()
            .filter(purchase::Column::UserId.eq(user_id))
            .filter(purchase::Column::CourseId.eq(course_id))
            .filter(purchase::Column::Status.eq(PurchaseStatus::Completed.as_str()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn purchases_for_user(&self, user_id: Uuid) -> AppResult<Vec<Purchase>> {
        let models = PurchaseEntity::find()
            .filter(purchase::Column::UserId.eq(user_id))
            .filter(purchase::Column::Status.eq(PurchaseStatus::Completed.as_str()))
            .order_by_desc(purchase::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Purchase::from).collect())
    }

    async fn revenue_minor(&self) -> AppResult<i64> {
        // Summed in application code; purchase volume is small and this
        // avoids a backend-specific aggregate expression.
        let models = PurchaseEntity::find()
            .filter(purchase::Column::Status.eq(PurchaseStatus::Completed.as_str()))
            .all(&self.db)
            .await?;
        Ok(models.iter().map(|p| p.amount_minor).sum())
    }
}
