//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories and manages database transactions.
//! The webhook reconciliation flow depends on this: the purchase insert and
//! the order status flip must land in the same transaction or not at all.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, QueryFilter, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::entities::{
    order::{self, Entity as OrderEntity},
    purchase::{self, Entity as PurchaseEntity},
};
use super::repositories::{
    BillingRepository, BillingStore, CatalogRepository, CatalogStore, UserRepository, UserStore,
};
use crate::domain::{Order, OrderStatus, Purchase, PurchaseStatus};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories and transaction management.
/// Note: This trait is not mockable directly due to generic methods.
/// For testing, mock at the repository or service level.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get catalog repository
    fn catalog(&self) -> Arc<dyn CatalogRepository>;

    /// Get billing repository
    fn billing(&self) -> Arc<dyn BillingRepository>;

    /// Execute a closure within a serializable transaction.
    ///
    /// The transaction is automatically committed on success or rolled back
    /// on error. Serializable isolation forces concurrent writers into an
    /// order, e.g. duplicate webhook deliveries for the same order.
    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Store operations webhook reconciliation performs.
///
/// In production these run against the reconciliation transaction through
/// [`TxBillingRepository`]; the trait exists so the decision logic can run
/// against a plain in-memory store in tests.
#[async_trait]
pub trait ReconciliationStore: Send + Sync {
    /// Resolve an order by its provider-assigned id
    async fn find_order_by_provider_id(&self, provider_order_id: &str)
        -> AppResult<Option<Order>>;

    /// Whether a completed purchase already settles this order.
    /// This is the idempotency check for redelivered webhooks.
    async fn purchase_exists_for_order(&self, order_id: Uuid) -> AppResult<bool>;

    /// Record a completed purchase linked to its order
    async fn create_purchase(
        &self,
        user_id: Uuid,
        course_id: Option<Uuid>,
        amount_minor: i64,
        order_id: Uuid,
    ) -> AppResult<Purchase>;

    /// Flip an order to `paid` (the terminal state)
    async fn mark_order_paid(&self, order_id: Uuid) -> AppResult<Order>;
}

/// Transaction context providing repository access within a transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Get the billing repository bound to this transaction
    pub fn billing(&self) -> TxBillingRepository<'_> {
        TxBillingRepository::new(self.txn)
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    catalog_repo: Arc<CatalogStore>,
    billing_repo: Arc<BillingStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let catalog_repo = Arc::new(CatalogStore::new(db.clone()));
        let billing_repo = Arc::new(BillingStore::new(db.clone()));
        Self {
            db,
            user_repo,
            catalog_repo,
            billing_repo,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogRepository> {
        self.catalog_repo.clone()
    }

    fn billing(&self) -> Arc<dyn BillingRepository> {
        self.billing_repo.clone()
    }

    async fn transaction_serializable<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::Serializable),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware billing repository.
///
/// All operations execute within the borrowed transaction; nothing is
/// visible to other connections until commit.
pub struct TxBillingRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxBillingRepository<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }
}

#[async_trait]
impl<'a> ReconciliationStore for TxBillingRepository<'a> {
    async fn find_order_by_provider_id(
        &self,
        provider_order_id: &str,
    ) -> AppResult<Option<Order>> {
        let result = OrderEntity::find()
            .filter(order::Column::ProviderOrderId.eq(provider_order_id))
            .one(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Order::from))
    }

    async fn purchase_exists_for_order(&self, order_id: Uuid) -> AppResult<bool> {
        use sea_orm::PaginatorTrait;

        let count = PurchaseEntity::find()
            .filter(purchase::Column::OrderId.eq(order_id))
            .filter(purchase::Column::Status.eq(PurchaseStatus::Completed.as_str()))
            .count(self.txn)
            .await
            .map_err(AppError::from)?;

        Ok(count > 0)
    }

    async fn create_purchase(
        &self,
        user_id: Uuid,
        course_id: Option<Uuid>,
        amount_minor: i64,
        order_id: Uuid,
    ) -> AppResult<Purchase> {
        let active_model = purchase::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            course_id: Set(course_id),
            amount_minor: Set(amount_minor),
            status: Set(PurchaseStatus::Completed.as_str().to_string()),
            order_id: Set(Some(order_id)),
            created_at: Set(Utc::now()),
        };

        let model = active_model.insert(self.txn).await.map_err(AppError::from)?;
        Ok(Purchase::from(model))
    }

    async fn mark_order_paid(&self, order_id: Uuid) -> AppResult<Order> {
        let model = OrderEntity::find_by_id(order_id)
            .one(self.txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: order::ActiveModel = model.into();
        active.status = Set(OrderStatus::Paid.as_str().to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(self.txn).await.map_err(AppError::from)?;
        Ok(Order::from(model))
    }
}
