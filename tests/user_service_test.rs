//! User service unit tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockall::predicate::eq;
use uuid::Uuid;

use coursehub::domain::{User, UserRole};
use coursehub::errors::{AppError, AppResult};
use coursehub::infra::repositories::{
    MockBillingRepository, MockCatalogRepository, MockUserRepository,
};
use coursehub::infra::{
    BillingRepository, CatalogRepository, TransactionContext, UnitOfWork, UserRepository,
};
use coursehub::services::{UserManager, UserService};

fn create_test_user(id: Uuid) -> User {
    User {
        id,
        email: "test@example.com".to_string(),
        username: "testuser".to_string(),
        password_hash: "hashed".to_string(),
        role: UserRole::User,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Test mock for UnitOfWork that wraps a MockUserRepository
struct TestUnitOfWork {
    user_repo: Arc<MockUserRepository>,
    catalog_repo: Arc<MockCatalogRepository>,
    billing_repo: Arc<MockBillingRepository>,
}

impl TestUnitOfWork {
    fn new(user_repo: MockUserRepository) -> Self {
        Self {
            user_repo: Arc::new(user_repo),
            catalog_repo: Arc::new(MockCatalogRepository::new()),
            billing_repo: Arc::new(MockBillingRepository::new()),
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogRepository> {
        self.catalog_repo.clone()
    }

    fn billing(&self) -> Arc<dyn BillingRepository> {
        self.billing_repo.clone()
    }

    async fn transaction_serializable<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        // Transaction not supported in test mock
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

#[tokio::test]
async fn test_get_user_success() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .with(eq(user_id))
        .returning(move |id| Ok(Some(create_test_user(id))));

    let service = UserManager::new(Arc::new(TestUnitOfWork::new(repo)));
    let result = service.get_user(user_id).await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().id, user_id);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let service = UserManager::new(Arc::new(TestUnitOfWork::new(repo)));
    let result = service.get_user(Uuid::new_v4()).await;

    assert!(result.is_err());
    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_list_users_success() {
    let mut repo = MockUserRepository::new();
    repo.expect_list().returning(|| {
        Ok(vec![
            create_test_user(Uuid::new_v4()),
            create_test_user(Uuid::new_v4()),
        ])
    });

    let service = UserManager::new(Arc::new(TestUnitOfWork::new(repo)));
    let result = service.list_users().await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().len(), 2);
}

#[tokio::test]
async fn test_set_role_promotes_user() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepository::new();
    repo.expect_set_role()
        .with(eq(user_id), eq(UserRole::Admin))
        .returning(|id, role| {
            let mut user = create_test_user(id);
            user.role = role;
            Ok(user)
        });

    let service = UserManager::new(Arc::new(TestUnitOfWork::new(repo)));
    let result = service.set_role(user_id, UserRole::Admin).await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().role, UserRole::Admin);
}

#[tokio::test]
async fn test_delete_user_success() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepository::new();
    repo.expect_delete().with(eq(user_id)).returning(|_| Ok(()));

    let service = UserManager::new(Arc::new(TestUnitOfWork::new(repo)));
    let result = service.delete_user(user_id).await;

    assert!(result.is_ok());
}
