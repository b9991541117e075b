//! Billing service unit tests.
//!
//! Uses mock repositories plus a fake payment provider to exercise the
//! checkout and webhook paths without a database or real provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use coursehub::domain::{Course, Lesson, Order, OrderStatus, Purchase, PurchaseStatus};
use coursehub::errors::{AppError, AppResult};
use coursehub::infra::repositories::{
    MockBillingRepository, MockCatalogRepository, MockUserRepository,
};
use coursehub::infra::{
    BillingRepository, CatalogRepository, ReconciliationStore, TransactionContext, UnitOfWork,
    UserRepository,
};
use coursehub::payments::{
    CheckoutRequest, CheckoutSession, PaymentProvider, WebhookEvent,
};
use coursehub::services::{
    reconcile_captured_payment, BillingManager, BillingService, WebhookOutcome,
};

// =============================================================================
// Test doubles
// =============================================================================

/// Fake provider that counts checkout calls and verifies nothing remotely.
struct FakeProvider {
    checkout_calls: AtomicUsize,
    reject_signature: bool,
}

impl FakeProvider {
    fn new() -> Self {
        Self {
            checkout_calls: AtomicUsize::new(0),
            reject_signature: false,
        }
    }

    fn rejecting_signatures() -> Self {
        Self {
            checkout_calls: AtomicUsize::new(0),
            reject_signature: true,
        }
    }
}

#[async_trait]
impl PaymentProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fakepay"
    }

    async fn create_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession> {
        self.checkout_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CheckoutSession {
            provider_order_id: "order_fake_1".to_string(),
            amount_minor: request.amount_minor,
            currency: request.currency.clone(),
            redirect_url: None,
            public_key_id: Some("fake_key".to_string()),
            notes: None,
        })
    }

    fn verify_and_parse(&self, body: &[u8], _signature: &str) -> AppResult<WebhookEvent> {
        if self.reject_signature {
            return Err(AppError::SignatureMismatch);
        }
        let payload: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        match payload["event"].as_str() {
            Some("captured") => Ok(WebhookEvent::PaymentCaptured {
                provider_order_id: payload["order_id"].as_str().unwrap_or_default().to_string(),
                amount_minor: payload["amount"].as_i64().unwrap_or_default(),
            }),
            other => Ok(WebhookEvent::Ignored {
                event_type: other.unwrap_or("unknown").to_string(),
            }),
        }
    }
}

/// Test mock for UnitOfWork wrapping the three mock repositories.
///
/// Transactions are not available through mocks, so reaching one here
/// fails the flow; tests that must not open a transaction rely on that.
struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    catalog: Arc<MockCatalogRepository>,
    billing: Arc<MockBillingRepository>,
}

impl TestUnitOfWork {
    fn new(
        users: MockUserRepository,
        catalog: MockCatalogRepository,
        billing: MockBillingRepository,
    ) -> Self {
        Self {
            users: Arc::new(users),
            catalog: Arc::new(catalog),
            billing: Arc::new(billing),
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

/// In-memory order/purchase store for exercising reconciliation directly.
struct MemoryBillingStore {
    orders: Mutex<Vec<Order>>,
    purchases: Mutex<Vec<Purchase>>,
}

impl MemoryBillingStore {
    fn with_order(order: Order) -> Self {
        Self {
            orders: Mutex::new(vec![order]),
            purchases: Mutex::new(Vec::new()),
        }
    }

    fn order_status(&self, id: Uuid) -> OrderStatus {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.status)
            .unwrap()
    }

    fn purchases(&self) -> Vec<Purchase> {
        self.purchases.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReconciliationStore for MemoryBillingStore {
    async fn find_order_by_provider_id(
        &self,
        provider_order_id: &str,
    ) -> AppResult<Option<Order>> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.provider_order_id == provider_order_id)
            .cloned())
    }

    async fn purchase_exists_for_order(&self, order_id: Uuid) -> AppResult<bool> {
        Ok(self
            .purchases
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.order_id == Some(order_id)))
    }

    async fn create_purchase(
        &self,
        user_id: Uuid,
        course_id: Option<Uuid>,
        amount_minor: i64,
        order_id: Uuid,
    ) -> AppResult<Purchase> {
        let purchase = Purchase {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            amount_minor,
            status: PurchaseStatus::Completed,
            order_id: Some(order_id),
            created_at: Utc::now(),
        };
        self.purchases.lock().unwrap().push(purchase.clone());
        Ok(purchase)
    }

    async fn mark_order_paid(&self, order_id: Uuid) -> AppResult<Order> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(AppError::NotFound)?;
        order.status = OrderStatus::Paid;
        Ok(order.clone())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn test_course(id: Uuid, price: Decimal) -> Course {
    Course {
        id,
        title: "Rust for Backend Engineers".to_string(),
        description: "Ownership, lifetimes, async".to_string(),
        price,
        image_url: "https://img.example.com/rust.png".to_string(),
        category_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_purchase(course_id: Option<Uuid>, user_id: Uuid) -> Purchase {
    Purchase {
        id: Uuid::new_v4(),
        user_id,
        course_id,
        amount_minor: 49_900,
        status: PurchaseStatus::Completed,
        order_id: Some(Uuid::new_v4()),
        created_at: Utc::now(),
    }
}

fn test_order(provider_order_id: &str, amount_minor: i64) -> Order {
    Order {
        id: Uuid::new_v4(),
        provider: "fakepay".to_string(),
        provider_order_id: provider_order_id.to_string(),
        user_id: Uuid::new_v4(),
        course_id: Some(Uuid::new_v4()),
        amount_minor,
        currency: "INR".to_string(),
        status: OrderStatus::Created,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn test_lesson(course_id: Uuid, title: &str) -> Lesson {
    Lesson {
        id: Uuid::new_v4(),
        title: title.to_string(),
        course_id,
        video_url: None,
        description: Some("intro".to_string()),
        thumbnail_url: None,
        parent_id: None,
        created_at: Utc::now(),
    }
}

fn manager_with(
    catalog: MockCatalogRepository,
    billing: MockBillingRepository,
    provider: Arc<FakeProvider>,
) -> BillingManager<TestUnitOfWork> {
    let uow = Arc::new(TestUnitOfWork::new(
        MockUserRepository::new(),
        catalog,
        billing,
    ));
    BillingManager::new(uow, vec![provider as Arc<dyn PaymentProvider>], "INR".to_string())
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn checkout_converts_price_to_minor_units() {
    let course_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_course()
        .returning(move |id| Ok(Some(test_course(id, dec!(499)))));

    let mut billing = MockBillingRepository::new();
    billing
        .expect_has_completed_purchase()
        .returning(|_, _| Ok(false));
    billing
        .expect_create_order()
        .withf(|data| {
            data.provider == "fakepay"
                && data.provider_order_id == "order_fake_1"
                && data.amount_minor == 49_900
                && data.currency == "INR"
        })
        .returning(|data| {
            Ok(Order {
                id: Uuid::new_v4(),
                provider: data.provider,
                provider_order_id: data.provider_order_id,
                user_id: data.user_id,
                course_id: Some(data.course_id),
                amount_minor: data.amount_minor,
                currency: data.currency,
                status: OrderStatus::Created,
                notes: data.notes,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
        });

    let provider = Arc::new(FakeProvider::new());
    let manager = manager_with(catalog, billing, provider.clone());

    let session = manager
        .checkout("fakepay", user_id, course_id)
        .await
        .unwrap();

    assert_eq!(session.amount_minor, 49_900);
    assert_eq!(session.currency, "INR");
    assert_eq!(provider.checkout_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn checkout_rejects_repeat_purchase_before_provider_call() {
    let course_id = Uuid::new_v4();

    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_course()
        .returning(move |id| Ok(Some(test_course(id, dec!(499)))));

    let mut billing = MockBillingRepository::new();
    billing
        .expect_has_completed_purchase()
        .returning(|_, _| Ok(true));

    let provider = Arc::new(FakeProvider::new());
    let manager = manager_with(catalog, billing, provider.clone());

    let result = manager.checkout("fakepay", Uuid::new_v4(), course_id).await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
    assert_eq!(provider.checkout_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn checkout_with_unknown_provider_is_rejected() {
    let manager = manager_with(
        MockCatalogRepository::new(),
        MockBillingRepository::new(),
        Arc::new(FakeProvider::new()),
    );

    let result = manager
        .checkout("paypal", Uuid::new_v4(), Uuid::new_v4())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::BadRequest(_)));
}

#[tokio::test]
async fn checkout_for_missing_course_is_not_found() {
    let mut catalog = MockCatalogRepository::new();
    catalog.expect_find_course().returning(|_| Ok(None));

    let manager = manager_with(
        catalog,
        MockBillingRepository::new(),
        Arc::new(FakeProvider::new()),
    );

    let result = manager
        .checkout("fakepay", Uuid::new_v4(), Uuid::new_v4())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

// =============================================================================
// Webhooks
// =============================================================================

#[tokio::test]
async fn webhook_with_bad_signature_is_rejected() {
    let manager = manager_with(
        MockCatalogRepository::new(),
        MockBillingRepository::new(),
        Arc::new(FakeProvider::rejecting_signatures()),
    );

    let result = manager
        .handle_webhook("fakepay", br#"{"event":"captured"}"#, "bogus")
        .await;

    assert!(matches!(result.unwrap_err(), AppError::SignatureMismatch));
}

#[tokio::test]
async fn webhook_for_irrelevant_event_is_acknowledged_without_writes() {
    // The mock unit of work fails any transaction, so this passing proves
    // ignored events never open one.
    let manager = manager_with(
        MockCatalogRepository::new(),
        MockBillingRepository::new(),
        Arc::new(FakeProvider::new()),
    );

    let outcome = manager
        .handle_webhook("fakepay", br#"{"event":"payment.failed"}"#, "sig")
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Ignored);
}

// =============================================================================
// Reconciliation
// =============================================================================

#[tokio::test]
async fn captured_payment_records_one_purchase_and_marks_order_paid() {
    let order = test_order("order_fake_1", 49_900);
    let (order_id, user_id, course_id) = (order.id, order.user_id, order.course_id);
    let store = MemoryBillingStore::with_order(order);

    let outcome = reconcile_captured_payment(&store, "order_fake_1", 49_900)
        .await
        .unwrap();

    assert_eq!(outcome, WebhookOutcome::Reconciled);
    let purchases = store.purchases();
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].user_id, user_id);
    assert_eq!(purchases[0].course_id, course_id);
    assert_eq!(purchases[0].amount_minor, 49_900);
    assert_eq!(purchases[0].order_id, Some(order_id));
    assert_eq!(store.order_status(order_id), OrderStatus::Paid);
}

#[tokio::test]
async fn redelivered_capture_is_acknowledged_without_second_purchase() {
    let order = test_order("order_fake_1", 49_900);
    let order_id = order.id;
    let store = MemoryBillingStore::with_order(order);

    let first = reconcile_captured_payment(&store, "order_fake_1", 49_900)
        .await
        .unwrap();
    let second = reconcile_captured_payment(&store, "order_fake_1", 49_900)
        .await
        .unwrap();

    assert_eq!(first, WebhookOutcome::Reconciled);
    assert_eq!(second, WebhookOutcome::AlreadyProcessed);
    assert_eq!(store.purchases().len(), 1);
    assert_eq!(store.order_status(order_id), OrderStatus::Paid);
}

#[tokio::test]
async fn capture_with_mismatched_amount_writes_nothing() {
    let order = test_order("order_fake_1", 49_900);
    let order_id = order.id;
    let store = MemoryBillingStore::with_order(order);

    let result = reconcile_captured_payment(&store, "order_fake_1", 10_000).await;

    assert!(matches!(result.unwrap_err(), AppError::BadRequest(_)));
    assert!(store.purchases().is_empty());
    assert_eq!(store.order_status(order_id), OrderStatus::Created);
}

#[tokio::test]
async fn capture_for_unknown_order_writes_nothing() {
    let store = MemoryBillingStore::with_order(test_order("order_fake_1", 49_900));

    let result = reconcile_captured_payment(&store, "order_other", 49_900).await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
    assert!(store.purchases().is_empty());
}

// =============================================================================
// Entitlements
// =============================================================================

#[tokio::test]
async fn entitlements_return_purchased_courses_with_lessons() {
    let user_id = Uuid::new_v4();
    let course_id = Uuid::new_v4();

    let mut billing = MockBillingRepository::new();
    let purchase = test_purchase(Some(course_id), user_id);
    let purchased_at = purchase.created_at;
    billing
        .expect_purchases_for_user()
        .returning(move |_| Ok(vec![purchase.clone()]));

    let mut catalog = MockCatalogRepository::new();
    catalog
        .expect_find_course()
        .returning(move |id| Ok(Some(test_course(id, dec!(499)))));
    catalog.expect_lessons_for_course().returning(move |id| {
        Ok(vec![test_lesson(id, "Intro"), test_lesson(id, "Ownership")])
    });

    let manager = manager_with(catalog, billing, Arc::new(FakeProvider::new()));

    let courses = manager.entitlements(user_id).await.unwrap();

    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0].id, course_id);
    assert_eq!(courses[0].purchased_at, purchased_at);
    assert_eq!(courses[0].lessons.len(), 2);
    assert_eq!(courses[0].lessons[0].title, "Intro");
}

#[tokio::test]
async fn entitlements_skip_courses_deleted_after_purchase() {
    let user_id = Uuid::new_v4();

    let mut billing = MockBillingRepository::new();
    billing.expect_purchases_for_user().returning(move |_| {
        Ok(vec![
            test_purchase(Some(Uuid::new_v4()), user_id),
            // Course deletion severed the link; the purchase row remains
            test_purchase(None, user_id),
            test_purchase(Some(Uuid::new_v4()), user_id),
        ])
    });

    let mut catalog = MockCatalogRepository::new();
    let mut first = true;
    catalog.expect_find_course().returning(move |id| {
        if first {
            first = false;
            Ok(Some(test_course(id, dec!(499))))
        } else {
            Ok(None)
        }
    });
    catalog
        .expect_lessons_for_course()
        .returning(|_| Ok(vec![]));

    let manager = manager_with(catalog, billing, Arc::new(FakeProvider::new()));

    let courses = manager.entitlements(user_id).await.unwrap();

    assert_eq!(courses.len(), 1);
}

#[tokio::test]
async fn entitlements_are_empty_without_purchases() {
    let mut billing = MockBillingRepository::new();
    billing
        .expect_purchases_for_user()
        .returning(|_| Ok(vec![]));

    let manager = manager_with(
        MockCatalogRepository::new(),
        billing,
        Arc::new(FakeProvider::new()),
    );

    let courses = manager.entitlements(Uuid::new_v4()).await.unwrap();
    assert!(courses.is_empty());
}

// =============================================================================
// Dashboard stats
// =============================================================================

#[tokio::test]
async fn dashboard_stats_aggregate_counts_and_revenue() {
    let mut users = MockUserRepository::new();
    users.expect_count().returning(|| Ok(3));

    let mut catalog = MockCatalogRepository::new();
    catalog.expect_count_courses().returning(|| Ok(2));
    catalog.expect_count_lessons().returning(|| Ok(5));

    let mut billing = MockBillingRepository::new();
    billing.expect_revenue_minor().returning(|| Ok(99_800));

    let uow = Arc::new(TestUnitOfWork::new(users, catalog, billing));
    let manager = BillingManager::new(
        uow,
        vec![Arc::new(FakeProvider::new()) as Arc<dyn PaymentProvider>],
        "INR".to_string(),
    );

    let stats = manager.dashboard_stats().await.unwrap();

    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.total_courses, 2);
    assert_eq!(stats.total_lessons, 5);
    assert_eq!(stats.total_revenue_minor, 99_800);
    assert_eq!(stats.total_revenue, dec!(998.00));
}
