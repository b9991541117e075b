//! Billing service: checkout, webhook reconciliation and entitlements.
//!
//! Both providers flow through the same path: checkout persists a local
//! `Order` keyed by the provider's session/order id, and every verified
//! webhook reconciles against that key inside one serializable transaction.
//! Redelivered webhooks find the existing purchase and become no-ops.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    from_minor_units, to_minor_units, EntitledCourse, LessonSummary, NewOrder,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{ReconciliationStore, UnitOfWork};
use crate::payments::{CheckoutRequest, CheckoutSession, PaymentProvider, WebhookEvent};

/// Admin dashboard counters.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_courses: u64,
    pub total_lessons: u64,
    /// Lifetime revenue in minor currency units
    pub total_revenue_minor: i64,
    /// Lifetime revenue in major currency units
    #[schema(value_type = f64)]
    pub total_revenue: Decimal,
}

/// Result of processing one webhook delivery.
#[derive(Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Purchase recorded and order marked paid
    Reconciled,
    /// A purchase for this order already exists; redelivery acknowledged
    AlreadyProcessed,
    /// Event type not relevant to reconciliation
    Ignored,
}

/// Billing service trait for dependency injection.
#[async_trait]
pub trait BillingService: Send + Sync {
    /// Create a provider checkout session for a course and mirror it locally
    async fn checkout(
        &self,
        provider: &str,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<CheckoutSession>;

    /// Verify and reconcile one webhook delivery
    async fn handle_webhook(
        &self,
        provider: &str,
        body: &[u8],
        signature: &str,
    ) -> AppResult<WebhookOutcome>;

    /// Courses the user has paid for, with lesson summaries
    async fn entitlements(&self, user_id: Uuid) -> AppResult<Vec<EntitledCourse>>;

    /// Aggregate counters for the admin dashboard
    async fn dashboard_stats(&self) -> AppResult<DashboardStats>;
}

/// Apply one verified capture event to the store.
///
/// Keyed on the order's provider id: the first delivery inserts the
/// purchase and flips the order to paid; a redelivery finds the existing
/// purchase and changes nothing. An unknown order or a mismatched amount
/// is an error before any write.
pub async fn reconcile_captured_payment<S: ReconciliationStore + ?Sized>(
    store: &S,
    provider_order_id: &str,
    amount_minor: i64,
) -> AppResult<WebhookOutcome> {
    let order = store
        .find_order_by_provider_id(provider_order_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if store.purchase_exists_for_order(order.id).await? {
        return Ok(WebhookOutcome::AlreadyProcessed);
    }

    if order.amount_minor != amount_minor {
        warn!(
            order_id = %order.id,
            expected = order.amount_minor,
            received = amount_minor,
            "webhook amount does not match order"
        );
        return Err(AppError::BadRequest(
            "Payment amount does not match order".into(),
        ));
    }

    store
        .create_purchase(order.user_id, order.course_id, order.amount_minor, order.id)
        .await?;
    store.mark_order_paid(order.id).await?;

    Ok(WebhookOutcome::Reconciled)
}

/// Concrete implementation of BillingService using Unit of Work and
/// injected provider clients.
pub struct BillingManager<U: UnitOfWork> {
    uow: Arc<U>,
    providers: HashMap<&'static str, Arc<dyn PaymentProvider>>,
    currency: String,
}

impl<U: UnitOfWork> BillingManager<U> {
    pub fn new(
        uow: Arc<U>,
        providers: Vec<Arc<dyn PaymentProvider>>,
        currency: String,
    ) -> Self {
        let providers = providers.into_iter().map(|p| (p.name(), p)).collect();
        Self {
            uow,
            providers,
            currency,
        }
    }

    fn provider(&self, name: &str) -> AppResult<&Arc<dyn PaymentProvider>> {
        self.providers
            .get(name)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown payment provider: {name}")))
    }
}

#[async_trait]
impl<U: UnitOfWork> BillingService for BillingManager<U> {
    async fn checkout(
        &self,
        provider: &str,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<CheckoutSession> {
        let provider = self.provider(provider)?;

        let course = self
            .uow
            .catalog()
            .find_course(course_id)
            .await?
            .ok_or(AppError::NotFound)?;

        // Refuse before touching the provider; no dangling remote sessions
        // for a purchase that can never complete.
        if self
            .uow
            .billing()
            .has_completed_purchase(user_id, course_id)
            .await?
        {
            return Err(AppError::conflict("Purchase"));
        }

        let amount_minor = to_minor_units(course.price)?;

        let session = provider
            .create_checkout(&CheckoutRequest {
                user_id,
                course_id,
                course_title: course.title,
                course_description: course.description,
                course_image_url: course.image_url,
                amount_minor,
                currency: self.currency.clone(),
            })
            .await?;

        let order = self
            .uow
            .billing()
            .create_order(NewOrder {
                provider: provider.name().to_string(),
                provider_order_id: session.provider_order_id.clone(),
                user_id,
                course_id,
                amount_minor: session.amount_minor,
                currency: session.currency.clone(),
                notes: session.notes.clone(),
            })
            .await?;

        info!(
            provider = provider.name(),
            order_id = %order.id,
            provider_order_id = %order.provider_order_id,
            "checkout session created"
        );

        Ok(session)
    }

    async fn handle_webhook(
        &self,
        provider: &str,
        body: &[u8],
        signature: &str,
    ) -> AppResult<WebhookOutcome> {
        let provider = self.provider(provider)?;
        let provider_name = provider.name();

        let (provider_order_id, amount_minor) = match provider.verify_and_parse(body, signature)? {
            WebhookEvent::Ignored { event_type } => {
                info!(provider = provider_name, %event_type, "webhook event ignored");
                return Ok(WebhookOutcome::Ignored);
            }
            WebhookEvent::PaymentCaptured {
                provider_order_id,
                amount_minor,
            } => (provider_order_id, amount_minor),
        };

        let outcome = self
            .uow
            .transaction_serializable(move |ctx| {
                Box::pin(async move {
                    let billing = ctx.billing();
                    reconcile_captured_payment(&billing, &provider_order_id, amount_minor).await
                })
            })
            .await?;

        match outcome {
            WebhookOutcome::Reconciled => {
                info!(provider = provider_name, "payment reconciled");
            }
            WebhookOutcome::AlreadyProcessed => {
                info!(provider = provider_name, "duplicate webhook acknowledged");
            }
            WebhookOutcome::Ignored => {}
        }

        Ok(outcome)
    }

    async fn entitlements(&self, user_id: Uuid) -> AppResult<Vec<EntitledCourse>> {
        let purchases = self.uow.billing().purchases_for_user(user_id).await?;

        let mut courses = Vec::with_capacity(purchases.len());
        for purchase in purchases {
            // Deleting a course clears the link; the purchase stays as
            // history but drops out of this list.
            let Some(course_id) = purchase.course_id else {
                continue;
            };
            let Some(course) = self.uow.catalog().find_course(course_id).await? else {
                continue;
            };

            let lessons = self
                .uow
                .catalog()
                .lessons_for_course(course.id)
                .await?
                .into_iter()
                .map(|lesson| LessonSummary {
                    id: lesson.id,
                    title: lesson.title,
                    description: lesson.description,
                })
                .collect();

            courses.push(EntitledCourse {
                id: course.id,
                title: course.title,
                description: course.description,
                price: course.price,
                image_url: course.image_url,
                purchased_at: purchase.created_at,
                lessons,
            });
        }

        Ok(courses)
    }

    async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let total_users = self.uow.users().count().await?;
        let total_courses = self.uow.catalog().count_courses().await?;
        let total_lessons = self.uow.catalog().count_lessons().await?;
        let total_revenue_minor = self.uow.billing().revenue_minor().await?;

        Ok(DashboardStats {
            total_users,
            total_courses,
            total_lessons,
            total_revenue_minor,
            total_revenue: from_minor_units(total_revenue_minor),
        })
    }
}
