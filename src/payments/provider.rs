//! Provider-agnostic payment contract.
//!
//! Both payment providers implement the same trait: checkout creation
//! returns a session mirrored locally as an `Order`, and webhook
//! verification normalizes provider payloads into one `WebhookEvent` that
//! the billing service reconciles through a single code path.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppResult;

/// Everything a provider needs to open a payment session for one course.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    pub course_description: String,
    pub course_image_url: String,
    /// Amount in the smallest currency unit
    pub amount_minor: i64,
    pub currency: String,
}

/// A provider-side payment session, as returned to the storefront.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckoutSession {
    /// Provider-assigned order/session id; the reconciliation key
    pub provider_order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    /// Hosted checkout page, if the provider uses one (Stripe)
    pub redirect_url: Option<String>,
    /// Client-side key id, if the provider needs one (Razorpay)
    pub public_key_id: Option<String>,
    /// Notes/metadata attached to the session, as JSON text
    pub notes: Option<String>,
}

/// A verified, normalized webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// Payment settled; reconcile the referenced order
    PaymentCaptured {
        provider_order_id: String,
        amount_minor: i64,
    },
    /// Any other event type; acknowledged without effect
    Ignored { event_type: String },
}

/// One payment provider (Razorpay, Stripe).
///
/// `verify_and_parse` must be called with the exact raw request bytes:
/// signatures are computed over the wire payload, not a re-serialization.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Stable lowercase provider name, used in routes and order rows
    fn name(&self) -> &'static str;

    /// Create a provider-side payment session. One remote call, no retries.
    async fn create_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession>;

    /// Verify the webhook signature over the raw body and parse the event.
    /// A bad signature is an error; an unhandled event type is `Ignored`.
    fn verify_and_parse(&self, body: &[u8], signature_header: &str) -> AppResult<WebhookEvent>;
}
