//! Razorpay client: order creation over REST and webhook verification.
//!
//! Webhook signatures are HMAC-SHA256 over the raw body, hex-encoded in
//! the `x-razorpay-signature` header. The reconciliation key is the
//! Razorpay order id carried inside the `payment.captured` payload.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tracing::warn;

use crate::config::{ProviderConfig, RAZORPAY_API_BASE};
use crate::errors::{AppError, AppResult};
use crate::payments::provider::{CheckoutRequest, CheckoutSession, PaymentProvider, WebhookEvent};

type HmacSha256 = Hmac<Sha256>;

pub struct RazorpayClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    event: String,
    #[serde(default)]
    payload: Option<WebhookPayload>,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    payment: PaymentWrapper,
}

#[derive(Debug, Deserialize)]
struct PaymentWrapper {
    entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
struct PaymentEntity {
    order_id: String,
    amount: i64,
}

impl RazorpayClient {
    pub fn new(http: reqwest::Client, config: ProviderConfig) -> Self {
        Self { http, config }
    }

    /// Constant-time HMAC check of the raw body against the hex signature.
    fn verify_signature(&self, body: &[u8], signature_hex: &str) -> AppResult<()> {
        let expected = hex::decode(signature_hex.trim())
            .map_err(|_| AppError::SignatureMismatch)?;

        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.as_bytes())
            .map_err(|e| AppError::provider(format!("razorpay hmac init failed: {e}")))?;
        mac.update(body);
        mac.verify_slice(&expected)
            .map_err(|_| AppError::SignatureMismatch)
    }
}

#[async_trait]
impl PaymentProvider for RazorpayClient {
    fn name(&self) -> &'static str {
        "razorpay"
    }

    async fn create_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession> {
        let notes = json!({
            "user_id": request.user_id.to_string(),
            "course_id": request.course_id.to_string(),
        });

        let body = json!({
            "amount": request.amount_minor,
            "currency": request.currency,
            "receipt": format!("course_{}", request.course_id),
            "notes": notes,
        });

        let response = self
            .http
            .post(format!("{RAZORPAY_API_BASE}/orders"))
            .basic_auth(&self.config.key_id, Some(&self.config.api_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::provider(format!("razorpay order request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, %detail, "razorpay order creation rejected");
            return Err(AppError::provider(format!(
                "razorpay order creation failed with status {status}"
            )));
        }

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| AppError::provider(format!("razorpay order response malformed: {e}")))?;

        Ok(CheckoutSession {
            provider_order_id: order.id,
            amount_minor: order.amount,
            currency: order.currency,
            redirect_url: None,
            public_key_id: Some(self.config.key_id.clone()),
            notes: Some(notes.to_string()),
        })
    }

    fn verify_and_parse(&self, body: &[u8], signature_header: &str) -> AppResult<WebhookEvent> {
        self.verify_signature(body, signature_header)?;

        let envelope: WebhookEnvelope = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("malformed webhook payload: {e}")))?;

        if envelope.event != "payment.captured" {
            return Ok(WebhookEvent::Ignored {
                event_type: envelope.event,
            });
        }

        let payment = envelope
            .payload
            .ok_or_else(|| AppError::BadRequest("webhook payload missing payment".into()))?
            .payment
            .entity;

        Ok(WebhookEvent::PaymentCaptured {
            provider_order_id: payment.order_id,
            amount_minor: payment.amount,
        })
    }
}
