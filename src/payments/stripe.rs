//! Stripe client: hosted checkout sessions and webhook verification.
//!
//! Webhook signatures use the `Stripe-Signature` scheme: the header carries
//! `t=<unix_ts>,v1=<hex>` where the hex value is HMAC-SHA256 over
//! `"{timestamp}.{raw_body}"`. Stale timestamps are rejected to bound
//! replay. The reconciliation key is the checkout session id.

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::warn;

use crate::config::{ProviderConfig, STRIPE_API_BASE, STRIPE_SIGNATURE_TOLERANCE_SECONDS};
use crate::errors::{AppError, AppResult};
use crate::payments::provider::{CheckoutRequest, CheckoutSession, PaymentProvider, WebhookEvent};

type HmacSha256 = Hmac<Sha256>;

pub struct StripeClient {
    http: reqwest::Client,
    config: ProviderConfig,
    /// Storefront origin used to build success/cancel redirect URLs
    checkout_origin: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookEnvelope {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    data: Option<WebhookData>,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    object: SessionObject,
}

#[derive(Debug, Deserialize)]
struct SessionObject {
    id: String,
    amount_total: i64,
}

impl StripeClient {
    pub fn new(http: reqwest::Client, config: ProviderConfig, checkout_origin: String) -> Self {
        Self {
            http,
            config,
            checkout_origin,
        }
    }

    /// Parse a `t=<ts>,v1=<sig>` header into its parts.
    fn parse_signature_header(header: &str) -> AppResult<(i64, String)> {
        let mut timestamp = None;
        let mut signature = None;
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
                Some(("v1", value)) => signature = Some(value.to_string()),
                _ => {}
            }
        }
        match (timestamp, signature) {
            (Some(ts), Some(sig)) => Ok((ts, sig)),
            _ => Err(AppError::SignatureMismatch),
        }
    }

    fn verify_signature(&self, body: &[u8], signature_header: &str) -> AppResult<()> {
        let (timestamp, signature_hex) = Self::parse_signature_header(signature_header)?;

        let age = (Utc::now().timestamp() - timestamp).abs();
        if age > STRIPE_SIGNATURE_TOLERANCE_SECONDS {
            return Err(AppError::SignatureMismatch);
        }

        let expected = hex::decode(&signature_hex).map_err(|_| AppError::SignatureMismatch)?;

        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.as_bytes())
            .map_err(|e| AppError::provider(format!("stripe hmac init failed: {e}")))?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        mac.verify_slice(&expected)
            .map_err(|_| AppError::SignatureMismatch)
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_checkout(&self, request: &CheckoutRequest) -> AppResult<CheckoutSession> {
        let currency = request.currency.to_lowercase();
        let amount = request.amount_minor.to_string();
        let success_url = format!("{}/courses/{}?payment=success", self.checkout_origin, request.course_id);
        let cancel_url = format!("{}/courses/{}?payment=cancelled", self.checkout_origin, request.course_id);
        let user_id = request.user_id.to_string();
        let course_id = request.course_id.to_string();

        // Stripe's REST API takes form-encoded bodies with bracketed keys.
        let mut form: Vec<(&str, &str)> = vec![
            ("mode", "payment"),
            ("payment_method_types[0]", "card"),
            ("line_items[0][quantity]", "1"),
            ("line_items[0][price_data][currency]", &currency),
            ("line_items[0][price_data][unit_amount]", &amount),
            ("line_items[0][price_data][product_data][name]", &request.course_title),
            ("success_url", &success_url),
            ("cancel_url", &cancel_url),
            ("metadata[user_id]", &user_id),
            ("metadata[course_id]", &course_id),
        ];
        if !request.course_description.is_empty() {
            form.push((
                "line_items[0][price_data][product_data][description]",
                &request.course_description,
            ));
        }
        if !request.course_image_url.is_empty() {
            form.push((
                "line_items[0][price_data][product_data][images][0]",
                &request.course_image_url,
            ));
        }

        let response = self
            .http
            .post(format!("{STRIPE_API_BASE}/checkout/sessions"))
            .bearer_auth(&self.config.api_secret)
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::provider(format!("stripe session request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            warn!(%status, %detail, "stripe session creation rejected");
            return Err(AppError::provider(format!(
                "stripe session creation failed with status {status}"
            )));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| AppError::provider(format!("stripe session response malformed: {e}")))?;

        Ok(CheckoutSession {
            provider_order_id: session.id,
            amount_minor: request.amount_minor,
            currency: request.currency.clone(),
            redirect_url: session.url,
            public_key_id: None,
            notes: None,
        })
    }

    fn verify_and_parse(&self, body: &[u8], signature_header: &str) -> AppResult<WebhookEvent> {
        self.verify_signature(body, signature_header)?;

        let envelope: WebhookEnvelope = serde_json::from_slice(body)
            .map_err(|e| AppError::BadRequest(format!("malformed webhook payload: {e}")))?;

        if envelope.event_type != "checkout.session.completed" {
            return Ok(WebhookEvent::Ignored {
                event_type: envelope.event_type,
            });
        }

        let session = envelope
            .data
            .ok_or_else(|| AppError::BadRequest("webhook payload missing session".into()))?
            .object;

        Ok(WebhookEvent::PaymentCaptured {
            provider_order_id: session.id,
            amount_minor: session.amount_total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_stripe";

    fn client() -> StripeClient {
        StripeClient::new(
            reqwest::Client::new(),
            ProviderConfig {
                key_id: String::new(),
                api_secret: "sk_test_key".to_string(),
                webhook_secret: SECRET.to_string(),
            },
            "http://localhost:3000".to_string(),
        )
    }

    fn sign(secret: &str, timestamp: i64, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(body);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    fn completed_body(session_id: &str, amount_total: i64) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "type": "checkout.session.completed",
            "data": {
                "object": { "id": session_id, "amount_total": amount_total }
            }
        }))
        .unwrap()
    }

    #[test]
    fn accepts_fresh_valid_signature() {
        let client = client();
        let body = completed_body("cs_test_123", 49_900);
        let header = sign(SECRET, Utc::now().timestamp(), &body);

        let event = client.verify_and_parse(&body, &header).unwrap();
        assert_eq!(
            event,
            WebhookEvent::PaymentCaptured {
                provider_order_id: "cs_test_123".to_string(),
                amount_minor: 49_900,
            }
        );
    }

    #[test]
    fn rejects_stale_timestamp() {
        let client = client();
        let body = completed_body("cs_test_123", 49_900);
        let stale = Utc::now().timestamp() - STRIPE_SIGNATURE_TOLERANCE_SECONDS - 60;
        let header = sign(SECRET, stale, &body);

        let err = client.verify_and_parse(&body, &header).unwrap_err();
        assert!(matches!(err, AppError::SignatureMismatch));
    }

    #[test]
    fn rejects_tampered_body() {
        let client = client();
        let body = completed_body("cs_test_123", 49_900);
        let header = sign(SECRET, Utc::now().timestamp(), &body);
        let tampered = completed_body("cs_test_123", 1);

        let err = client.verify_and_parse(&tampered, &header).unwrap_err();
        assert!(matches!(err, AppError::SignatureMismatch));
    }

    #[test]
    fn rejects_malformed_header() {
        let client = client();
        let body = completed_body("cs_test_123", 49_900);

        for header in ["", "v1=abc", "t=notanumber,v1=abc", "garbage"] {
            let err = client.verify_and_parse(&body, header).unwrap_err();
            assert!(matches!(err, AppError::SignatureMismatch), "header {header:?}");
        }
    }

    #[test]
    fn ignores_other_events() {
        let client = client();
        let body = serde_json::to_vec(&json!({ "type": "invoice.paid" })).unwrap();
        let header = sign(SECRET, Utc::now().timestamp(), &body);

        let event = client.verify_and_parse(&body, &header).unwrap();
        assert_eq!(
            event,
            WebhookEvent::Ignored {
                event_type: "invoice.paid".to_string(),
            }
        );
    }
}
