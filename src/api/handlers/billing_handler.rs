//! Billing handlers: checkout, provider webhooks and owned courses.
//!
//! The webhook handler reads the raw request bytes; signature verification
//! happens over the exact wire payload before anything is parsed.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::{RAZORPAY_SIGNATURE_HEADER, STRIPE_SIGNATURE_HEADER};
use crate::domain::EntitledCourse;
use crate::errors::{AppError, AppResult};
use crate::payments::CheckoutSession;
use crate::services::WebhookOutcome;
use crate::types::MessageResponse;

/// Checkout request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutPayload {
    pub course_id: Uuid,
}

/// Create authenticated billing routes
pub fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/:provider/checkout", post(checkout))
        .route("/my-courses", get(my_courses))
}

/// Create public webhook routes (providers cannot send a JWT)
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/:provider/webhook", post(webhook))
}

/// Start a checkout session for a course
#[utoipa::path(
    post,
    path = "/billing/{provider}/checkout",
    tag = "Billing",
    security(("bearer_auth" = [])),
    params(("provider" = String, Path, description = "Payment provider: razorpay or stripe")),
    request_body = CheckoutPayload,
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutSession),
        (status = 400, description = "Unknown provider"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Course already purchased")
    )
)]
pub async fn checkout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(provider): Path<String>,
    Json(payload): Json<CheckoutPayload>,
) -> AppResult<Json<CheckoutSession>> {
    let session = state
        .billing_service
        .checkout(&provider, user.id, payload.course_id)
        .await?;
    Ok(Json(session))
}

/// Receive and reconcile a provider webhook.
///
/// Always answers 200 for verified deliveries, including duplicates and
/// event types we do not act on, so providers stop retrying.
#[utoipa::path(
    post,
    path = "/billing/{provider}/webhook",
    tag = "Billing",
    params(("provider" = String, Path, description = "Payment provider: razorpay or stripe")),
    responses(
        (status = 200, description = "Webhook processed", body = MessageResponse),
        (status = 400, description = "Bad signature or malformed payload"),
        (status = 404, description = "No order matches this payment")
    )
)]
pub async fn webhook(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<MessageResponse>> {
    let header_name = match provider.as_str() {
        "razorpay" => RAZORPAY_SIGNATURE_HEADER,
        "stripe" => STRIPE_SIGNATURE_HEADER,
        other => {
            return Err(AppError::BadRequest(format!(
                "Unknown payment provider: {other}"
            )))
        }
    };

    let signature = headers
        .get(header_name)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::SignatureMismatch)?;

    let outcome = state
        .billing_service
        .handle_webhook(&provider, &body, signature)
        .await?;

    let message = match outcome {
        WebhookOutcome::Reconciled => "Payment recorded",
        WebhookOutcome::AlreadyProcessed => "Payment already recorded",
        WebhookOutcome::Ignored => "Event ignored",
    };

    Ok(Json(MessageResponse::new(message)))
}

/// List the authenticated user's purchased courses
#[utoipa::path(
    get,
    path = "/billing/my-courses",
    tag = "Billing",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Purchased courses with lesson summaries", body = [EntitledCourse]),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn my_courses(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<EntitledCourse>>> {
    let courses = state.billing_service.entitlements(user.id).await?;
    Ok(Json(courses))
}
