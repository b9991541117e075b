//! Order and purchase domain entities, plus money conversion.
//!
//! An `Order` mirrors a provider-side payment session and is pending until a
//! verified webhook confirms payment. A `Purchase` is the confirmed
//! entitlement; its existence with `Completed` status grants course access.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Order lifecycle. `Created -> Paid` is the only transition; `Paid` is
/// terminal and only a verified webhook may perform it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(OrderStatus::Created),
            "paid" => Some(OrderStatus::Paid),
            _ => None,
        }
    }
}

/// Purchase status. Only `Completed` purchases count as entitlements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Completed,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(PurchaseStatus::Completed),
            _ => None,
        }
    }
}

/// A provider-side payment session mirrored locally.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    /// Which payment provider issued this session
    #[schema(example = "razorpay")]
    pub provider: String,
    /// Provider-assigned session/order identifier (unique)
    #[schema(example = "order_P1xYzAbCdEfGhI")]
    pub provider_order_id: String,
    pub user_id: Uuid,
    /// Course being bought; cleared if the course is deleted later
    pub course_id: Option<Uuid>,
    /// Amount in the smallest currency unit (e.g. paise)
    #[schema(example = 49900)]
    pub amount_minor: i64,
    #[schema(example = "INR")]
    pub currency: String,
    pub status: OrderStatus,
    /// Provider notes/metadata payload, stored as JSON text
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A confirmed entitlement granting a user access to a course.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Purchase {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Course this purchase granted; cleared if the course is deleted
    /// later, so the row survives as payment history
    pub course_id: Option<Uuid>,
    /// Amount paid, in minor units
    pub amount_minor: i64,
    pub status: PurchaseStatus,
    /// Order this purchase settled, when known
    pub order_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Fields for persisting a freshly created provider session as an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub provider: String,
    pub provider_order_id: String,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    pub notes: Option<String>,
}

/// Convert a course price in major units to the smallest currency unit
/// (499.00 -> 49900).
///
/// # Errors
/// Rejects non-positive prices and prices with sub-minor-unit precision,
/// since those cannot be represented faithfully to the provider.
pub fn to_minor_units(price: Decimal) -> AppResult<i64> {
    if price <= Decimal::ZERO {
        return Err(AppError::validation("Price must be positive"));
    }

    let minor = price * Decimal::from(100);
    if minor.fract() != Decimal::ZERO {
        return Err(AppError::validation(
            "Price has more precision than the smallest currency unit",
        ));
    }

    minor
        .to_i64()
        .ok_or_else(|| AppError::validation("Price out of range"))
}

/// Convert minor units back to a major-unit decimal (49900 -> 499.00).
pub fn from_minor_units(amount_minor: i64) -> Decimal {
    Decimal::new(amount_minor, 2)
}
