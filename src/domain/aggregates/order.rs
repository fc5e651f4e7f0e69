//! Checkout and Order projections
//!
//! A checkout is the hand-off to the backend's hosted checkout page; the
//! order is what that page produces once the shopper pays.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::domain::aggregates::cart::CartItem;
use crate::domain::value_objects::Money;

/// How long after an order is placed the success page still clears the cart.
pub const RECENT_ORDER_WINDOW_MINUTES: i64 = 5;

#[derive(Clone, Debug, Serialize)]
pub struct Checkout {
    pub id: String,
    /// Cart session this checkout was started from; `None` for quick buys.
    pub session_id: Option<String>,
    pub items: Vec<CartItem>,
    pub subtotal: Money,
    pub checkout_url: String,
    pub created_at: DateTime<Utc>,
}

impl Checkout {
    /// `items` must share one currency.
    pub fn new(session_id: Option<String>, items: Vec<CartItem>, currency: &str, checkout_base_url: &str) -> Self {
        let id = Uuid::now_v7().to_string();
        Self {
            checkout_url: format!("{}/{}", checkout_base_url.trim_end_matches('/'), id),
            subtotal: subtotal(&items, currency),
            id, session_id, items, created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus { #[default] Approved, Canceled }

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub number: u64,
    #[serde(default)]
    pub checkout_id: Option<String>,
    pub buyer_email: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<CartItem>,
    pub subtotal: Money,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn from_checkout(number: u64, checkout: &Checkout, buyer_email: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(), number, checkout_id: Some(checkout.id.clone()),
            buyer_email: buyer_email.into(), status: OrderStatus::Approved,
            items: checkout.items.clone(), subtotal: checkout.subtotal.clone(), created_at: Utc::now(),
        }
    }

    /// Placed within the last few minutes, relative to `now`.
    pub fn is_recent(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at <= Duration::minutes(RECENT_ORDER_WINDOW_MINUTES)
    }
}

fn subtotal(items: &[CartItem], currency: &str) -> Money {
    let amount: Decimal = items.iter().map(|i| i.line_total().amount()).sum();
    Money::new(amount, currency)
}
