//! Value objects shared by catalog and cart projections

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Inventory status as reported by the commerce backend.
///
/// Anything the backend sends that is not one of the known statuses
/// deserializes to `Unknown`, which is never purchasable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InventoryStatus {
    InStock,
    OutOfStock,
    PartiallyOutOfStock,
    #[default]
    #[serde(other)]
    Unknown,
}

impl InventoryStatus {
    pub fn is_purchasable(&self) -> bool { matches!(self, Self::InStock | Self::PartiallyOutOfStock) }
}

/// Stock record attached to a product or to one of its variants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    #[serde(default)]
    pub inventory_status: InventoryStatus,
    /// `None` means the backend does not track a count (unlimited).
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub in_stock: bool,
}

impl Stock {
    pub fn tracked(quantity: u32) -> Self {
        Self {
            inventory_status: if quantity == 0 { InventoryStatus::OutOfStock } else { InventoryStatus::InStock },
            quantity: Some(quantity),
            in_stock: quantity > 0,
        }
    }

    pub fn unlimited() -> Self {
        Self { inventory_status: InventoryStatus::InStock, quantity: None, in_stock: true }
    }

    pub fn with_status(status: InventoryStatus) -> Self {
        Self { inventory_status: status, quantity: None, in_stock: status.is_purchasable() }
    }
}

/// Price record attached to a product or variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceData {
    pub currency: String,
    pub price: Decimal,
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
}

impl PriceData {
    pub fn new(price: Decimal, currency: &str) -> Self {
        Self { currency: currency.to_string(), price, discounted_price: None }
    }

    pub fn discounted(mut self, discounted_price: Decimal) -> Self {
        self.discounted_price = Some(discounted_price);
        self
    }

    /// Price the customer actually pays.
    pub fn effective(&self) -> Decimal { self.discounted_price.unwrap_or(self.price) }
    pub fn has_discount(&self) -> bool { self.discounted_price.is_some_and(|d| d != self.price) }
    pub fn unit_price(&self) -> Money { Money::new(self.effective(), &self.currency) }
    pub fn formatted_price(&self) -> String { format_currency(self.price, &self.currency) }
    pub fn formatted_discounted_price(&self) -> String { format_currency(self.effective(), &self.currency) }
}

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn usd(amount: Decimal) -> Self { Self::new(amount, "USD") }
    pub fn zero(currency: &str) -> Self { Self::new(Decimal::ZERO, currency) }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch { left: self.currency.clone(), right: other.currency.clone() });
        }
        Ok(Money::new(self.amount + other.amount, &self.currency))
    }
    pub fn multiply(&self, qty: u32) -> Money { Money::new(self.amount * Decimal::from(qty), &self.currency) }
}

impl Default for Money { fn default() -> Self { Self::zero("USD") } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&format_currency(self.amount, &self.currency)) }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },
}

/// Formats an amount the way the storefront displays prices, e.g. `$1,234.50`.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let mut value = amount.round_dp(2).abs();
    value.rescale(2);
    let digits = value.to_string();
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 { grouped.push(','); }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    match currency_symbol(currency) {
        Some(symbol) => format!("{sign}{symbol}{grouped}.{frac_part}"),
        None => format!("{sign}{} {grouped}.{frac_part}", currency.to_uppercase()),
    }
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_uppercase().as_str() {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_status_parsing() {
        let s: Stock = serde_json::from_str(r#"{"inventoryStatus":"PARTIALLY_OUT_OF_STOCK"}"#).unwrap();
        assert_eq!(s.inventory_status, InventoryStatus::PartiallyOutOfStock);
        assert_eq!(s.quantity, None);
        let s: Stock = serde_json::from_str(r#"{"inventoryStatus":"BACKORDERED","quantity":3}"#).unwrap();
        assert_eq!(s.inventory_status, InventoryStatus::Unknown);
        assert!(!s.inventory_status.is_purchasable());
        let s: Stock = serde_json::from_str("{}").unwrap();
        assert_eq!(s, Stock::default());
    }

    #[test]
    fn test_discount() {
        let p = PriceData::new(Decimal::new(2000, 2), "USD");
        assert!(!p.has_discount());
        assert!(!p.clone().discounted(Decimal::new(20, 0)).has_discount());
        let d = p.discounted(Decimal::new(1500, 2));
        assert!(d.has_discount());
        assert_eq!(d.unit_price().amount(), Decimal::new(15, 0));
        assert_eq!(d.formatted_price(), "$20.00");
        assert_eq!(d.formatted_discounted_price(), "$15.00");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Decimal::new(123450, 2), "USD"), "$1,234.50");
        assert_eq!(format_currency(Decimal::new(1234567, 0), "eur"), "€1,234,567.00");
        assert_eq!(format_currency(Decimal::new(5, 1), "GBP"), "£0.50");
        assert_eq!(format_currency(Decimal::new(-999, 2), "USD"), "-$9.99");
        assert_eq!(format_currency(Decimal::new(100, 0), "NGN"), "NGN 100.00");
    }

    #[test]
    fn test_money_add() {
        let a = Money::usd(Decimal::new(100, 0));
        let b = Money::usd(Decimal::new(50, 0));
        assert_eq!(a.add(&b).unwrap().amount(), Decimal::new(150, 0));
        assert!(a.add(&Money::zero("EUR")).is_err());
    }
}
