//! Cart Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use crate::domain::aggregates::product::SelectedOptions;
use crate::domain::value_objects::Money;

#[derive(Clone, Debug, Serialize)]
pub struct Cart {
    id: String,
    session_id: String,
    items: Vec<CartItem>,
    subtotal: Money,
    currency: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// What the backend needs to identify the purchasable item: the resolved
/// variant, or the raw option selection when none resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogReference {
    Variant { variant_id: String },
    Options { options: SelectedOptions },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub product_id: String,
    pub reference: CatalogReference,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, reference: CatalogReference, name: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self { id: Uuid::now_v7().to_string(), product_id: product_id.into(), reference, name: name.into(), quantity, unit_price }
    }

    pub fn line_total(&self) -> Money { self.unit_price.multiply(self.quantity) }
}

impl Cart {
    pub fn new(session_id: impl Into<String>, currency: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(), session_id: session_id.into(),
            items: vec![], subtotal: Money::zero(currency), currency: currency.to_string(),
            created_at: now, updated_at: now,
        }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn session_id(&self) -> &str { &self.session_id }
    pub fn currency(&self) -> &str { &self.currency }
    pub fn items(&self) -> &[CartItem] { &self.items }
    pub fn subtotal(&self) -> &Money { &self.subtotal }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn total_quantity(&self) -> u32 { self.items.iter().map(|i| i.quantity).sum() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    /// Adds a line, merging into an existing line for the same catalog item.
    /// Returns the id of the line that now holds the quantity.
    ///
    /// Every line shares the cart currency; a line priced in another
    /// currency is rejected before anything changes.
    pub fn add_item(&mut self, item: CartItem) -> Result<String, CartError> {
        if item.unit_price.currency() != self.currency {
            return Err(CartError::CurrencyMismatch { cart: self.currency.clone(), item: item.unit_price.currency().to_string() });
        }
        let id = match self.items.iter_mut().find(|i| i.product_id == item.product_id && i.reference == item.reference) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                existing.id.clone()
            }
            None => {
                let id = item.id.clone();
                self.items.push(item);
                id
            }
        };
        self.recalculate();
        Ok(id)
    }

    pub fn item(&self, line_id: &str) -> Option<&CartItem> { self.items.iter().find(|i| i.id == line_id) }

    pub fn update_quantity(&mut self, line_id: &str, quantity: u32) -> Result<(), CartError> {
        let item = self.items.iter_mut().find(|i| i.id == line_id).ok_or_else(|| CartError::ItemNotFound(line_id.to_string()))?;
        if quantity == 0 { self.items.retain(|i| i.id != line_id); }
        else { item.quantity = quantity; }
        self.recalculate();
        Ok(())
    }

    pub fn remove_item(&mut self, line_id: &str) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|i| i.id != line_id);
        if self.items.len() == before { return Err(CartError::ItemNotFound(line_id.to_string())); }
        self.recalculate();
        Ok(())
    }

    pub fn clear(&mut self) { self.items.clear(); self.recalculate(); }

    fn recalculate(&mut self) {
        let amount: Decimal = self.items.iter().map(|i| i.line_total().amount()).sum();
        self.subtotal = Money::new(amount, &self.currency);
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("line item not found: {0}")]
    ItemNotFound(String),

    #[error("cart is priced in {cart}, item is priced in {item}")]
    CurrencyMismatch { cart: String, item: String },
}
