//! Access to the headless commerce backend
//!
//! Every call takes the backend handle explicitly; the storefront keeps no
//! global client. [`InMemoryBackend`] serves a catalog seeded from JSON.

mod memory;

pub use memory::{CatalogSeed, InMemoryBackend};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use crate::domain::aggregates::{BackInStockRequest, Cart, CartError, Checkout, Collection, Order, Product, SelectedOptions};

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_CHECKOUT_BASE_URL: &str = "http://localhost:8083/checkout";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    LastUpdated,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    /// Unrecognized values fall back to newest first.
    pub fn parse(s: &str) -> Self {
        match s {
            "price_asc" => Self::PriceAsc,
            "price_desc" => Self::PriceDesc,
            _ => Self::LastUpdated,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive name prefix.
    pub q: Option<String>,
    /// Matches products in any of these collections.
    pub collection_ids: Vec<String>,
    pub sort: ProductSort,
    /// Inclusive; zero is treated as unset.
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub skip: usize,
    pub limit: usize,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self { q: None, collection_ids: vec![], sort: ProductSort::default(), price_min: None, price_max: None, skip: 0, limit: DEFAULT_LIMIT }
    }
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        if !product.visible { return false; }
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            if !product.name.to_lowercase().starts_with(&q.to_lowercase()) { return false; }
        }
        if !self.collection_ids.is_empty() && !product.collection_ids.iter().any(|c| self.collection_ids.contains(c)) {
            return false;
        }
        let price = product.price_data.price;
        if let Some(min) = self.price_min.filter(|m| !m.is_zero()) {
            if price < min { return false; }
        }
        if let Some(max) = self.price_max.filter(|m| !m.is_zero()) {
            if price > max { return false; }
        }
        true
    }

    pub fn sort_products(&self, products: &mut [Product]) {
        match self.sort {
            ProductSort::LastUpdated => products.sort_by(|a, b| b.last_updated.cmp(&a.last_updated)),
            ProductSort::PriceAsc => products.sort_by(|a, b| a.price_data.price.cmp(&b.price_data.price)),
            ProductSort::PriceDesc => products.sort_by(|a, b| b.price_data.price.cmp(&a.price_data.price)),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: usize,
    pub total_pages: usize,
    pub skip: usize,
    pub limit: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: usize, skip: usize, limit: usize) -> Self {
        let total_pages = if limit == 0 { 1 } else { total_count.div_ceil(limit).max(1) };
        Self { items, total_count, total_pages, skip, limit }
    }
}

/// A product, a selection naming every option, and a quantity: what the
/// cart and quick buy both need.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ItemRequest {
    pub product_id: String,
    #[serde(default)]
    pub selected_options: SelectedOptions,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackInStockSubscription {
    pub product_id: String,
    pub selected_options: SelectedOptions,
    pub email: String,
    pub item_url: String,
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("no cart for session {0}")]
    CartNotFound(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("product {product_id} is out of stock for the selected options")]
    OutOfStock { product_id: String },

    #[error("only {available} left in stock, {requested} requested")]
    InsufficientStock { available: u32, requested: u32 },

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("product {product_id} needs a choice for: {}", .missing.join(", "))]
    IncompleteSelection { product_id: String, missing: Vec<String> },

    #[error("cart for session {0} is empty")]
    EmptyCart(String),

    #[error("checkout not found: {0}")]
    CheckoutNotFound(String),

    #[error("product {product_id} is in stock for the selected options")]
    AlreadyInStock { product_id: String },

    #[error("already subscribed to back-in-stock notifications for this item")]
    AlreadySubscribed,

    #[error("failed to read catalog: {0}")]
    CatalogIo(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    CatalogParse(#[from] serde_json::Error),
}

/// Operations the storefront composes against the commerce backend.
pub trait CommerceBackend: Clone + Send + Sync + 'static {
    fn query_products(&self, query: &ProductQuery) -> impl Future<Output = Result<Page<Product>, BackendError>> + Send;

    /// `None` for unknown or hidden products.
    fn product_by_slug(&self, slug: &str) -> impl Future<Output = Result<Option<Product>, BackendError>> + Send;

    fn product_by_id(&self, id: &str) -> impl Future<Output = Result<Option<Product>, BackendError>> + Send;

    /// Browsable collections; system collections are excluded.
    fn collections(&self) -> impl Future<Output = Result<Vec<Collection>, BackendError>> + Send;

    fn collection_by_slug(&self, slug: &str) -> impl Future<Output = Result<Option<Collection>, BackendError>> + Send;

    /// `None` when the session owns no cart yet.
    fn cart(&self, session: &str) -> impl Future<Output = Result<Option<Cart>, BackendError>> + Send;

    /// Products that manage variants need every option chosen.
    fn add_to_cart(&self, session: &str, request: ItemRequest) -> impl Future<Output = Result<Cart, BackendError>> + Send;

    /// A quantity of zero removes the line; others are capped by stock.
    fn update_line_quantity(&self, session: &str, line_id: &str, quantity: u32) -> impl Future<Output = Result<Cart, BackendError>> + Send;

    fn remove_line(&self, session: &str, line_id: &str) -> impl Future<Output = Result<Cart, BackendError>> + Send;

    fn clear_cart(&self, session: &str) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Hands the session cart over to the hosted checkout.
    fn checkout_from_cart(&self, session: &str) -> impl Future<Output = Result<Checkout, BackendError>> + Send;

    /// Checkout for a single item, bypassing the cart.
    fn quick_buy(&self, request: ItemRequest) -> impl Future<Output = Result<Checkout, BackendError>> + Send;

    fn order(&self, id: &str) -> impl Future<Output = Result<Option<Order>, BackendError>> + Send;

    /// Only out-of-stock selections can be subscribed to, once per email.
    fn request_back_in_stock(&self, request: BackInStockSubscription) -> impl Future<Output = Result<BackInStockRequest, BackendError>> + Send;
}
