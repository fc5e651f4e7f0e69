//! In-memory commerce backend

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{BackInStockSubscription, BackendError, CommerceBackend, ItemRequest, Page, ProductQuery, DEFAULT_CHECKOUT_BASE_URL};
use crate::domain::aggregates::{BackInStockRequest, Cart, CartError, CartItem, CatalogReference, Checkout, Collection, Order, Product, SelectedOptions};
use crate::domain::resolver::{available_quantity, check_in_stock, effective_price, find_variant, unresolved_options};

/// First order number handed out when the seed carries no orders.
const FIRST_ORDER_NUMBER: u64 = 10001;

/// Catalog file layout: `{ "products": [...], "collections": [...], "orders": [...] }`.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub orders: Vec<Order>,
}

#[derive(Default)]
struct State {
    products: Vec<Product>,
    collections: Vec<Collection>,
    carts: HashMap<String, Cart>,
    checkouts: HashMap<String, Checkout>,
    orders: Vec<Order>,
    notifications: Vec<BackInStockRequest>,
}

#[derive(Clone)]
pub struct InMemoryBackend {
    state: Arc<RwLock<State>>,
    checkout_base_url: String,
}

impl Default for InMemoryBackend {
    fn default() -> Self { Self::new(CatalogSeed::default()) }
}

impl InMemoryBackend {
    pub fn new(seed: CatalogSeed) -> Self {
        let state = State { products: seed.products, collections: seed.collections, orders: seed.orders, ..State::default() };
        Self { state: Arc::new(RwLock::new(state)), checkout_base_url: DEFAULT_CHECKOUT_BASE_URL.to_string() }
    }

    pub fn with_checkout_base_url(mut self, url: impl Into<String>) -> Self {
        self.checkout_base_url = url.into();
        self
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let seed: CatalogSeed = serde_json::from_str(&raw)?;
        info!(path = %path.as_ref().display(), products = seed.products.len(), collections = seed.collections.len(), orders = seed.orders.len(), "catalog loaded");
        Ok(Self::new(seed))
    }

    /// Stands in for the hosted checkout page: turns a pending checkout into
    /// an order. The checkout can only be completed once.
    pub async fn complete_checkout(&self, checkout_id: &str, buyer_email: &str) -> Result<Order, BackendError> {
        let mut state = self.state.write().await;
        let checkout = state.checkouts.remove(checkout_id)
            .ok_or_else(|| BackendError::CheckoutNotFound(checkout_id.to_string()))?;
        let number = state.orders.iter().map(|o| o.number + 1).max().unwrap_or(FIRST_ORDER_NUMBER);
        let order = Order::from_checkout(number, &checkout, buyer_email);
        info!(order_id = %order.id, number, checkout_id, "order placed");
        state.orders.push(order.clone());
        Ok(order)
    }
}

/// Finds a visible product and checks the selection names a single
/// purchasable item, returning the reference a cart line would carry.
fn resolve_item<'a>(products: &'a [Product], product_id: &str, selected: &SelectedOptions) -> Result<(&'a Product, CatalogReference), BackendError> {
    let product = products.iter().find(|p| p.id == product_id && p.visible)
        .ok_or_else(|| BackendError::ProductNotFound(product_id.to_string()))?;
    if product.manages_variants {
        let missing = unresolved_options(product, selected);
        if !missing.is_empty() {
            return Err(BackendError::IncompleteSelection {
                product_id: product.id.clone(),
                missing: missing.into_iter().map(String::from).collect(),
            });
        }
    }
    let reference = match find_variant(product, selected) {
        Some(v) => CatalogReference::Variant { variant_id: v.id.clone() },
        None => CatalogReference::Options { options: selected.clone() },
    };
    Ok((product, reference))
}

/// `already` is the quantity of the same item the shopper holds elsewhere.
fn ensure_available(product: &Product, selected: &SelectedOptions, already: u32, quantity: u32) -> Result<(), BackendError> {
    if quantity == 0 { return Err(BackendError::InvalidQuantity); }
    if !check_in_stock(product, selected) {
        return Err(BackendError::OutOfStock { product_id: product.id.clone() });
    }
    if let Some(available) = available_quantity(product, selected) {
        let requested = already.saturating_add(quantity);
        if requested > available {
            return Err(BackendError::InsufficientStock { available, requested });
        }
    }
    Ok(())
}

/// Rebuilds the option selection a cart line was added with.
fn line_selection(product: &Product, reference: &CatalogReference) -> SelectedOptions {
    match reference {
        CatalogReference::Variant { variant_id } => product.variants.iter()
            .find(|v| &v.id == variant_id)
            .map(|v| v.choices.clone())
            .unwrap_or_default(),
        CatalogReference::Options { options } => options.clone(),
    }
}

impl CommerceBackend for InMemoryBackend {
    async fn query_products(&self, query: &ProductQuery) -> Result<Page<Product>, BackendError> {
        let state = self.state.read().await;
        let mut matched: Vec<Product> = state.products.iter().filter(|p| query.matches(p)).cloned().collect();
        query.sort_products(&mut matched);
        let total = matched.len();
        let items = matched.into_iter().skip(query.skip).take(query.limit).collect();
        Ok(Page::new(items, total, query.skip, query.limit))
    }

    async fn product_by_slug(&self, slug: &str) -> Result<Option<Product>, BackendError> {
        let state = self.state.read().await;
        Ok(state.products.iter().find(|p| p.slug == slug && p.visible).cloned())
    }

    async fn product_by_id(&self, id: &str) -> Result<Option<Product>, BackendError> {
        let state = self.state.read().await;
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }

    async fn collections(&self) -> Result<Vec<Collection>, BackendError> {
        let state = self.state.read().await;
        Ok(state.collections.iter().filter(|c| !c.is_system()).cloned().collect())
    }

    async fn collection_by_slug(&self, slug: &str) -> Result<Option<Collection>, BackendError> {
        let state = self.state.read().await;
        Ok(state.collections.iter().find(|c| c.slug == slug).cloned())
    }

    async fn cart(&self, session: &str) -> Result<Option<Cart>, BackendError> {
        let state = self.state.read().await;
        Ok(state.carts.get(session).cloned())
    }

    async fn add_to_cart(&self, session: &str, request: ItemRequest) -> Result<Cart, BackendError> {
        let mut state = self.state.write().await;
        let State { products, carts, .. } = &mut *state;

        let selected = &request.selected_options;
        let (product, reference) = resolve_item(products, &request.product_id, selected)?;
        let in_cart: u32 = carts.get(session).map_or(0, |cart| cart.items().iter()
            .filter(|i| i.product_id == product.id && i.reference == reference)
            .map(|i| i.quantity)
            .sum());
        ensure_available(product, selected, in_cart, request.quantity)?;

        let price = effective_price(product, selected);
        let cart = carts.entry(session.to_string()).or_insert_with(|| Cart::new(session, &price.currency));
        let line_id = cart.add_item(CartItem::new(&product.id, reference, &product.name, request.quantity, price.unit_price()))?;
        info!(session, product_id = %product.id, line_id = %line_id, quantity = request.quantity, "item added to cart");
        Ok(cart.clone())
    }

    async fn update_line_quantity(&self, session: &str, line_id: &str, quantity: u32) -> Result<Cart, BackendError> {
        let mut state = self.state.write().await;
        let State { products, carts, .. } = &mut *state;
        let cart = carts.get_mut(session).ok_or_else(|| BackendError::CartNotFound(session.to_string()))?;
        if quantity > 0 {
            let line = cart.item(line_id).ok_or_else(|| CartError::ItemNotFound(line_id.to_string()))?;
            match products.iter().find(|p| p.id == line.product_id) {
                Some(product) => {
                    let selected = line_selection(product, &line.reference);
                    if let Some(available) = available_quantity(product, &selected) {
                        if quantity > available {
                            return Err(BackendError::InsufficientStock { available, requested: quantity });
                        }
                    }
                }
                None => warn!(session, product_id = %line.product_id, "cart line refers to an unknown product"),
            }
        }
        cart.update_quantity(line_id, quantity)?;
        info!(session, line_id, quantity, "cart line updated");
        Ok(cart.clone())
    }

    async fn remove_line(&self, session: &str, line_id: &str) -> Result<Cart, BackendError> {
        let mut state = self.state.write().await;
        let cart = state.carts.get_mut(session).ok_or_else(|| BackendError::CartNotFound(session.to_string()))?;
        cart.remove_item(line_id)?;
        info!(session, line_id, "cart line removed");
        Ok(cart.clone())
    }

    async fn clear_cart(&self, session: &str) -> Result<(), BackendError> {
        let mut state = self.state.write().await;
        match state.carts.remove(session) {
            Some(_) => info!(session, "cart cleared"),
            None => debug!(session, "no cart to clear"),
        }
        Ok(())
    }

    async fn checkout_from_cart(&self, session: &str) -> Result<Checkout, BackendError> {
        let mut state = self.state.write().await;
        let cart = state.carts.get(session).ok_or_else(|| BackendError::CartNotFound(session.to_string()))?;
        if cart.is_empty() { return Err(BackendError::EmptyCart(session.to_string())); }
        let checkout = Checkout::new(Some(session.to_string()), cart.items().to_vec(), cart.currency(), &self.checkout_base_url);
        info!(session, checkout_id = %checkout.id, lines = checkout.items.len(), "checkout created from cart");
        state.checkouts.insert(checkout.id.clone(), checkout.clone());
        Ok(checkout)
    }

    async fn quick_buy(&self, request: ItemRequest) -> Result<Checkout, BackendError> {
        let mut state = self.state.write().await;
        let selected = &request.selected_options;
        let (product, reference) = resolve_item(&state.products, &request.product_id, selected)?;
        ensure_available(product, selected, 0, request.quantity)?;

        let price = effective_price(product, selected);
        let line = CartItem::new(&product.id, reference, &product.name, request.quantity, price.unit_price());
        let checkout = Checkout::new(None, vec![line], &price.currency, &self.checkout_base_url);
        info!(product_id = %product.id, checkout_id = %checkout.id, quantity = request.quantity, "quick buy checkout created");
        state.checkouts.insert(checkout.id.clone(), checkout.clone());
        Ok(checkout)
    }

    async fn order(&self, id: &str) -> Result<Option<Order>, BackendError> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn request_back_in_stock(&self, request: BackInStockSubscription) -> Result<BackInStockRequest, BackendError> {
        let mut state = self.state.write().await;
        let selected = &request.selected_options;
        let (product, reference) = resolve_item(&state.products, &request.product_id, selected)?;
        if check_in_stock(product, selected) {
            return Err(BackendError::AlreadyInStock { product_id: product.id.clone() });
        }
        let subscription = BackInStockRequest::new(&product.id, reference, &request.email, request.item_url);
        if state.notifications.iter().any(|n| n.duplicates(&subscription)) {
            return Err(BackendError::AlreadySubscribed);
        }
        info!(product_id = %subscription.product_id, request_id = %subscription.id, "back-in-stock notification requested");
        state.notifications.push(subscription.clone());
        Ok(subscription)
    }
}
