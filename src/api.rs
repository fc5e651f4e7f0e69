//! JSON HTTP API

use axum::{extract::{Path, Query, State}, http::StatusCode, response::{IntoResponse, Response}, routing::{get, post, put}, Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::Validate;

use crate::catalog::{BackInStockSubscription, BackendError, CommerceBackend, ItemRequest, ProductQuery, ProductSort};
use crate::domain::aggregates::{BackInStockRequest, Cart, CartError, Checkout, Collection, Order, Product, SelectedOptions};
use crate::domain::resolver::{self, ProductAvailability};
use crate::{Result, StorefrontError};

#[derive(Clone)]
pub struct AppState<B> {
    pub backend: B,
    pub page_size: usize,
    /// Public storefront origin, used for links sent out of band.
    pub base_url: String,
}

pub fn router<B: CommerceBackend>(state: AppState<B>) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront"})) }))
        .route("/api/v1/products", get(list_products::<B>))
        .route("/api/v1/products/:slug", get(get_product::<B>))
        .route("/api/v1/products/:slug/availability", post(product_availability::<B>))
        .route("/api/v1/products/:slug/back-in-stock", post(back_in_stock::<B>))
        .route("/api/v1/collections", get(list_collections::<B>))
        .route("/api/v1/collections/:slug", get(get_collection::<B>))
        .route("/api/v1/collections/:slug/products", get(collection_products::<B>))
        .route("/api/v1/cart/:session", get(get_cart::<B>).post(add_to_cart::<B>).delete(clear_cart::<B>))
        .route("/api/v1/cart/:session/items/:line_id", put(update_line::<B>).delete(remove_line::<B>))
        .route("/api/v1/cart/:session/checkout", post(checkout_cart::<B>))
        .route("/api/v1/checkout/quick-buy", post(quick_buy::<B>))
        .route("/api/v1/checkout/success", post(checkout_success::<B>))
        .route("/api/v1/orders/:id", get(get_order::<B>))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) | Self::PageOutOfRange { .. } => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Backend(e) => match e {
                BackendError::ProductNotFound(_) | BackendError::CartNotFound(_) | BackendError::CheckoutNotFound(_)
                | BackendError::Cart(CartError::ItemNotFound(_)) => StatusCode::NOT_FOUND,
                BackendError::OutOfStock { .. } | BackendError::InsufficientStock { .. } | BackendError::AlreadyInStock { .. }
                | BackendError::AlreadySubscribed | BackendError::Cart(CartError::CurrencyMismatch { .. }) => StatusCode::CONFLICT,
                BackendError::InvalidQuantity | BackendError::IncompleteSelection { .. } | BackendError::EmptyCart(_) => StatusCode::UNPROCESSABLE_ENTITY,
                BackendError::CatalogIo(_) | BackendError::CatalogParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };
        if status.is_server_error() { tracing::error!(error = %self, "request failed"); }
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

/// Listing query string, e.g. `?q=tee&page=2&collection=a,b&price_min=10&sort=price_asc`.
#[derive(Debug, Default, Deserialize)]
pub struct ShopParams {
    pub q: Option<String>,
    pub page: Option<u32>,
    /// Comma-separated collection ids
    pub collection: Option<String>,
    pub price_min: Option<u32>,
    pub price_max: Option<u32>,
    pub sort: Option<String>,
}

impl ShopParams {
    fn page(&self) -> u32 { self.page.unwrap_or(1).max(1) }

    fn to_query(&self, page_size: usize) -> ProductQuery {
        ProductQuery {
            q: self.q.clone().filter(|q| !q.trim().is_empty()),
            collection_ids: self.collection.as_deref().map(|c| c.split(',').map(str::trim).filter(|c| !c.is_empty()).map(String::from).collect()).unwrap_or_default(),
            sort: self.sort.as_deref().map(ProductSort::parse).unwrap_or_default(),
            price_min: self.price_min.map(Decimal::from),
            price_max: self.price_max.map(Decimal::from),
            skip: (self.page() as usize - 1) * page_size,
            limit: page_size,
        }
    }
}

#[derive(Debug, Serialize)] pub struct PaginatedResponse<T> { pub data: Vec<T>, pub total: usize, pub page: u32, pub total_pages: usize }

async fn run_listing<B: CommerceBackend>(s: &AppState<B>, p: &ShopParams, query: ProductQuery) -> Result<Json<PaginatedResponse<Product>>> {
    let page = p.page();
    let found = s.backend.query_products(&query).await?;
    if page as usize > found.total_pages {
        return Err(StorefrontError::PageOutOfRange { page, total_pages: found.total_pages });
    }
    Ok(Json(PaginatedResponse { data: found.items, total: found.total_count, page, total_pages: found.total_pages }))
}

async fn list_products<B: CommerceBackend>(State(s): State<AppState<B>>, Query(p): Query<ShopParams>) -> Result<Json<PaginatedResponse<Product>>> {
    let query = p.to_query(s.page_size);
    run_listing(&s, &p, query).await
}

async fn get_product<B: CommerceBackend>(State(s): State<AppState<B>>, Path(slug): Path<String>) -> Result<Json<Product>> {
    s.backend.product_by_slug(&slug).await?.map(Json).ok_or(StorefrontError::NotFound(format!("product {slug}")))
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AvailabilityRequest {
    /// Overrides applied on top of each option's first choice.
    #[serde(default)]
    pub selected_options: SelectedOptions,
    #[validate(range(min = 1, max = 9999))]
    pub quantity: Option<u32>,
}

async fn product_availability<B: CommerceBackend>(State(s): State<AppState<B>>, Path(slug): Path<String>, Json(r): Json<AvailabilityRequest>) -> Result<Json<ProductAvailability>> {
    r.validate()?;
    let product = s.backend.product_by_slug(&slug).await?.ok_or_else(|| StorefrontError::NotFound(format!("product {slug}")))?;
    let mut selected = resolver::default_selection(&product);
    selected.extend(r.selected_options);
    Ok(Json(resolver::resolve(&product, selected, r.quantity.unwrap_or(1))))
}

async fn list_collections<B: CommerceBackend>(State(s): State<AppState<B>>) -> Result<Json<Vec<Collection>>> {
    Ok(Json(s.backend.collections().await?))
}

async fn get_collection<B: CommerceBackend>(State(s): State<AppState<B>>, Path(slug): Path<String>) -> Result<Json<Collection>> {
    s.backend.collection_by_slug(&slug).await?.map(Json).ok_or(StorefrontError::NotFound(format!("collection {slug}")))
}

async fn collection_products<B: CommerceBackend>(State(s): State<AppState<B>>, Path(slug): Path<String>, Query(p): Query<ShopParams>) -> Result<Json<PaginatedResponse<Product>>> {
    let collection = s.backend.collection_by_slug(&slug).await?.ok_or_else(|| StorefrontError::NotFound(format!("collection {slug}")))?;
    let mut query = p.to_query(s.page_size);
    query.collection_ids = vec![collection.id];
    run_listing(&s, &p, query).await
}

async fn get_cart<B: CommerceBackend>(State(s): State<AppState<B>>, Path(session): Path<String>) -> Result<Json<Option<Cart>>> {
    Ok(Json(s.backend.cart(&session).await?))
}

/// Body shared by add-to-cart and quick buy. Every option must be chosen.
#[derive(Debug, Deserialize, Validate)]
pub struct ItemRequestBody {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[serde(default)]
    pub selected_options: SelectedOptions,
    #[validate(range(min = 1, max = 9999))]
    pub quantity: u32,
}

impl From<ItemRequestBody> for ItemRequest {
    fn from(r: ItemRequestBody) -> Self {
        Self { product_id: r.product_id, selected_options: r.selected_options, quantity: r.quantity }
    }
}

async fn add_to_cart<B: CommerceBackend>(State(s): State<AppState<B>>, Path(session): Path<String>, Json(r): Json<ItemRequestBody>) -> Result<(StatusCode, Json<Cart>)> {
    r.validate()?;
    let cart = s.backend.add_to_cart(&session, r.into()).await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

async fn clear_cart<B: CommerceBackend>(State(s): State<AppState<B>>, Path(session): Path<String>) -> Result<StatusCode> {
    s.backend.clear_cart(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(range(max = 9999))]
    pub quantity: u32,
}

async fn update_line<B: CommerceBackend>(State(s): State<AppState<B>>, Path((session, line_id)): Path<(String, String)>, Json(r): Json<UpdateQuantityRequest>) -> Result<Json<Cart>> {
    r.validate()?;
    Ok(Json(s.backend.update_line_quantity(&session, &line_id, r.quantity).await?))
}

async fn remove_line<B: CommerceBackend>(State(s): State<AppState<B>>, Path((session, line_id)): Path<(String, String)>) -> Result<Json<Cart>> {
    Ok(Json(s.backend.remove_line(&session, &line_id).await?))
}

async fn checkout_cart<B: CommerceBackend>(State(s): State<AppState<B>>, Path(session): Path<String>) -> Result<(StatusCode, Json<Checkout>)> {
    Ok((StatusCode::CREATED, Json(s.backend.checkout_from_cart(&session).await?)))
}

async fn quick_buy<B: CommerceBackend>(State(s): State<AppState<B>>, Json(r): Json<ItemRequestBody>) -> Result<(StatusCode, Json<Checkout>)> {
    r.validate()?;
    Ok((StatusCode::CREATED, Json(s.backend.quick_buy(r.into()).await?)))
}

async fn get_order<B: CommerceBackend>(State(s): State<AppState<B>>, Path(id): Path<String>) -> Result<Json<Order>> {
    s.backend.order(&id).await?.map(Json).ok_or(StorefrontError::NotFound(format!("order {id}")))
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSuccessRequest {
    pub order_id: String,
    /// Cart session the shopper checked out from, if any.
    pub session: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutSuccess { pub order: Order, pub cart_cleared: bool }

/// Landing after the hosted checkout. The cart is only cleared for a freshly
/// placed order, so revisiting an old confirmation leaves a new cart intact.
async fn checkout_success<B: CommerceBackend>(State(s): State<AppState<B>>, Json(r): Json<CheckoutSuccessRequest>) -> Result<Json<CheckoutSuccess>> {
    let order = s.backend.order(&r.order_id).await?.ok_or_else(|| StorefrontError::NotFound(format!("order {}", r.order_id)))?;
    let cart_cleared = match r.session.as_deref() {
        Some(session) if order.is_recent(Utc::now()) => {
            s.backend.clear_cart(session).await?;
            true
        }
        _ => false,
    };
    Ok(Json(CheckoutSuccess { order, cart_cleared }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct BackInStockBody {
    #[serde(default)]
    pub selected_options: SelectedOptions,
    #[validate(email)]
    pub email: String,
}

async fn back_in_stock<B: CommerceBackend>(State(s): State<AppState<B>>, Path(slug): Path<String>, Json(r): Json<BackInStockBody>) -> Result<(StatusCode, Json<BackInStockRequest>)> {
    r.validate()?;
    let product = s.backend.product_by_slug(&slug).await?.ok_or_else(|| StorefrontError::NotFound(format!("product {slug}")))?;
    let request = BackInStockSubscription {
        product_id: product.id,
        selected_options: r.selected_options,
        email: r.email,
        item_url: format!("{}/products/{slug}", s.base_url.trim_end_matches('/')),
    };
    Ok((StatusCode::CREATED, Json(s.backend.request_back_in_stock(request).await?)))
}
