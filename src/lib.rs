//! Storefront
//!
//! Storefront service composed against a headless commerce backend.
//! The backend owns every piece of persistent state; this crate shapes
//! requests to it and answers the questions a product page asks.
//!
//! ## Features
//! - Product browsing with search, collection, price filters and sorting
//! - Variant resolution and in-stock computation for option selections
//! - Session carts keyed by variant or raw option selection
//! - Checkout hand-off (cart or quick buy) and order lookup
//! - Back-in-stock notification requests
//! - JSON HTTP API over an injected backend handle

pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;

use thiserror::Error;

pub use catalog::{BackendError, CommerceBackend, InMemoryBackend};
pub use domain::aggregates::{Cart, Product, SelectedOptions, Variant};
pub use domain::resolver::{available_quantity, check_in_stock, find_variant};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{0} not found")]
    NotFound(String),

    #[error("page {page} is beyond the last page ({total_pages})")]
    PageOutOfRange { page: u32, total_pages: usize },
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
