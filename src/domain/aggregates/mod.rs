//! Aggregates module
pub mod product;
pub mod collection;
pub mod cart;
pub mod order;
pub mod notification;

pub use product::{Choice, MediaItem, OptionType, Product, ProductOption, SelectedOptions, Variant};
pub use collection::Collection;
pub use cart::{Cart, CartError, CartItem, CatalogReference};
pub use order::{Checkout, Order, OrderStatus};
pub use notification::BackInStockRequest;
