//! Storefront domain: catalog projections, cart, variant resolution
pub mod aggregates;
pub mod resolver;
pub mod value_objects;
