//! Back-in-stock notification requests

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use crate::domain::aggregates::cart::CatalogReference;

/// A shopper asking to be emailed when an out-of-stock selection returns.
#[derive(Clone, Debug, Serialize)]
pub struct BackInStockRequest {
    pub id: String,
    pub product_id: String,
    pub reference: CatalogReference,
    pub email: String,
    /// Product page the notification email links back to.
    pub item_url: String,
    pub created_at: DateTime<Utc>,
}

impl BackInStockRequest {
    pub fn new(product_id: impl Into<String>, reference: CatalogReference, email: &str, item_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(), product_id: product_id.into(), reference,
            email: email.trim().to_lowercase(), item_url: item_url.into(), created_at: Utc::now(),
        }
    }

    /// Same shopper, same purchasable item.
    pub fn duplicates(&self, other: &BackInStockRequest) -> bool {
        self.email == other.email && self.product_id == other.product_id && self.reference == other.reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_ignore_email_case() {
        let v = CatalogReference::Variant { variant_id: "v".into() };
        let a = BackInStockRequest::new("p", v.clone(), "Ann@Example.com ", "https://shop/products/tee");
        let b = BackInStockRequest::new("p", v.clone(), "ann@example.com", "https://shop/products/tee");
        assert_eq!(a.email, "ann@example.com");
        assert!(a.duplicates(&b));
        let c = BackInStockRequest::new("p", CatalogReference::Variant { variant_id: "w".into() }, "ann@example.com", "");
        assert!(!a.duplicates(&c));
    }
}
