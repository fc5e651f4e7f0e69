//! Collection projection

use serde::{Deserialize, Serialize};

/// Backend system collection holding every product.
pub const ALL_PRODUCTS_COLLECTION_ID: &str = "00000000-000000-000000-000000000001";
/// Backend system collection behind the "featured" home page row.
pub const FEATURED_COLLECTION_ID: &str = "c68b4e3b-df48-6b25-32a8-f21c4610583f";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Collection {
    pub fn new(id: impl Into<String>, slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), slug: slug.into(), name: name.into(), description: None, image_url: None }
    }

    /// System collections are not listed as browsable categories.
    pub fn is_system(&self) -> bool { self.id == ALL_PRODUCTS_COLLECTION_ID || self.id == FEATURED_COLLECTION_ID }
}
