//! Product projection
//!
//! Read-only view of a catalog record as the commerce backend returns it.
//! Field names follow the backend's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::domain::value_objects::{PriceData, Stock};

/// Option name to choice description.
pub type SelectedOptions = BTreeMap<String, String>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub ribbon: Option<String>,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    #[serde(default)]
    pub collection_ids: Vec<String>,
    #[serde(default)]
    pub product_options: Vec<ProductOption>,
    #[serde(default)]
    pub manages_variants: bool,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub stock: Stock,
    pub price_data: PriceData,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default = "Utc::now")]
    pub last_updated: DateTime<Utc>,
}

fn visible_by_default() -> bool { true }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Color,
    #[default]
    DropDown,
    #[serde(other)]
    Unspecified,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub name: String,
    #[serde(default)]
    pub option_type: OptionType,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Shown to the shopper and used as the join key against variant choices.
    pub description: String,
    /// CSS color for `OptionType::Color` swatches.
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default = "visible_by_default")]
    pub in_stock: bool,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub choices: SelectedOptions,
    #[serde(default)]
    pub stock: Stock,
    #[serde(default)]
    pub price_data: Option<PriceData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
}

impl Product {
    pub fn new(id: impl Into<String>, slug: impl Into<String>, name: impl Into<String>, price_data: PriceData) -> Self {
        Self {
            id: id.into(), slug: slug.into(), name: name.into(), description: None, brand: None, ribbon: None,
            visible: true, collection_ids: vec![], product_options: vec![], manages_variants: false,
            variants: vec![], stock: Stock::default(), price_data, media: vec![], last_updated: Utc::now(),
        }
    }

    pub fn with_stock(mut self, stock: Stock) -> Self { self.stock = stock; self }

    pub fn with_option(mut self, option: ProductOption) -> Self { self.product_options.push(option); self }

    /// Adds a variant and switches the product to variant-managed stock.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.manages_variants = true;
        self.variants.push(variant);
        self
    }

    pub fn in_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_ids.push(collection_id.into());
        self
    }

    pub fn option(&self, name: &str) -> Option<&ProductOption> { self.product_options.iter().find(|o| o.name == name) }
}

impl ProductOption {
    pub fn new<I, S>(name: impl Into<String>, option_type: OptionType, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { name: name.into(), option_type, choices: choices.into_iter().map(Choice::new).collect() }
    }

    pub fn choice(&self, description: &str) -> Option<&Choice> { self.choices.iter().find(|c| c.description == description) }
}

impl Choice {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), value: None, media: vec![], in_stock: true, visible: true }
    }
}

impl Variant {
    pub fn new<I, K, V>(id: impl Into<String>, choices: I, stock: Stock) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: id.into(),
            choices: choices.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
            stock,
            price_data: None,
        }
    }

    pub fn with_price(mut self, price_data: PriceData) -> Self { self.price_data = Some(price_data); self }

    /// Every entry of `selected` is present in this variant with the same description.
    pub fn satisfies(&self, selected: &SelectedOptions) -> bool {
        selected.iter().all(|(name, description)| self.choices.get(name) == Some(description))
    }
}
