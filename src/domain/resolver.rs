//! Variant resolution and purchasability
//!
//! Pure functions over an already fetched [`Product`]. Nothing here performs
//! I/O or returns an error: unknown option names, partial selections and
//! missing stock data all fall through to "no variant" / "not purchasable".

use serde::Serialize;
use crate::domain::aggregates::product::{MediaItem, Product, SelectedOptions, Variant};
use crate::domain::value_objects::PriceData;

/// Below this many units the storefront shows an "only N left" notice.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Returns the first variant, in declared order, that satisfies every entry
/// of `selected`.
///
/// Products that don't manage variants never resolve one. A partial
/// selection can satisfy several variants; the first declared wins.
pub fn find_variant<'a>(product: &'a Product, selected: &SelectedOptions) -> Option<&'a Variant> {
    if !product.manages_variants { return None; }
    product.variants.iter().find(|v| v.satisfies(selected))
}

/// Whether `selected` can currently be purchased.
///
/// A resolved variant needs `inStock` and a quantity that is unset or
/// non-zero. Otherwise the product-level inventory status decides.
pub fn check_in_stock(product: &Product, selected: &SelectedOptions) -> bool {
    match find_variant(product, selected) {
        Some(variant) => variant.stock.quantity != Some(0) && variant.stock.in_stock,
        None => product.stock.inventory_status.is_purchasable(),
    }
}

/// Quantity to display for `selected`; `None` means unlimited.
pub fn available_quantity(product: &Product, selected: &SelectedOptions) -> Option<u32> {
    find_variant(product, selected)
        .and_then(|v| v.stock.quantity)
        .or(product.stock.quantity)
}

/// Options the selection leaves unnamed, or names with a description the
/// option does not offer. Empty when the selection is complete.
pub fn unresolved_options<'a>(product: &'a Product, selected: &SelectedOptions) -> Vec<&'a str> {
    product.product_options.iter()
        .filter(|o| selected.get(&o.name).and_then(|d| o.choice(d)).is_none())
        .map(|o| o.name.as_str())
        .collect()
}

/// First declared choice of every option.
pub fn default_selection(product: &Product) -> SelectedOptions {
    product.product_options.iter()
        .filter_map(|o| o.choices.first().map(|c| (o.name.clone(), c.description.clone())))
        .collect()
}

/// Price of the resolved variant, falling back to the product price.
pub fn effective_price<'a>(product: &'a Product, selected: &SelectedOptions) -> &'a PriceData {
    find_variant(product, selected)
        .and_then(|v| v.price_data.as_ref())
        .unwrap_or(&product.price_data)
}

/// Media of the selected choices in option order, or the product media when
/// none of them carry any.
pub fn selected_media<'a>(product: &'a Product, selected: &SelectedOptions) -> Vec<&'a MediaItem> {
    let media: Vec<&MediaItem> = product.product_options.iter()
        .filter_map(|o| selected.get(&o.name).and_then(|d| o.choice(d)))
        .flat_map(|c| c.media.iter())
        .collect();
    if media.is_empty() { product.media.iter().collect() } else { media }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuantityCheck {
    pub requested: u32,
    pub available: Option<u32>,
    pub exceeded: bool,
    pub low_stock: bool,
}

/// Compares a requested purchase quantity against [`available_quantity`].
///
/// A declared quantity of zero is treated like no quantity here; the
/// in-stock flag already covers it.
pub fn check_quantity(product: &Product, selected: &SelectedOptions, requested: u32) -> QuantityCheck {
    let available = available_quantity(product, selected);
    let limit = available.filter(|q| *q > 0);
    let exceeded = limit.is_some_and(|q| requested > q);
    QuantityCheck {
        requested,
        available,
        exceeded,
        low_stock: limit.is_some_and(|q| exceeded || q < LOW_STOCK_THRESHOLD),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChoiceAvailability {
    pub description: String,
    pub selected: bool,
    pub in_stock: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptionAvailability {
    pub name: String,
    pub choices: Vec<ChoiceAvailability>,
}

/// For every choice, whether switching the current selection to it would be
/// purchasable.
pub fn choice_availability(product: &Product, selected: &SelectedOptions) -> Vec<OptionAvailability> {
    product.product_options.iter().map(|option| {
        let choices = option.choices.iter().map(|choice| {
            let mut candidate = selected.clone();
            candidate.insert(option.name.clone(), choice.description.clone());
            ChoiceAvailability {
                description: choice.description.clone(),
                selected: selected.get(&option.name) == Some(&choice.description),
                in_stock: check_in_stock(product, &candidate),
            }
        }).collect();
        OptionAvailability { name: option.name.clone(), choices }
    }).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PriceView {
    pub currency: String,
    pub formatted_price: String,
    pub formatted_discounted_price: String,
    pub has_discount: bool,
}

impl From<&PriceData> for PriceView {
    fn from(p: &PriceData) -> Self {
        Self {
            currency: p.currency.clone(),
            formatted_price: p.formatted_price(),
            formatted_discounted_price: p.formatted_discounted_price(),
            has_discount: p.has_discount(),
        }
    }
}

/// Everything a product page needs to render the purchase controls.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProductAvailability {
    pub product_id: String,
    pub selected_options: SelectedOptions,
    pub variant_id: Option<String>,
    pub in_stock: bool,
    pub quantity: QuantityCheck,
    pub price: PriceView,
    pub media: Vec<MediaItem>,
    pub options: Vec<OptionAvailability>,
}

pub fn resolve(product: &Product, selected: SelectedOptions, requested: u32) -> ProductAvailability {
    let variant = find_variant(product, &selected);
    ProductAvailability {
        product_id: product.id.clone(),
        variant_id: variant.map(|v| v.id.clone()),
        in_stock: check_in_stock(product, &selected),
        quantity: check_quantity(product, &selected, requested),
        price: effective_price(product, &selected).into(),
        media: selected_media(product, &selected).into_iter().cloned().collect(),
        options: choice_availability(product, &selected),
        selected_options: selected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::{Choice, OptionType, ProductOption};
    use crate::domain::value_objects::{InventoryStatus, Stock};
    use rust_decimal::Decimal;

    fn sel(pairs: &[(&str, &str)]) -> SelectedOptions {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn base(status: InventoryStatus) -> Product {
        Product::new("p1", "tee", "Tee", PriceData::new(Decimal::new(20, 0), "USD"))
            .with_stock(Stock::with_status(status))
    }

    fn sized() -> Product {
        base(InventoryStatus::InStock)
            .with_option(ProductOption::new("Size", OptionType::DropDown, ["S", "M", "L"]))
            .with_variant(Variant::new("v-s", [("Size", "S")], Stock { quantity: Some(0), in_stock: true, ..Stock::default() }))
            .with_variant(Variant::new("v-m", [("Size", "M")], Stock { quantity: Some(5), in_stock: true, ..Stock::default() }))
    }

    fn two_axis() -> Product {
        base(InventoryStatus::InStock)
            .with_option(ProductOption::new("Color", OptionType::Color, ["Red", "Blue"]))
            .with_option(ProductOption::new("Size", OptionType::DropDown, ["S", "M"]))
            .with_variant(Variant::new("red-s", [("Color", "Red"), ("Size", "S")], Stock::tracked(3)))
            .with_variant(Variant::new("red-m", [("Color", "Red"), ("Size", "M")], Stock::tracked(0)))
            .with_variant(Variant::new("blue-s", [("Color", "Blue"), ("Size", "S")], Stock::unlimited()))
            .with_variant(Variant::new("blue-m", [("Color", "Blue"), ("Size", "M")], Stock::tracked(12)))
    }

    #[test]
    fn test_unmanaged_product_never_resolves_variant() {
        let mut p = sized();
        p.manages_variants = false;
        assert!(find_variant(&p, &sel(&[("Size", "M")])).is_none());
        assert!(find_variant(&p, &sel(&[])).is_none());
        // product-level stock decides even though variant S has qty 0
        assert!(check_in_stock(&p, &sel(&[("Size", "S")])));
    }

    #[test]
    fn test_exact_match_returns_variant() {
        let p = two_axis();
        for v in &p.variants {
            assert_eq!(find_variant(&p, &v.choices).map(|f| f.id.as_str()), Some(v.id.as_str()));
        }
    }

    #[test]
    fn test_unknown_pair_resolves_nothing() {
        let p = two_axis();
        assert!(find_variant(&p, &sel(&[("Color", "Green"), ("Size", "S")])).is_none());
        assert!(find_variant(&p, &sel(&[("Color", "Red"), ("Material", "Wool")])).is_none());
    }

    #[test]
    fn test_partial_selection_takes_first_declared() {
        let p = two_axis();
        assert_eq!(find_variant(&p, &sel(&[("Color", "Red")])).map(|v| v.id.as_str()), Some("red-s"));
        assert_eq!(find_variant(&p, &sel(&[("Size", "M")])).map(|v| v.id.as_str()), Some("red-m"));
        assert_eq!(find_variant(&p, &sel(&[])).map(|v| v.id.as_str()), Some("red-s"));
    }

    #[test]
    fn test_zero_quantity_overrides_in_stock_flag() {
        let p = sized();
        assert!(!check_in_stock(&p, &sel(&[("Size", "S")])));
    }

    #[test]
    fn test_unset_quantity_is_unlimited() {
        let p = two_axis();
        assert!(check_in_stock(&p, &sel(&[("Color", "Blue"), ("Size", "S")])));
        assert_eq!(available_quantity(&p, &sel(&[("Color", "Blue"), ("Size", "S")])), None);
    }

    #[test]
    fn test_variant_flag_false_is_not_purchasable() {
        let p = base(InventoryStatus::InStock)
            .with_variant(Variant::new("v", [("Size", "S")], Stock { quantity: Some(4), in_stock: false, ..Stock::default() }));
        assert!(!check_in_stock(&p, &sel(&[("Size", "S")])));
    }

    #[test]
    fn test_product_level_statuses() {
        assert!(check_in_stock(&base(InventoryStatus::InStock), &sel(&[])));
        assert!(check_in_stock(&base(InventoryStatus::PartiallyOutOfStock), &sel(&[])));
        assert!(!check_in_stock(&base(InventoryStatus::OutOfStock), &sel(&[])));
        assert!(!check_in_stock(&base(InventoryStatus::Unknown), &sel(&[])));
    }

    #[test]
    fn test_size_scenario() {
        let p = sized();
        let s = sel(&[("Size", "S")]);
        assert_eq!(find_variant(&p, &s).map(|v| v.id.as_str()), Some("v-s"));
        assert!(!check_in_stock(&p, &s));

        let m = sel(&[("Size", "M")]);
        assert_eq!(find_variant(&p, &m).map(|v| v.id.as_str()), Some("v-m"));
        assert!(check_in_stock(&p, &m));

        let xl = sel(&[("Size", "XL")]);
        assert!(find_variant(&p, &xl).is_none());
        // falls back to product-level IN_STOCK
        assert!(check_in_stock(&p, &xl));
        let p = p.with_stock(Stock::with_status(InventoryStatus::OutOfStock));
        assert!(!check_in_stock(&p, &xl));
    }

    #[test]
    fn test_available_quantity_fallback() {
        let p = sized().with_stock(Stock { quantity: Some(40), ..Stock::with_status(InventoryStatus::InStock) });
        assert_eq!(available_quantity(&p, &sel(&[("Size", "M")])), Some(5));
        assert_eq!(available_quantity(&p, &sel(&[("Size", "XL")])), Some(40));
        assert_eq!(available_quantity(&base(InventoryStatus::InStock), &sel(&[])), None);
    }

    #[test]
    fn test_check_quantity() {
        let p = two_axis();
        let blue_m = sel(&[("Color", "Blue"), ("Size", "M")]);
        let q = check_quantity(&p, &blue_m, 2);
        assert_eq!(q.available, Some(12));
        assert!(!q.exceeded && !q.low_stock);
        let q = check_quantity(&p, &blue_m, 13);
        assert!(q.exceeded && q.low_stock);

        let red_s = sel(&[("Color", "Red"), ("Size", "S")]);
        let q = check_quantity(&p, &red_s, 1);
        assert!(!q.exceeded && q.low_stock);

        let red_m = sel(&[("Color", "Red"), ("Size", "M")]);
        let q = check_quantity(&p, &red_m, 5);
        assert_eq!(q.available, Some(0));
        assert!(!q.exceeded && !q.low_stock);
    }

    #[test]
    fn test_unresolved_options() {
        let p = two_axis();
        assert!(unresolved_options(&p, &sel(&[("Color", "Red"), ("Size", "M")])).is_empty());
        assert_eq!(unresolved_options(&p, &sel(&[("Size", "M")])), vec!["Color"]);
        assert_eq!(unresolved_options(&p, &sel(&[])), vec!["Color", "Size"]);
        assert_eq!(unresolved_options(&p, &sel(&[("Color", "Green"), ("Size", "M")])), vec!["Color"]);
        assert!(unresolved_options(&base(InventoryStatus::InStock), &sel(&[])).is_empty());
    }

    #[test]
    fn test_default_selection_skips_empty_options() {
        let p = two_axis().with_option(ProductOption::new("Engraving", OptionType::Unspecified, Vec::<String>::new()));
        assert_eq!(default_selection(&p), sel(&[("Color", "Red"), ("Size", "S")]));
    }

    #[test]
    fn test_effective_price_prefers_variant() {
        let p = base(InventoryStatus::InStock)
            .with_variant(Variant::new("big", [("Size", "L")], Stock::unlimited())
                .with_price(PriceData::new(Decimal::new(30, 0), "USD")))
            .with_variant(Variant::new("small", [("Size", "S")], Stock::unlimited()));
        assert_eq!(effective_price(&p, &sel(&[("Size", "L")])).price, Decimal::new(30, 0));
        assert_eq!(effective_price(&p, &sel(&[("Size", "S")])).price, Decimal::new(20, 0));
        assert_eq!(effective_price(&p, &sel(&[("Size", "XL")])).price, Decimal::new(20, 0));
    }

    #[test]
    fn test_selected_media() {
        let red = MediaItem { id: "m-red".into(), url: "https://cdn/red.jpg".into(), alt_text: None };
        let cover = MediaItem { id: "m-cover".into(), url: "https://cdn/cover.jpg".into(), alt_text: None };
        let mut p = two_axis();
        p.media.push(cover.clone());
        p.product_options[0].choices[0] = Choice { media: vec![red.clone()], ..Choice::new("Red") };

        assert_eq!(selected_media(&p, &sel(&[("Color", "Red"), ("Size", "S")])), vec![&red]);
        assert_eq!(selected_media(&p, &sel(&[("Color", "Blue"), ("Size", "S")])), vec![&cover]);
    }

    #[test]
    fn test_choice_availability() {
        let p = two_axis();
        let opts = choice_availability(&p, &sel(&[("Color", "Red"), ("Size", "S")]));
        let size = opts.iter().find(|o| o.name == "Size").unwrap();
        assert_eq!(size.choices.iter().map(|c| (c.description.as_str(), c.in_stock, c.selected)).collect::<Vec<_>>(),
            vec![("S", true, true), ("M", false, false)]);
        let color = opts.iter().find(|o| o.name == "Color").unwrap();
        assert!(color.choices.iter().all(|c| c.in_stock));
    }

    #[test]
    fn test_resolve_view() {
        let p = two_axis();
        let view = resolve(&p, sel(&[("Color", "Red"), ("Size", "M")]), 1);
        assert_eq!(view.variant_id.as_deref(), Some("red-m"));
        assert!(!view.in_stock);
        assert_eq!(view.price.formatted_price, "$20.00");
        assert_eq!(view.options.len(), 2);
    }
}
