//! Purchasability state machine.
//!
//! Reduces resolution and stock into a [`PurchasabilityState`]. There is no
//! stored state: [`evaluate`] is recomputed from scratch after every
//! selection change.

use optionset_core::PurchasabilityState;
use tracing::warn;

use crate::catalog::{Product, Variant};
use crate::resolver::resolve;
use crate::selection::SelectionState;

/// Outcome of [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchasability<'a> {
    pub state: PurchasabilityState,
    /// The variant a purchase would add, if the catalog has one.
    pub variant: Option<&'a Variant>,
}

impl<'a> Purchasability<'a> {
    const fn new(state: PurchasabilityState, variant: Option<&'a Variant>) -> Self {
        Self { state, variant }
    }

    const fn stocked(allows: bool, variant: Option<&'a Variant>) -> Self {
        let state = if allows {
            PurchasabilityState::Available
        } else {
            PurchasabilityState::OutOfStockWaitlist
        };
        Self::new(state, variant)
    }
}

/// Decide whether the current selection can be bought.
///
/// - Products without options are sold as their slotless variant if the
///   catalog has one, otherwise on product-level stock.
/// - An incomplete selection needs more input.
/// - An empty catalog is treated as one implicit variant on product-level
///   stock.
/// - A resolved variant is available when the stock policy allows it, and
///   offers the waitlist otherwise.
/// - A complete selection that resolves to nothing is dangling data. It
///   stays purchasable at the product price when selling without stock, and
///   needs a different selection otherwise.
#[must_use]
pub fn evaluate<'a>(product: &'a Product, selection: &SelectionState) -> Purchasability<'a> {
    if !product.has_options() {
        let variant = product.variants.iter().find(|v| v.slots.is_empty());
        let allows = variant.map_or_else(
            || product.product_stock_allows(),
            |v| product.stock_allows(v),
        );
        return Purchasability::stocked(allows, variant);
    }

    if !selection.is_complete(product) {
        return Purchasability::new(PurchasabilityState::NeedsSelection, None);
    }

    if product.variants.is_empty() {
        return Purchasability::stocked(product.product_stock_allows(), None);
    }

    if let Some(variant) = resolve(selection, product) {
        return Purchasability::stocked(product.stock_allows(variant), Some(variant));
    }

    if product.sell_without_stock {
        warn!(
            product_id = %product.id,
            ?selection,
            "Complete selection matches no variant; selling at product price"
        );
        Purchasability::new(PurchasabilityState::Available, None)
    } else {
        warn!(
            product_id = %product.id,
            ?selection,
            "Complete selection matches no variant"
        );
        Purchasability::new(PurchasabilityState::NeedsSelection, None)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use optionset_core::{OptionId, ValueId};
    use serde_json::json;

    use super::*;

    fn product() -> Product {
        serde_json::from_value(json!({
            "id": "tee",
            "price": "20",
            "options": [
                { "id": "color", "name": "Color", "values": [
                    { "id": "red", "label": "Red" },
                    { "id": "blue", "label": "Blue" }
                ]},
                { "id": "size", "name": "Size", "values": [
                    { "id": "s", "label": "S" },
                    { "id": "m", "label": "M" }
                ]}
            ],
            "variants": [
                { "id": "red-s", "slots": [
                    { "option_id": "color", "value_id": "red" },
                    { "option_id": "size", "value_id": "s" }
                ], "inventory_quantity": 5 },
                { "id": "red-m", "slots": [
                    { "option_id": "color", "value_id": "red" },
                    { "option_id": "size", "value_id": "m" }
                ], "inventory_quantity": 0 }
            ]
        }))
        .unwrap()
    }

    fn select(product: &Product, color: &str, size: Option<&str>) -> SelectionState {
        let mut selection = SelectionState::new();
        selection
            .select(product, OptionId::new("color"), ValueId::new(color))
            .unwrap();
        if let Some(size) = size {
            selection
                .select(product, OptionId::new("size"), ValueId::new(size))
                .unwrap();
        }
        selection
    }

    #[test]
    fn test_incomplete_selection_needs_selection() {
        let product = product();
        let outcome = evaluate(&product, &select(&product, "red", None));
        assert_eq!(outcome.state, PurchasabilityState::NeedsSelection);
        assert!(outcome.variant.is_none());
    }

    #[test]
    fn test_resolved_variant_follows_stock() {
        let product = product();

        let available = evaluate(&product, &select(&product, "red", Some("s")));
        assert_eq!(available.state, PurchasabilityState::Available);
        assert_eq!(available.variant.unwrap().id.as_str(), "red-s");

        let waitlist = evaluate(&product, &select(&product, "red", Some("m")));
        assert_eq!(waitlist.state, PurchasabilityState::OutOfStockWaitlist);
        assert_eq!(waitlist.variant.unwrap().id.as_str(), "red-m");
    }

    #[test]
    fn test_sell_without_stock() {
        let mut product = product();
        product.sell_without_stock = true;

        let outcome = evaluate(&product, &select(&product, "red", Some("m")));
        assert_eq!(outcome.state, PurchasabilityState::Available);
        assert!(outcome.variant.is_some());
    }

    #[test]
    fn test_dangling_complete_selection() {
        let mut product = product();
        let selection = select(&product, "blue", Some("s"));

        let outcome = evaluate(&product, &selection);
        assert_eq!(outcome.state, PurchasabilityState::NeedsSelection);

        product.sell_without_stock = true;
        let outcome = evaluate(&product, &selection);
        assert_eq!(outcome.state, PurchasabilityState::Available);
        assert!(outcome.variant.is_none());
    }

    #[test]
    fn test_empty_catalog_uses_product_stock() {
        let mut product = product();
        product.variants.clear();
        let selection = select(&product, "blue", Some("s"));

        assert_eq!(evaluate(&product, &selection).state, PurchasabilityState::Available);
        product.inventory_quantity = Some(0);
        assert_eq!(
            evaluate(&product, &selection).state,
            PurchasabilityState::OutOfStockWaitlist
        );
    }

    #[test]
    fn test_product_without_options() {
        let mut product: Product = serde_json::from_value(json!({
            "id": "mug",
            "price": "12",
            "inventory_quantity": 0
        }))
        .unwrap();
        let empty = SelectionState::new();
        assert_eq!(
            evaluate(&product, &empty).state,
            PurchasabilityState::OutOfStockWaitlist
        );

        product.variants = serde_json::from_value(json!([
            { "id": "mug-default", "inventory_quantity": 7 }
        ]))
        .unwrap();
        let outcome = evaluate(&product, &empty);
        assert_eq!(outcome.state, PurchasabilityState::Available);
        assert_eq!(outcome.variant.unwrap().id.as_str(), "mug-default");
    }
}
