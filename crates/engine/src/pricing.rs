//! Price calculation.
//!
//! Combines the base or variant price, paid add-ons and the discount stack
//! into a display price and a strike-through "original" price. Amounts stay
//! unrounded `Decimal`s; formatting happens later through
//! [`Price::display`](optionset_core::Price::display).

use optionset_core::{DiscountId, Price};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{Addon, Product, Variant};
use crate::discount::Discount;

/// Computed prices for the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceQuote {
    /// Strike-through price; never below `display`.
    pub original: Price,
    /// Price the customer pays.
    pub display: Price,
    /// Discount the display price came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_discount: Option<DiscountId>,
}

impl PriceQuote {
    /// Whether the UI should show `original` struck through.
    #[must_use]
    pub fn has_strike_through(&self) -> bool {
        self.original.amount > self.display.amount
    }
}

/// Cheapest and dearest variant price, shown while no variant is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: Price,
    pub max: Price,
}

impl PriceRange {
    /// Whether every variant costs the same.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.min.amount == self.max.amount
    }
}

/// Variant price span with the selected add-ons on top.
///
/// Discounts are not applied; they are fetched per resolved variant.
#[must_use]
pub fn price_range<'a>(product: &Product, addons: impl IntoIterator<Item = &'a Addon>) -> PriceRange {
    let addons_total: Decimal = addons.into_iter().map(|a| a.price).sum();
    let (min, max) = product.price_range();
    PriceRange {
        min: Price::new(min + addons_total, product.currency_code),
        max: Price::new(max + addons_total, product.currency_code),
    }
}

/// Compute the original and display prices.
///
/// With a non-empty discount stack the last discount is authoritative and
/// add-ons are added on top of its discounted price. A discount that would
/// push the display price above the original, or below zero, is discarded
/// with a warning and the undiscounted path is used instead.
///
/// Without discounts the compare-at price becomes the original, unless it is
/// lower than the display price.
#[must_use]
pub fn compute_price<'a>(
    product: &Product,
    variant: Option<&Variant>,
    addons: impl IntoIterator<Item = &'a Addon>,
    discounts: &[Discount],
) -> PriceQuote {
    let currency = product.currency_code;
    let base = variant.map_or(product.price, |v| v.effective_price(product));
    let addons_total: Decimal = addons.into_iter().map(|a| a.price).sum();
    let current = base + addons_total;

    if let Some(discount) = discounts.last() {
        let discounted = discount.discounted_price + addons_total;
        let undiscounted = current;

        if discounted <= undiscounted && discounted >= Decimal::ZERO {
            return PriceQuote {
                original: Price::new(undiscounted, currency),
                display: Price::new(discounted, currency),
                applied_discount: Some(discount.id.clone()),
            };
        }

        warn!(
            product_id = %product.id,
            discount_id = %discount.id,
            %discounted,
            %undiscounted,
            "Discarding discount that violates display <= original"
        );
    }

    let original = match product.compare_price {
        Some(compare) if compare >= current => compare,
        Some(compare) => {
            debug!(
                product_id = %product.id,
                %compare,
                %current,
                "Compare-at price below current price; ignoring"
            );
            current
        }
        None => current,
    };

    PriceQuote {
        original: Price::new(original, currency),
        display: Price::new(current, currency),
        applied_discount: None,
    }
}
