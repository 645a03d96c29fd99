//! Option schema and variant catalog.
//!
//! These types mirror what the catalog service sends for a product page: an
//! ordered list of options (each with ordered values) and a flat list of
//! variants. They are immutable inputs to the engine; nothing here performs
//! I/O.
//!
//! Variants describe their dimensions as an ordered list of [`SlotBinding`]s
//! of arbitrary length. The legacy three-slot shape is translated at the
//! boundary by [`legacy`], and free-text slots can be bound to stable value
//! ids ahead of time with [`Product::normalize_slots`].

pub mod legacy;
mod matching;
mod normalize;

use std::collections::BTreeMap;

use optionset_core::{AddonId, CurrencyCode, OptionId, ProductId, ValueId, VariantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use matching::{MatchMode, names_match, normalize_match};
pub use normalize::{NormalizationReport, UnboundReason, UnboundSlot};

// =============================================================================
// Option Schema
// =============================================================================

/// Color or pattern metadata rendered as a swatch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Swatch {
    /// CSS color (e.g., `#ff0000`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Pattern image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// One concrete choice within an option (e.g., "Red").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionValue {
    /// Stable value ID.
    pub id: ValueId,
    /// Display text, also used for fuzzy matching against variant slots.
    pub label: String,
    /// Swatch metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swatch: Option<Swatch>,
}

/// Product option definition (e.g., "Size").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOption {
    /// Option ID.
    pub id: OptionId,
    /// Option name; the key variant slots are matched against.
    pub name: String,
    /// Available values, in merchant order.
    #[serde(default)]
    pub values: Vec<OptionValue>,
}

impl ProductOption {
    /// Look up a value by ID.
    #[must_use]
    pub fn value(&self, id: &ValueId) -> Option<&OptionValue> {
        self.values.iter().find(|v| &v.id == id)
    }

    /// Look up a value by ID or label (case-insensitive, trimmed).
    #[must_use]
    pub fn value_by_text(&self, text: &str) -> Option<&OptionValue> {
        self.values
            .iter()
            .find(|v| matching::exact_match(v, text))
    }
}

// =============================================================================
// Variant Catalog
// =============================================================================

/// One dimension of a variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotBinding {
    /// Direct reference into the product's option schema.
    Value {
        /// Owning option.
        option_id: OptionId,
        /// Chosen value.
        value_id: ValueId,
    },
    /// Free-text pair as entered by the merchant.
    Raw {
        /// Option name (matched against `ProductOption::name`).
        option_name: String,
        /// Value text (matched against `OptionValue` id and label).
        value: String,
    },
}

impl SlotBinding {
    /// Create a raw free-text slot.
    #[must_use]
    pub fn raw(option_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Raw {
            option_name: option_name.into(),
            value: value.into(),
        }
    }

    /// Create a slot bound to a value of the option schema.
    #[must_use]
    pub fn bound(option_id: impl Into<OptionId>, value_id: impl Into<ValueId>) -> Self {
        Self::Value {
            option_id: option_id.into(),
            value_id: value_id.into(),
        }
    }
}

/// A concrete sellable SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant ID.
    pub id: VariantId,
    /// Option dimensions, one per option for a fully specified variant.
    #[serde(default)]
    pub slots: Vec<SlotBinding>,
    /// Price override; falls back to the product price.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Units in stock (`None` = unlimited / not tracked).
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
    /// SKU code.
    #[serde(default)]
    pub sku: Option<String>,
}

impl Variant {
    /// Whether this variant has one slot per product option.
    #[must_use]
    pub fn is_fully_specified(&self, product: &Product) -> bool {
        self.slots.len() == product.options.len()
    }

    /// Whether stock permits a sale (untracked or positive quantity).
    #[must_use]
    pub fn has_stock(&self) -> bool {
        self.inventory_quantity.is_none_or(|qty| qty > 0)
    }

    /// Variant price, falling back to the product price.
    #[must_use]
    pub fn effective_price(&self, product: &Product) -> Decimal {
        self.price.unwrap_or(product.price)
    }

    /// Human-readable title built from slot labels (e.g., "Red / M").
    ///
    /// Bound slots use the schema label; raw slots use their text as-is.
    #[must_use]
    pub fn title(&self, product: &Product) -> String {
        self.slots
            .iter()
            .map(|slot| match slot {
                SlotBinding::Value {
                    option_id,
                    value_id,
                } => product
                    .value(option_id, value_id)
                    .map_or_else(|| value_id.to_string(), |v| v.label.clone()),
                SlotBinding::Raw { value, .. } => value.trim().to_string(),
            })
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

// =============================================================================
// Add-ons
// =============================================================================

/// A priced optional extra (gift wrap, engraving).
///
/// Add-ons contribute to the price but are never discounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    /// Add-on ID.
    pub id: AddonId,
    /// Display title.
    pub title: String,
    /// Price delta.
    pub price: Decimal,
}

// =============================================================================
// Product
// =============================================================================

/// A product as delivered by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Product title.
    #[serde(default)]
    pub title: String,
    /// Base price.
    pub price: Decimal,
    /// Compare-at price shown struck through when no discount applies.
    #[serde(default)]
    pub compare_price: Option<Decimal>,
    /// Currency of every amount on this product.
    #[serde(default)]
    pub currency_code: CurrencyCode,
    /// Keep selling when stock runs out.
    #[serde(default)]
    pub sell_without_stock: bool,
    /// Product-level stock, used when there is no variant catalog.
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
    /// Optional paid extras.
    #[serde(default)]
    pub addons: Vec<Addon>,
    /// Option schema.
    #[serde(default)]
    pub options: Vec<ProductOption>,
    /// Variant catalog.
    #[serde(default)]
    pub variants: Vec<Variant>,
    /// Merchant-configured initial selection.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_selection: BTreeMap<OptionId, ValueId>,
}

impl Product {
    /// Whether the product is configured through options at all.
    #[must_use]
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// Look up an option by ID.
    #[must_use]
    pub fn option(&self, id: &OptionId) -> Option<&ProductOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    /// Look up an option by name (case-insensitive, trimmed).
    #[must_use]
    pub fn option_by_name(&self, name: &str) -> Option<&ProductOption> {
        self.options.iter().find(|o| names_match(&o.name, name))
    }

    /// Look up a value under its owning option.
    #[must_use]
    pub fn value(&self, option: &OptionId, value: &ValueId) -> Option<&OptionValue> {
        self.option(option).and_then(|o| o.value(value))
    }

    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// Look up an add-on by ID.
    #[must_use]
    pub fn addon(&self, id: &AddonId) -> Option<&Addon> {
        self.addons.iter().find(|a| &a.id == id)
    }

    /// Whether `variant` can be sold under this product's stock policy.
    #[must_use]
    pub fn stock_allows(&self, variant: &Variant) -> bool {
        self.sell_without_stock || variant.has_stock()
    }

    /// Product-level stock check for products without a variant catalog.
    #[must_use]
    pub fn product_stock_allows(&self) -> bool {
        self.sell_without_stock || self.inventory_quantity.is_none_or(|qty| qty > 0)
    }

    /// Minimum and maximum effective variant price.
    ///
    /// Falls back to the product price when the catalog is empty.
    #[must_use]
    pub fn price_range(&self) -> (Decimal, Decimal) {
        self.variants
            .iter()
            .map(|v| v.effective_price(self))
            .fold(None, |range: Option<(Decimal, Decimal)>, price| {
                Some(range.map_or((price, price), |(min, max)| {
                    (min.min(price), max.max(price))
                }))
            })
            .unwrap_or((self.price, self.price))
    }
}
