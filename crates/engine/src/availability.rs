//! Per-value availability annotation.
//!
//! For every candidate value of every option, decides whether choosing it
//! (together with the rest of the current selection) still leads to a
//! purchasable variant. The UI greys out values for which this is false.

use optionset_core::{OptionId, ValueId};
use serde::Serialize;

use crate::catalog::{MatchMode, Product, Swatch};
use crate::resolver::{covering_variants, resolve};
use crate::selection::SelectionState;

/// Whether picking `option_id -> value_id` keeps the selection purchasable.
///
/// Builds a hypothetical selection with the candidate overriding the current
/// choice for that option. A complete hypothetical selection must resolve to
/// a variant the stock policy allows. An incomplete one only needs some fully
/// specified variant that matches every hypothetical entry, exactly or
/// fuzzily, and passes the stock policy.
///
/// Products without a variant catalog fall back to product-level stock.
#[must_use]
pub fn is_selectable(
    option_id: &OptionId,
    value_id: &ValueId,
    selection: &SelectionState,
    product: &Product,
) -> bool {
    if product.value(option_id, value_id).is_none() {
        return false;
    }

    if product.variants.is_empty() {
        return product.product_stock_allows();
    }

    let hypothetical = selection.with_override(option_id.clone(), value_id.clone());

    if hypothetical.is_complete(product) {
        return resolve(&hypothetical, product).is_some_and(|v| product.stock_allows(v));
    }

    // Every pass counts: a sold-out exact match must not hide an in-stock
    // variant that only matches fuzzily.
    MatchMode::PASSES.into_iter().any(|mode| {
        covering_variants(&hypothetical, product, mode)
            .into_iter()
            .any(|v| v.is_fully_specified(product) && product.stock_allows(v))
    })
}

/// Selectability of one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueAvailability {
    pub value_id: ValueId,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swatch: Option<Swatch>,
    /// Currently chosen.
    pub selected: bool,
    /// Choosing it still leads to a purchasable variant.
    pub selectable: bool,
}

/// Selectability of every value of one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionAvailability {
    pub option_id: OptionId,
    pub name: String,
    pub values: Vec<ValueAvailability>,
}

impl OptionAvailability {
    /// Look up a value's entry.
    #[must_use]
    pub fn value(&self, id: &ValueId) -> Option<&ValueAvailability> {
        self.values.iter().find(|v| &v.value_id == id)
    }
}

/// Build the selectability table for every option and value, in schema
/// order.
#[must_use]
pub fn annotate(product: &Product, selection: &SelectionState) -> Vec<OptionAvailability> {
    product
        .options
        .iter()
        .map(|option| OptionAvailability {
            option_id: option.id.clone(),
            name: option.name.clone(),
            values: option
                .values
                .iter()
                .map(|value| ValueAvailability {
                    value_id: value.id.clone(),
                    label: value.label.clone(),
                    swatch: value.swatch.clone(),
                    selected: selection.is_selected(&option.id, &value.id),
                    selectable: is_selectable(&option.id, &value.id, selection, product),
                })
                .collect(),
        })
        .collect()
}
