//! Variant resolution.
//!
//! Maps a [`SelectionState`] onto the single catalog [`Variant`] it
//! identifies. Resolution never fails: an incomplete selection, an
//! inconsistent catalog and an empty catalog all resolve to `None`, and
//! callers tell these apart by checking completeness themselves.

use tracing::{debug, warn};

use crate::catalog::{MatchMode, OptionValue, Product, ProductOption, Variant};
use crate::selection::SelectionState;

/// A selection entry looked up in the option schema.
type Entry<'a> = (&'a ProductOption, &'a OptionValue);

/// Look up every selection entry in the schema.
///
/// Returns `None` if any entry references an option or value that does not
/// exist on the product.
fn schema_entries<'a>(selection: &SelectionState, product: &'a Product) -> Option<Vec<Entry<'a>>> {
    selection
        .iter()
        .map(|(option_id, value_id)| {
            let option = product.option(option_id)?;
            let value = option.value(value_id)?;
            Some((option, value))
        })
        .collect()
}

/// Every selected entry is described by some slot of the variant.
fn covers_selection(variant: &Variant, entries: &[Entry<'_>], mode: MatchMode) -> bool {
    entries.iter().all(|(option, value)| {
        variant
            .slots
            .iter()
            .any(|slot| slot.matches(option, value, mode))
    })
}

/// Full match: exact dimensionality, every entry covered, no extra slots.
fn matches_exactly(variant: &Variant, entries: &[Entry<'_>], mode: MatchMode) -> bool {
    variant.slots.len() == entries.len()
        && covers_selection(variant, entries, mode)
        && variant.slots.iter().all(|slot| {
            entries
                .iter()
                .any(|(option, value)| slot.matches(option, value, mode))
        })
}

/// Find the variant a selection identifies.
///
/// Exact slot matches are tried before fuzzy ones, so a catalog holding both
/// `"S"` and `"XS"` never resolves `S` to the `XS` variant. When several
/// variants match in the same pass the first in catalog order wins and the
/// duplicate is logged.
#[must_use]
pub fn resolve<'a>(selection: &SelectionState, product: &'a Product) -> Option<&'a Variant> {
    if selection.is_empty() {
        return None;
    }

    let Some(entries) = schema_entries(selection, product) else {
        debug!(
            product_id = %product.id,
            "Selection references values outside the option schema"
        );
        return None;
    };

    for mode in MatchMode::PASSES {
        let mut matches = product
            .variants
            .iter()
            .filter(|v| matches_exactly(v, &entries, mode));

        if let Some(first) = matches.next() {
            let duplicates: Vec<_> = matches.map(|v| v.id.as_str()).collect();
            if !duplicates.is_empty() {
                warn!(
                    product_id = %product.id,
                    variant_id = %first.id,
                    ?duplicates,
                    ?mode,
                    "Multiple variants match the same selection; using the first"
                );
            }
            return Some(first);
        }
    }

    debug!(
        product_id = %product.id,
        selected = selection.len(),
        "Selection does not resolve to a variant"
    );
    None
}

/// Variants whose slots describe every selected entry under `mode`.
///
/// Returns nothing if the selection references values outside the schema.
#[must_use]
pub fn covering_variants<'a>(
    selection: &SelectionState,
    product: &'a Product,
    mode: MatchMode,
) -> Vec<&'a Variant> {
    let Some(entries) = schema_entries(selection, product) else {
        return Vec::new();
    };
    product
        .variants
        .iter()
        .filter(|v| covers_selection(v, &entries, mode))
        .collect()
}

/// Variants that could still be reached by extending `selection`.
///
/// A variant qualifies when every selected entry is described by one of its
/// slots. Like [`resolve`], exact matches are preferred: the fuzzy pass is
/// only consulted when no variant qualifies exactly. An empty selection is
/// compatible with every variant.
///
/// Existence checks that must not be hidden by an exact match should use
/// [`covering_variants`] for each pass instead.
#[must_use]
pub fn compatible_variants<'a>(selection: &SelectionState, product: &'a Product) -> Vec<&'a Variant> {
    MatchMode::PASSES
        .into_iter()
        .map(|mode| covering_variants(selection, product, mode))
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}
