//! Import-time slot normalization.
//!
//! Binds free-text variant slots to stable `(OptionId, ValueId)` references
//! once, when a catalog is imported, so that steady-state resolution does not
//! depend on fuzzy label matching.

use optionset_core::{ValueId, VariantId};
use serde::Serialize;
use tracing::warn;

use super::{MatchMode, OptionValue, Product, SlotBinding};

/// Why a raw slot could not be bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnboundReason {
    /// No option with this name exists on the product.
    UnknownOption,
    /// The option exists but none of its values match.
    NoMatchingValue,
    /// Several values match equally well.
    Ambiguous {
        /// The competing values.
        candidates: Vec<ValueId>,
    },
}

/// A raw slot left untouched by normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnboundSlot {
    /// Variant owning the slot.
    pub variant_id: VariantId,
    /// Raw option name.
    pub option_name: String,
    /// Raw value text.
    pub value: String,
    /// Why binding failed.
    #[serde(flatten)]
    pub reason: UnboundReason,
}

/// Outcome of [`Product::normalize_slots`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationReport {
    /// Raw slots rewritten into direct references.
    pub bound: usize,
    /// Slots that were already direct references.
    pub already_bound: usize,
    /// Raw slots that could not be bound.
    pub unbound: Vec<UnboundSlot>,
}

impl NormalizationReport {
    /// Whether every slot is now a direct reference.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unbound.is_empty()
    }
}

/// Pick the single value a raw string refers to, exact matches first.
fn bind_value<'a>(values: &'a [OptionValue], raw: &str) -> Result<&'a OptionValue, UnboundReason> {
    let slot = SlotBinding::raw("", raw);
    for mode in MatchMode::PASSES {
        let candidates: Vec<&OptionValue> = values
            .iter()
            .filter(|v| slot.matches_value(v, mode))
            .collect();
        match candidates.as_slice() {
            [] => {}
            [single] => return Ok(single),
            many => {
                return Err(UnboundReason::Ambiguous {
                    candidates: many.iter().map(|v| v.id.clone()).collect(),
                });
            }
        }
    }
    Err(UnboundReason::NoMatchingValue)
}

impl Product {
    /// Rewrite raw slots into direct value references where unambiguous.
    ///
    /// Slots that cannot be bound are kept as raw text so the resolver can
    /// still try them at runtime, and are listed in the report.
    pub fn normalize_slots(&mut self) -> NormalizationReport {
        let mut report = NormalizationReport::default();

        for variant in &mut self.variants {
            for slot in &mut variant.slots {
                let SlotBinding::Raw { option_name, value } = slot else {
                    report.already_bound += 1;
                    continue;
                };

                let outcome = self
                    .options
                    .iter()
                    .find(|o| super::names_match(&o.name, option_name))
                    .ok_or(UnboundReason::UnknownOption)
                    .and_then(|option| {
                        bind_value(&option.values, value)
                            .map(|v| SlotBinding::bound(option.id.clone(), v.id.clone()))
                    });

                match outcome {
                    Ok(binding) => {
                        *slot = binding;
                        report.bound += 1;
                    }
                    Err(reason) => {
                        warn!(
                            variant_id = %variant.id,
                            option_name = %option_name,
                            value = %value,
                            ?reason,
                            "Variant slot could not be bound to an option value"
                        );
                        report.unbound.push(UnboundSlot {
                            variant_id: variant.id.clone(),
                            option_name: option_name.clone(),
                            value: value.clone(),
                            reason,
                        });
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn product() -> Product {
        serde_json::from_value(json!({
            "id": "tee",
            "price": "20",
            "options": [
                { "id": "size", "name": "Size", "values": [
                    { "id": "s", "label": "S" },
                    { "id": "xs", "label": "XS" },
                    { "id": "l", "label": "Large" },
                    { "id": "xl", "label": "Extra Large" }
                ]}
            ],
            "variants": [
                { "id": "v-s", "slots": [{ "option_name": "size", "value": "s" }] },
                { "id": "v-xs", "slots": [{ "option_name": "Size", "value": "XS " }] },
                { "id": "v-large", "slots": [{ "option_name": "Size", "value": "large" }] },
                { "id": "v-fuzzy", "slots": [{ "option_name": "Size", "value": "Extra" }] },
                { "id": "v-amb", "slots": [{ "option_name": "Size", "value": "Larg" }] },
                { "id": "v-none", "slots": [{ "option_name": "Size", "value": "Medium" }] },
                { "id": "v-opt", "slots": [{ "option_name": "Fit", "value": "Slim" }] },
                { "id": "v-bound", "slots": [{ "option_id": "size", "value_id": "s" }] }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_exact_matches_win_over_fuzzy() {
        let mut product = product();
        product.normalize_slots();

        // "s" is contained in "xs" but the exact match takes precedence.
        assert_eq!(product.variants[0].slots[0], SlotBinding::bound("size", "s"));
        assert_eq!(product.variants[1].slots[0], SlotBinding::bound("size", "xs"));
        assert_eq!(product.variants[2].slots[0], SlotBinding::bound("size", "l"));
    }

    #[test]
    fn test_fuzzy_binding_when_unique() {
        let mut product = product();
        product.normalize_slots();
        assert_eq!(product.variants[3].slots[0], SlotBinding::bound("size", "xl"));
    }

    #[test]
    fn test_report_lists_unbound_slots() {
        let mut product = product();
        let report = product.normalize_slots();

        assert_eq!(report.bound, 4);
        assert_eq!(report.already_bound, 1);
        assert!(!report.is_clean());

        let reasons: Vec<(&str, &UnboundReason)> = report
            .unbound
            .iter()
            .map(|u| (u.variant_id.as_str(), &u.reason))
            .collect();
        assert_eq!(
            reasons,
            vec![
                (
                    "v-amb",
                    &UnboundReason::Ambiguous {
                        candidates: vec![ValueId::new("l"), ValueId::new("xl")]
                    }
                ),
                ("v-none", &UnboundReason::NoMatchingValue),
                ("v-opt", &UnboundReason::UnknownOption),
            ]
        );

        // Unbound slots stay raw for the runtime fallback.
        assert_eq!(product.variants[5].slots[0], SlotBinding::raw("Size", "Medium"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let mut product = product();
        product.normalize_slots();
        let snapshot = product.clone();
        let second = product.normalize_slots();
        assert_eq!(second.bound, 0);
        assert_eq!(product, snapshot);
    }
}
