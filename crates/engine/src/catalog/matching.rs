//! Slot matching predicates.
//!
//! Merchants type variant slot values by hand, so the same value shows up as
//! `"Red"`, `" red "` or `"Red (limited)"`. Matching is done in two passes:
//! [`MatchMode::Exact`] compares against the value's id and label, and
//! [`MatchMode::Fuzzy`] additionally accepts substring containment. Callers
//! always try the exact pass first so that `"S"` never resolves to `"XS"`
//! when an exact `"S"` variant exists.

use super::{OptionValue, ProductOption, SlotBinding};

/// Strictness of slot matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    /// Raw text must equal the value id or label (case-insensitive, trimmed).
    Exact,
    /// Exact, or either of raw text and label contains the other.
    Fuzzy,
}

impl MatchMode {
    /// Passes in the order they should be attempted.
    pub const PASSES: [Self; 2] = [Self::Exact, Self::Fuzzy];
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Whether two option names refer to the same option.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    let a = normalize(a);
    !a.is_empty() && a == normalize(b)
}

/// Raw text equals the value's id or label (case-insensitive, trimmed).
pub(crate) fn exact_match(value: &OptionValue, raw: &str) -> bool {
    let raw = normalize(raw);
    if raw.is_empty() {
        return false;
    }
    raw == normalize(value.id.as_str()) || raw == normalize(&value.label)
}

/// NORMALIZE-MATCH: exact match, or either of raw text and label contains
/// the other.
///
/// Blank strings never match; otherwise an empty slot would match every
/// value.
#[must_use]
pub fn normalize_match(value: &OptionValue, raw: &str) -> bool {
    if exact_match(value, raw) {
        return true;
    }

    let raw = normalize(raw);
    let label = normalize(&value.label);
    if raw.is_empty() || label.is_empty() {
        return false;
    }
    label.contains(&raw) || raw.contains(&label)
}

impl SlotBinding {
    /// Whether this slot describes `option`.
    #[must_use]
    pub fn binds_option(&self, option: &ProductOption) -> bool {
        match self {
            Self::Value { option_id, .. } => option_id == &option.id,
            Self::Raw { option_name, .. } => names_match(option_name, &option.name),
        }
    }

    /// Whether this slot's value is `value` under the given match mode.
    #[must_use]
    pub fn matches_value(&self, value: &OptionValue, mode: MatchMode) -> bool {
        match self {
            Self::Value { value_id, .. } => value_id == &value.id,
            Self::Raw { value: raw, .. } => match mode {
                MatchMode::Exact => exact_match(value, raw),
                MatchMode::Fuzzy => normalize_match(value, raw),
            },
        }
    }

    /// Whether this slot is `(option, value)`.
    #[must_use]
    pub fn matches(&self, option: &ProductOption, value: &OptionValue, mode: MatchMode) -> bool {
        self.binds_option(option) && self.matches_value(value, mode)
    }
}

#[cfg(test)]
mod tests {
    use optionset_core::{OptionId, ValueId};

    use super::*;

    fn value(id: &str, label: &str) -> OptionValue {
        OptionValue {
            id: ValueId::new(id),
            label: label.to_string(),
            swatch: None,
        }
    }

    fn size_option() -> ProductOption {
        ProductOption {
            id: OptionId::new("opt-size"),
            name: "Size".to_string(),
            values: vec![value("s", "Small"), value("xs", "Extra Small")],
        }
    }

    #[test]
    fn test_exact_match_on_id_and_label() {
        let small = value("s", "Small");
        assert!(exact_match(&small, "s"));
        assert!(exact_match(&small, "  SMALL "));
        assert!(!exact_match(&small, "Sm"));
        assert!(!exact_match(&small, ""));
    }

    #[test]
    fn test_normalize_match_containment_both_ways() {
        let red = value("red", "Red");
        assert!(normalize_match(&red, "Red (limited)"));
        assert!(normalize_match(&value("dr", "Dark Red"), "red"));
        assert!(!normalize_match(&red, "Blue"));
    }

    #[test]
    fn test_blank_never_matches() {
        let red = value("red", "Red");
        assert!(!normalize_match(&red, "   "));
        assert!(!normalize_match(&value("x", ""), "anything"));
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("Size", " size "));
        assert!(!names_match("Size", "Sizes"));
        assert!(!names_match("", ""));
    }

    #[test]
    fn test_slot_binding_matching() {
        let option = size_option();
        let small = &option.values[0];
        let extra_small = &option.values[1];

        let raw = SlotBinding::raw("size", "Small");
        assert!(raw.matches(&option, small, MatchMode::Exact));
        // "extra small" contains "small"
        assert!(!raw.matches(&option, extra_small, MatchMode::Exact));
        assert!(raw.matches(&option, extra_small, MatchMode::Fuzzy));

        let bound = SlotBinding::bound("opt-size", "xs");
        assert!(bound.matches(&option, extra_small, MatchMode::Exact));
        assert!(!bound.matches(&option, small, MatchMode::Fuzzy));

        let other_option = SlotBinding::raw("Color", "Small");
        assert!(!other_option.binds_option(&option));
    }
}
