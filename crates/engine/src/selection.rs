//! Customer selection state.
//!
//! A [`SelectionState`] maps option IDs to value IDs. It is partial until
//! every option of the product has a value, is rebuilt from scratch whenever
//! the product changes, and is never persisted.

use std::collections::BTreeMap;

use optionset_core::{OptionId, ValueId};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::Product;
use crate::error::SelectionError;

/// Mapping `Option.id -> Value.id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState(BTreeMap<OptionId, ValueId>);

impl SelectionState {
    /// An empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial selection for a product.
    ///
    /// Uses the merchant's default for each option when it names a value
    /// that exists, otherwise the option's first value. Options without any
    /// values stay unselected.
    #[must_use]
    pub fn seed(product: &Product) -> Self {
        let mut entries = BTreeMap::new();

        for option in &product.options {
            let configured = product.default_selection.get(&option.id);
            let default = configured.and_then(|id| option.value(id));
            if let (Some(id), None) = (configured, default) {
                warn!(
                    product_id = %product.id,
                    option_id = %option.id,
                    value_id = %id,
                    "Default selection references an unknown value"
                );
            }

            match default.or_else(|| option.values.first()) {
                Some(value) => {
                    entries.insert(option.id.clone(), value.id.clone());
                }
                None => warn!(
                    product_id = %product.id,
                    option_id = %option.id,
                    "Option has no values and can never be selected"
                ),
            }
        }

        Self(entries)
    }

    /// Build a validated selection from `(option, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if any pair does not exist on the product.
    pub fn from_pairs<I>(product: &Product, pairs: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = (OptionId, ValueId)>,
    {
        let mut selection = Self::new();
        for (option, value) in pairs {
            selection.select(product, option, value)?;
        }
        Ok(selection)
    }

    /// Choose `value` for `option`.
    ///
    /// # Errors
    ///
    /// Returns an error if the option is not on the product or the value
    /// does not belong to it.
    pub fn select(
        &mut self,
        product: &Product,
        option: OptionId,
        value: ValueId,
    ) -> Result<(), SelectionError> {
        let schema = product
            .option(&option)
            .ok_or_else(|| SelectionError::UnknownOption(option.clone()))?;
        if schema.value(&value).is_none() {
            return Err(SelectionError::UnknownValue { option, value });
        }
        self.0.insert(option, value);
        Ok(())
    }

    /// Choose a value by option name/ID and value label/ID.
    ///
    /// Intended for free-text input (CLI flags, query strings).
    ///
    /// # Errors
    ///
    /// Returns an error if no option or value matches the text.
    pub fn select_by_text(
        &mut self,
        product: &Product,
        option: &str,
        value: &str,
    ) -> Result<(), SelectionError> {
        let schema = product
            .option(&OptionId::new(option.trim()))
            .or_else(|| product.option_by_name(option))
            .ok_or_else(|| SelectionError::UnknownOptionText(option.to_string()))?;
        let chosen = schema
            .value_by_text(value)
            .ok_or_else(|| SelectionError::UnknownValueText {
                option: option.to_string(),
                value: value.to_string(),
            })?;
        self.0.insert(schema.id.clone(), chosen.id.clone());
        Ok(())
    }

    /// Remove the choice for `option`, returning the previous value.
    pub fn clear(&mut self, option: &OptionId) -> Option<ValueId> {
        self.0.remove(option)
    }

    /// The value chosen for `option`.
    #[must_use]
    pub fn get(&self, option: &OptionId) -> Option<&ValueId> {
        self.0.get(option)
    }

    /// Whether `value` is the current choice for `option`.
    #[must_use]
    pub fn is_selected(&self, option: &OptionId, value: &ValueId) -> bool {
        self.get(option) == Some(value)
    }

    /// Number of chosen options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is chosen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(option, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&OptionId, &ValueId)> {
        self.0.iter()
    }

    /// Copy of this selection with `option -> value` overridden.
    #[must_use]
    pub fn with_override(&self, option: OptionId, value: ValueId) -> Self {
        let mut hypothetical = self.clone();
        hypothetical.0.insert(option, value);
        hypothetical
    }

    /// Whether every option of the product has a value.
    #[must_use]
    pub fn is_complete(&self, product: &Product) -> bool {
        product.options.iter().all(|o| self.0.contains_key(&o.id))
    }

    /// Options of the product that still need a value, in schema order.
    #[must_use]
    pub fn missing_options<'a>(&self, product: &'a Product) -> Vec<&'a OptionId> {
        product
            .options
            .iter()
            .filter(|o| !self.0.contains_key(&o.id))
            .map(|o| &o.id)
            .collect()
    }
}
