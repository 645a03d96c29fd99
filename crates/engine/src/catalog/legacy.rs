//! Legacy three-slot variant shape.
//!
//! Older catalog exports describe each variant with up to three fixed
//! `(option name, value)` pairs. This module translates that shape into
//! [`Variant`]s with an ordered slot list so nothing past the catalog
//! boundary is capped at three options.

use optionset_core::VariantId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Product, SlotBinding, Variant};

/// A variant as exported by the legacy catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyVariant {
    /// Variant ID.
    pub id: VariantId,
    #[serde(default)]
    pub option1_name: Option<String>,
    #[serde(default)]
    pub option1_value: Option<String>,
    #[serde(default)]
    pub option2_name: Option<String>,
    #[serde(default)]
    pub option2_value: Option<String>,
    #[serde(default)]
    pub option3_name: Option<String>,
    #[serde(default)]
    pub option3_value: Option<String>,
    /// Price override.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Units in stock (`None` = unlimited).
    #[serde(default)]
    pub inventory_quantity: Option<i64>,
    /// SKU code.
    #[serde(default)]
    pub sku: Option<String>,
}

impl From<LegacyVariant> for Variant {
    fn from(legacy: LegacyVariant) -> Self {
        let pairs = [
            (legacy.option1_name, legacy.option1_value),
            (legacy.option2_name, legacy.option2_value),
            (legacy.option3_name, legacy.option3_value),
        ];

        // A slot needs both halves; blank halves mean "not used".
        let slots = pairs
            .into_iter()
            .filter_map(|pair| match pair {
                (Some(name), Some(value)) if !name.trim().is_empty() && !value.trim().is_empty() => {
                    Some(SlotBinding::Raw {
                        option_name: name,
                        value,
                    })
                }
                _ => None,
            })
            .collect();

        Self {
            id: legacy.id,
            slots,
            price: legacy.price,
            inventory_quantity: legacy.inventory_quantity,
            sku: legacy.sku,
        }
    }
}

/// Parse a product whose variants may use either shape.
///
/// Variant objects carrying a `slots` key are read as-is; everything else is
/// read as a [`LegacyVariant`] and converted.
///
/// # Errors
///
/// Returns an error if the JSON does not describe a product.
pub fn parse_product(mut value: serde_json::Value) -> Result<Product, serde_json::Error> {
    if let Some(variants) = value.get_mut("variants").and_then(|v| v.as_array_mut()) {
        for variant in variants.iter_mut() {
            if variant.get("slots").is_some() {
                continue;
            }
            let legacy: LegacyVariant = serde_json::from_value(variant.take())?;
            *variant = serde_json::to_value(Variant::from(legacy))?;
        }
    }
    serde_json::from_value(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_legacy_variant_conversion_drops_empty_slots() {
        let legacy = LegacyVariant {
            id: VariantId::new("v1"),
            option1_name: Some("Color".to_string()),
            option1_value: Some("Red".to_string()),
            option2_name: Some("Size".to_string()),
            option2_value: Some("  ".to_string()),
            option3_name: None,
            option3_value: Some("orphan".to_string()),
            price: Some(Decimal::new(120, 0)),
            inventory_quantity: Some(4),
            sku: Some("TEE-RED".to_string()),
        };

        let variant = Variant::from(legacy);
        assert_eq!(variant.slots, vec![SlotBinding::raw("Color", "Red")]);
        assert_eq!(variant.price, Some(Decimal::new(120, 0)));
        assert_eq!(variant.inventory_quantity, Some(4));
        assert_eq!(variant.sku.as_deref(), Some("TEE-RED"));
    }

    #[test]
    fn test_parse_product_accepts_both_shapes() {
        let product = parse_product(json!({
            "id": "tee",
            "price": "25.00",
            "options": [{ "id": "color", "name": "Color", "values": [
                { "id": "red", "label": "Red" }
            ]}],
            "variants": [
                { "id": "legacy", "option1_name": "Color", "option1_value": "Red", "inventory_quantity": 2 },
                { "id": "modern", "slots": [{ "option_id": "color", "value_id": "red" }] }
            ]
        }))
        .unwrap();

        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[0].slots, vec![SlotBinding::raw("Color", "Red")]);
        assert_eq!(product.variants[0].inventory_quantity, Some(2));
        assert_eq!(product.variants[1].slots, vec![SlotBinding::bound("color", "red")]);
    }

    #[test]
    fn test_parse_product_rejects_garbage() {
        assert!(parse_product(json!({ "variants": [] })).is_err());
    }
}
