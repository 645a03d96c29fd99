//! Integration tests for Optionset.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p optionset-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `scenarios` - End-to-end selection scenarios through `SelectionSession`
//! - `properties` - `proptest` properties of resolution, availability and pricing
//! - `services` - HTTP clients against a `wiremock` server
//! - `discount_fetcher` - Debounce and last-request-wins with paused time
//!
//! This library only holds shared fixtures.

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use optionset_core::DiscountId;
use optionset_engine::catalog::legacy;
use optionset_engine::discount::DiscountKind;
use optionset_engine::{Discount, Product, SelectionState};
use rust_decimal::Decimal;
use serde_json::json;

/// Apparel product in the legacy three-slot shape.
///
/// Options Color{Red, Blue} and Size{S, M}; variants (Red, S, qty 5),
/// (Red, M, qty 0) and (Blue, S, qty 3).
#[must_use]
pub fn apparel() -> Product {
    legacy::parse_product(json!({
        "id": "tee",
        "title": "Classic Tee",
        "price": "25.00",
        "currency_code": "USD",
        "addons": [
            { "id": "wrap", "title": "Gift wrap", "price": "4.00" }
        ],
        "options": [
            { "id": "color", "name": "Color", "values": [
                { "id": "red", "label": "Red", "swatch": { "color": "#c0392b" } },
                { "id": "blue", "label": "Blue", "swatch": { "color": "#2980b9" } }
            ]},
            { "id": "size", "name": "Size", "values": [
                { "id": "s", "label": "S" },
                { "id": "m", "label": "M" }
            ]}
        ],
        "variants": [
            { "id": "tee-red-s", "option1_name": "Color", "option1_value": "Red",
              "option2_name": "Size", "option2_value": "S", "inventory_quantity": 5, "sku": "TEE-R-S" },
            { "id": "tee-red-m", "option1_name": "Color", "option1_value": "Red",
              "option2_name": "Size", "option2_value": "M", "inventory_quantity": 0, "sku": "TEE-R-M" },
            { "id": "tee-blue-s", "option1_name": "Color", "option1_value": "Blue",
              "option2_name": "Size", "option2_value": "S", "inventory_quantity": 3, "sku": "TEE-B-S" }
        ]
    }))
    .unwrap()
}

/// Watch with a variant price override and paid add-ons.
#[must_use]
pub fn watch() -> Product {
    serde_json::from_value(json!({
        "id": "watch",
        "title": "Field Watch",
        "price": "100",
        "compare_price": "140",
        "addons": [
            { "id": "engrave", "title": "Engraving", "price": "10" }
        ],
        "options": [
            { "id": "finish", "name": "Finish", "values": [
                { "id": "gold", "label": "Gold" },
                { "id": "steel", "label": "Steel" }
            ]}
        ],
        "variants": [
            { "id": "watch-gold", "slots": [{ "option_id": "finish", "value_id": "gold" }],
              "price": "120", "inventory_quantity": 4 },
            { "id": "watch-steel", "slots": [{ "option_id": "finish", "value_id": "steel" }],
              "inventory_quantity": 9 }
        ]
    }))
    .unwrap()
}

/// Build a selection from `(option name, value label)` pairs.
#[must_use]
pub fn select(product: &Product, pairs: &[(&str, &str)]) -> SelectionState {
    let mut selection = SelectionState::new();
    for (option, value) in pairs {
        selection.select_by_text(product, option, value).unwrap();
    }
    selection
}

/// A fixed-amount discount ending at `discounted_price`.
#[must_use]
pub fn discount(id: &str, discounted_price: Decimal) -> Discount {
    Discount {
        id: DiscountId::new(id),
        title: format!("Discount {id}"),
        kind: DiscountKind::FixedAmount,
        value: Decimal::ZERO,
        original_price: discounted_price,
        discounted_price,
    }
}
