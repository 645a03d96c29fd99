//! Property tests for resolution, availability and pricing.
//!
//! Catalogs are generated as a random subset of the full cartesian product
//! of 1-3 options with 1-3 values each, with random stock and either raw or
//! bound slots.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use optionset_core::{AddonId, CurrencyCode, DiscountId, OptionId, ProductId, ValueId, VariantId};
use optionset_engine::discount::DiscountKind;
use optionset_engine::{
    Addon, Discount, OptionValue, Product, ProductOption, SelectionState, SlotBinding, Variant,
    compute_price, is_selectable, resolve,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// A generated catalog plus the value indices of each variant.
#[derive(Debug, Clone)]
struct Catalog {
    product: Product,
    combos: Vec<Vec<usize>>,
}

fn option_id(i: usize) -> OptionId {
    OptionId::new(format!("opt{i}"))
}

fn value_id(i: usize, j: usize) -> ValueId {
    ValueId::new(format!("o{i}v{j}"))
}

fn cartesian(counts: &[usize]) -> Vec<Vec<usize>> {
    counts.iter().fold(vec![Vec::new()], |acc, &count| {
        acc.into_iter()
            .flat_map(|prefix| {
                (0..count).map(move |j| {
                    let mut next = prefix.clone();
                    next.push(j);
                    next
                })
            })
            .collect()
    })
}

fn build(
    counts: &[usize],
    cells: &[(Vec<usize>, bool, Option<i64>)],
    sell_without_stock: bool,
    raw_slots: bool,
) -> Catalog {
    let options = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| ProductOption {
            id: option_id(i),
            name: format!("Option {i}"),
            values: (0..count)
                .map(|j| OptionValue {
                    id: value_id(i, j),
                    label: format!("Value {i}-{j}!"),
                    swatch: None,
                })
                .collect(),
        })
        .collect();

    let mut variants = Vec::new();
    let mut combos = Vec::new();
    for (n, (combo, present, qty)) in cells.iter().enumerate() {
        if !present {
            continue;
        }
        let slots = combo
            .iter()
            .enumerate()
            .map(|(i, &j)| {
                if raw_slots {
                    SlotBinding::raw(format!("option {i}"), format!(" VALUE {i}-{j}! "))
                } else {
                    SlotBinding::bound(option_id(i), value_id(i, j))
                }
            })
            .collect();
        variants.push(Variant {
            id: VariantId::new(format!("var{n}")),
            slots,
            price: None,
            inventory_quantity: *qty,
            sku: None,
        });
        combos.push(combo.clone());
    }

    Catalog {
        product: Product {
            id: ProductId::new("generated"),
            title: String::new(),
            price: Decimal::new(1000, 2),
            compare_price: None,
            currency_code: CurrencyCode::USD,
            sell_without_stock,
            inventory_quantity: None,
            addons: Vec::new(),
            options,
            variants,
            default_selection: Default::default(),
        },
        combos,
    }
}

fn catalog() -> impl Strategy<Value = Catalog> {
    (
        prop::collection::vec(1usize..=3, 1..=3),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_flat_map(|(counts, sell, raw)| {
            let combos = cartesian(&counts);
            let cells = prop::collection::vec(
                (any::<bool>(), prop::option::of(0i64..4)),
                combos.len(),
            );
            (Just(counts), Just(combos), cells, Just(sell), Just(raw))
        })
        .prop_map(|(counts, combos, cells, sell, raw)| {
            let cells: Vec<_> = combos
                .into_iter()
                .zip(cells)
                .map(|(combo, (present, qty))| (combo, present, qty))
                .collect();
            build(&counts, &cells, sell, raw)
        })
}

fn selection_for(combo: &[usize]) -> SelectionState {
    serde_json::from_value(serde_json::Value::Object(
        combo
            .iter()
            .enumerate()
            .map(|(i, &j)| {
                (
                    option_id(i).to_string(),
                    serde_json::Value::String(value_id(i, j).to_string()),
                )
            })
            .collect(),
    ))
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// A complete selection matching exactly one variant resolves to it.
    #[test]
    fn complete_selection_resolves_to_its_variant(catalog in catalog()) {
        for (variant, combo) in catalog.product.variants.iter().zip(&catalog.combos) {
            let selection = selection_for(combo);
            let resolved = resolve(&selection, &catalog.product);
            prop_assert_eq!(resolved.map(|v| &v.id), Some(&variant.id));
        }
    }

    /// A strict subset of a variant's dimensions never resolves.
    #[test]
    fn strict_subset_never_resolves(catalog in catalog()) {
        for combo in &catalog.combos {
            let subset = &combo[..combo.len() - 1];
            prop_assert!(resolve(&selection_for(subset), &catalog.product).is_none());
        }
    }

    /// Resolution is idempotent.
    #[test]
    fn resolve_is_idempotent(catalog in catalog(), pick in any::<prop::sample::Index>()) {
        let counts: Vec<usize> = catalog.product.options.iter().map(|o| o.values.len()).collect();
        let all = cartesian(&counts);
        let combo = pick.get(&all);
        let selection = selection_for(combo);

        let first = resolve(&selection, &catalog.product).map(|v| v.id.clone());
        let second = resolve(&selection, &catalog.product).map(|v| v.id.clone());
        prop_assert_eq!(first, second);
    }

    /// A value whose every variant is sold out is never selectable.
    #[test]
    fn sold_out_values_are_not_selectable(catalog in catalog()) {
        prop_assume!(!catalog.product.sell_without_stock);
        // An empty catalog falls back to product-level stock.
        prop_assume!(!catalog.product.variants.is_empty());
        let product = &catalog.product;
        let seeded = SelectionState::seed(product);

        for (i, option) in product.options.iter().enumerate() {
            for (j, value) in option.values.iter().enumerate() {
                let sold_out = product
                    .variants
                    .iter()
                    .zip(&catalog.combos)
                    .filter(|(_, combo)| combo[i] == j)
                    .all(|(variant, _)| variant.inventory_quantity.is_some_and(|q| q <= 0));

                if sold_out {
                    prop_assert!(!is_selectable(&option.id, &value.id, &SelectionState::new(), product));
                    prop_assert!(!is_selectable(&option.id, &value.id, &seeded, product));
                }
            }
        }
    }

    /// The display price never exceeds the original price.
    #[test]
    fn display_never_exceeds_original(
        base in 0i64..100_000,
        override_price in prop::option::of(0i64..100_000),
        compare in prop::option::of(0i64..200_000),
        addon_prices in prop::collection::vec(0i64..5_000, 0..3),
        discounted in prop::collection::vec(-1_000i64..150_000, 0..3),
    ) {
        let product = Product {
            id: ProductId::new("p"),
            title: String::new(),
            price: Decimal::new(base, 2),
            compare_price: compare.map(|c| Decimal::new(c, 2)),
            currency_code: CurrencyCode::EUR,
            sell_without_stock: false,
            inventory_quantity: None,
            addons: addon_prices
                .iter()
                .enumerate()
                .map(|(n, &p)| Addon {
                    id: AddonId::new(format!("a{n}")),
                    title: String::new(),
                    price: Decimal::new(p, 2),
                })
                .collect(),
            options: Vec::new(),
            variants: vec![Variant {
                id: VariantId::new("v"),
                slots: Vec::new(),
                price: override_price.map(|p| Decimal::new(p, 2)),
                inventory_quantity: None,
                sku: None,
            }],
            default_selection: Default::default(),
        };
        let discounts: Vec<Discount> = discounted
            .iter()
            .enumerate()
            .map(|(n, &d)| Discount {
                id: DiscountId::new(format!("d{n}")),
                title: String::new(),
                kind: DiscountKind::FixedAmount,
                value: Decimal::ZERO,
                original_price: Decimal::ZERO,
                discounted_price: Decimal::new(d, 2),
            })
            .collect();

        let quote = compute_price(&product, product.variants.first(), &product.addons, &discounts);
        prop_assert!(quote.display.amount <= quote.original.amount);
        prop_assert!(quote.display.amount >= Decimal::ZERO);
    }
}
