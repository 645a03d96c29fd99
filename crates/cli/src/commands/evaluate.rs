//! `optionset evaluate`

use std::path::Path;

use optionset_core::AddonId;
use optionset_engine::Discount;
use tracing::info;

use super::{SelectArg, load_json, load_product, session_with};

/// Evaluate a selection and print the view (and optionally a cart line).
///
/// # Errors
///
/// Returns error if input cannot be read, a selection or add-on does not
/// exist, or a cart line cannot be built for `quantity`.
#[allow(clippy::print_stdout)]
pub fn run(
    product: &Path,
    selections: &[SelectArg],
    addons: &[String],
    discounts: Option<&Path>,
    quantity: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session_with(load_product(product)?, selections)?;

    for addon in addons {
        session.toggle_addon(&AddonId::new(addon.as_str()))?;
    }

    if let Some(path) = discounts {
        let stack: Vec<Discount> = load_json(path)?;
        let key = session.discount_key();
        session.set_discounts(&key, stack);
    }

    let view = session.view();
    info!(
        product_id = %view.product_id,
        state = %view.state,
        variant_id = ?view.variant_id,
        "Selection evaluated"
    );
    println!("{}", serde_json::to_string_pretty(&view)?);

    if let Some(quantity) = quantity {
        let line = session.purchase(quantity)?;
        println!("{}", serde_json::to_string_pretty(&line)?);
    }

    Ok(())
}
