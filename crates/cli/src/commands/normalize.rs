//! `optionset normalize`

use std::path::Path;

use tracing::info;

use super::load_product;

/// Convert legacy variants, bind raw slots and print the product.
///
/// # Errors
///
/// Returns error if input cannot be read, or in strict mode if any slot
/// stays unbound.
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn run(product: &Path, strict: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut product = load_product(product)?;
    let report = product.normalize_slots();

    info!(
        product_id = %product.id,
        bound = report.bound,
        already_bound = report.already_bound,
        unbound = report.unbound.len(),
        "Normalization complete"
    );
    println!("{}", serde_json::to_string_pretty(&product)?);

    if strict && !report.is_clean() {
        eprintln!("{}", serde_json::to_string_pretty(&report.unbound)?);
        return Err(format!("{} slot(s) could not be bound", report.unbound.len()).into());
    }
    Ok(())
}
