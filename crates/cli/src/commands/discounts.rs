//! `optionset discounts`
//!
//! # Environment Variables
//!
//! See [`optionset_engine::config`]; `OPTIONSET_PRICING_URL` is required.

use std::path::Path;

use optionset_core::CustomerId;
use optionset_engine::services::PricingClient;
use optionset_engine::{DiscountFetcher, EngineConfig};
use tracing::info;

use super::{SelectArg, load_product, session_with};

/// Fetch discounts for the selection and print the discounted view.
///
/// # Errors
///
/// Returns error if configuration or input is invalid, or the pricing
/// service fails.
#[allow(clippy::print_stdout)]
pub async fn run(
    product: &Path,
    selections: &[SelectArg],
    customer: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    let mut session = session_with(load_product(product)?, selections)?;

    let client = PricingClient::from_config(&config)?;
    let (mut fetcher, mut updates) = DiscountFetcher::new(client, &config.discounts);

    session.set_customer(customer.map(CustomerId::new));
    let key = session.discount_key();
    info!(product_id = %key.product_id, variant_id = ?key.variant_id, "Fetching discounts");
    fetcher.request(key);

    // The fetcher logs and drops failed lookups, so bound the wait.
    let wait = config.discounts.debounce + config.http_timeout;
    let update = tokio::time::timeout(wait, updates.recv())
        .await
        .ok()
        .flatten()
        .filter(|update| fetcher.accept(update))
        .ok_or("No discount response from the pricing service")?;

    session.set_discounts(&update.key, update.discounts.to_vec());
    println!("{}", serde_json::to_string_pretty(&session.view())?);
    Ok(())
}
