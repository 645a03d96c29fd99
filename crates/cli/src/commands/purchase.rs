//! `optionset purchase`
//!
//! # Environment Variables
//!
//! See [`optionset_engine::config`]. `OPTIONSET_CART_URL` is required to add
//! to the cart, `OPTIONSET_WAITLIST_URL` to join the waitlist.

use std::path::Path;

use optionset_core::{AddonId, CustomerId};
use optionset_engine::EngineConfig;
use optionset_engine::services::{CartClient, WaitlistClient};
use tracing::info;

use super::{SelectArg, load_product, session_with};

/// Add the selection to the cart, or join the waitlist for it.
///
/// # Errors
///
/// Returns error if configuration or input is invalid, the current state
/// does not allow the action, or the service fails.
#[allow(clippy::print_stdout)]
pub async fn run(
    product: &Path,
    selections: &[SelectArg],
    addons: &[String],
    quantity: u32,
    customer: Option<String>,
    waitlist: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    let mut session = session_with(load_product(product)?, selections)?;
    for addon in addons {
        session.toggle_addon(&AddonId::new(addon.as_str()))?;
    }
    session.set_customer(customer.map(CustomerId::new));

    let state = session.purchasability().state;
    info!(
        product_id = %session.product().id,
        customer_id = ?session.customer(),
        %state,
        waitlist,
        "Submitting selection"
    );

    if waitlist {
        let client = WaitlistClient::from_config(&config)?;
        let request = session.join_waitlist(&client).await?;
        println!("{}", serde_json::to_string_pretty(&request)?);
    } else {
        let client = CartClient::from_config(&config)?;
        let confirmation = session.add_to_cart(&client, quantity).await?;
        println!("{}", confirmation.line_id);
    }
    Ok(())
}
