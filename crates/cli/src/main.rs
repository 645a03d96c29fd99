//! Optionset CLI - Evaluate selections and maintain catalogs.
//!
//! # Usage
//!
//! ```bash
//! # Evaluate a selection against a product
//! optionset evaluate --product tee.json --select Color=Red --select Size=M
//!
//! # Bind free-text variant slots to option values
//! optionset normalize --product tee.json > tee.normalized.json
//!
//! # Fetch discounts for a selection from the pricing service
//! optionset discounts --product tee.json --select Color=Red --select Size=M --customer c-42
//!
//! # Add the selection to the cart, or join the waitlist when sold out
//! optionset purchase --product tee.json --select Size=S --quantity 2
//! optionset purchase --product tee.json --select Size=M --waitlist --customer c-42
//! ```
//!
//! # Commands
//!
//! - `evaluate` - Print the selection view (variant, availability, price, state)
//! - `normalize` - Convert legacy variants and bind raw slots
//! - `discounts` - Fetch discounts and print the discounted view
//! - `purchase` - Add to the cart or join the waitlist
//!
//! Logs go to stderr so stdout stays valid JSON. `RUST_LOG` overrides the
//! default filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::SelectArg;

#[derive(Parser)]
#[command(name = "optionset")]
#[command(author, version, about = "Optionset variant engine tools")]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a selection and print the resulting view as JSON
    Evaluate {
        /// Product JSON file (`-` for stdin)
        #[arg(short, long)]
        product: PathBuf,

        /// Option choice as `Option=Value` (name or ID, label or ID)
        #[arg(short, long = "select", value_parser = commands::parse_select)]
        selections: Vec<SelectArg>,

        /// Add-on ID to include
        #[arg(short, long = "addon")]
        addons: Vec<String>,

        /// Discount stack JSON file
        #[arg(short, long)]
        discounts: Option<PathBuf>,

        /// Also print the cart line for this quantity
        #[arg(short, long)]
        quantity: Option<u32>,
    },
    /// Convert legacy variants and bind raw slots to option values
    Normalize {
        /// Product JSON file (`-` for stdin)
        #[arg(short, long)]
        product: PathBuf,

        /// Fail if any slot could not be bound
        #[arg(long)]
        strict: bool,
    },
    /// Fetch discounts from the pricing service and print the view
    Discounts {
        /// Product JSON file (`-` for stdin)
        #[arg(short, long)]
        product: PathBuf,

        /// Option choice as `Option=Value`
        #[arg(short, long = "select", value_parser = commands::parse_select)]
        selections: Vec<SelectArg>,

        /// Customer ID for customer-specific discounts
        #[arg(short, long)]
        customer: Option<String>,
    },
    /// Add the selection to the cart service, or join the waitlist
    Purchase {
        /// Product JSON file (`-` for stdin)
        #[arg(short, long)]
        product: PathBuf,

        /// Option choice as `Option=Value`
        #[arg(short, long = "select", value_parser = commands::parse_select)]
        selections: Vec<SelectArg>,

        /// Add-on ID to include
        #[arg(short, long = "addon")]
        addons: Vec<String>,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Customer ID recorded on the waitlist
        #[arg(short, long)]
        customer: Option<String>,

        /// Join the waitlist instead of adding to the cart
        #[arg(short, long)]
        waitlist: bool,
    },
}

fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "optionset_engine=info,optionset=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Evaluate {
            product,
            selections,
            addons,
            discounts,
            quantity,
        } => {
            commands::evaluate::run(&product, &selections, &addons, discounts.as_deref(), quantity)?;
        }
        Commands::Normalize { product, strict } => {
            commands::normalize::run(&product, strict)?;
        }
        Commands::Discounts {
            product,
            selections,
            customer,
        } => {
            commands::discounts::run(&product, &selections, customer).await?;
        }
        Commands::Purchase {
            product,
            selections,
            addons,
            quantity,
            customer,
            waitlist,
        } => {
            commands::purchase::run(&product, &selections, &addons, quantity, customer, waitlist)
                .await?;
        }
    }
    Ok(())
}
