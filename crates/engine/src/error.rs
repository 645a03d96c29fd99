//! Unified error handling.
//!
//! Resolution, availability and pricing never fail: data problems degrade to
//! a safe default and are logged. The errors below cover caller mistakes
//! (selecting a value that does not exist, buying something that is not
//! available) and the service boundary.

use optionset_core::{AddonId, OptionId, PurchasabilityState, ValueId};
use thiserror::Error;

use crate::config::ConfigError;
use crate::services::ServiceError;

/// Invalid selection input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Option ID not present on the product.
    #[error("Unknown option: {0}")]
    UnknownOption(OptionId),

    /// Value ID not present under the given option.
    #[error("Unknown value {value} for option {option}")]
    UnknownValue { option: OptionId, value: ValueId },

    /// No option with this name or ID.
    #[error("No option named {0:?}")]
    UnknownOptionText(String),

    /// No value with this label or ID under the option.
    #[error("No value {value:?} for option {option:?}")]
    UnknownValueText { option: String, value: String },

    /// Add-on ID not present on the product.
    #[error("Unknown add-on: {0}")]
    UnknownAddon(AddonId),
}

/// A purchase or waitlist action that the current state does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PurchaseError {
    /// Add-to-cart requires the `Available` state.
    #[error("Cannot add to cart: {0}")]
    NotPurchasable(PurchasabilityState),

    /// The waitlist is only offered when out of stock.
    #[error("Waitlist not offered: {0}")]
    WaitlistUnavailable(PurchasabilityState),

    /// Quantity must be at least one.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// More units requested than are in stock.
    #[error("Only {available} in stock, requested {requested}")]
    InsufficientStock { requested: u32, available: i64 },
}

/// Top-level engine error.
///
/// Returned by the session actions that end in a service call, where a
/// refused action and a failed request need one error type.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Invalid selection input.
    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    /// Disallowed purchase action.
    #[error("Purchase error: {0}")]
    Purchase(#[from] PurchaseError),

    /// External service call failed.
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for `EngineError`.
pub type Result<T> = std::result::Result<T, EngineError>;
