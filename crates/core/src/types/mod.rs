//! Core types for Optionset.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod status;

pub use id::*;
pub use price::{CentsDisplay, CurrencyCode, Price};
pub use status::PurchasabilityState;
