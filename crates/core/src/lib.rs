//! Optionset Core - Shared types library.
//!
//! This crate provides common types used across all Optionset components:
//! - `engine` - Variant resolution, availability, pricing and purchasability
//! - `cli` - Command-line tools for evaluating and normalizing catalogs
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere, including by UI layers
//! that only consume the engine's output.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and the
//!   purchasability state

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
