//! Optionset engine.
//!
//! Given a product's option schema and variant catalog and a customer's
//! (possibly partial) selection, the engine determines which variant the
//! selection identifies, which remaining values still lead somewhere
//! purchasable, the display and strike-through prices, and whether the
//! product can be bought now, needs more input, or should offer a waitlist.
//!
//! # Pipeline
//!
//! Every selection change runs, synchronously:
//!
//! [`resolver::resolve`] -> [`availability::annotate`] ->
//! [`pricing::compute_price`] -> [`purchasability::evaluate`]
//!
//! [`SelectionSession`] packages the pipeline for UI callers. The only
//! asynchronous piece is the discount lookup in [`discount`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod availability;
pub mod catalog;
pub mod config;
pub mod discount;
pub mod error;
pub mod pricing;
pub mod purchasability;
pub mod resolver;
pub mod selection;
pub mod services;
pub mod session;

pub use availability::{OptionAvailability, ValueAvailability, annotate, is_selectable};
pub use catalog::{Addon, OptionValue, Product, ProductOption, SlotBinding, Variant};
pub use config::{DiscountSettings, EngineConfig};
pub use discount::{Discount, DiscountFetcher, DiscountKey, DiscountSource, DiscountUpdate};
pub use error::{EngineError, PurchaseError, Result, SelectionError};
pub use pricing::{PriceQuote, PriceRange, compute_price, price_range};
pub use purchasability::{Purchasability, evaluate};
pub use resolver::resolve;
pub use selection::SelectionState;
pub use session::{SelectionSession, SelectionView};
