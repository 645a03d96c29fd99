//! Purchasability state consumed by selection surfaces.

use serde::{Deserialize, Serialize};

/// Whether the current selection can be bought.
///
/// Recomputed from scratch on every selection change; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchasabilityState {
    /// The product has options that are not yet chosen.
    NeedsSelection,
    /// The selection is buyable right now.
    Available,
    /// The selection is out of stock; offer the waitlist instead of the cart.
    OutOfStockWaitlist,
}

impl PurchasabilityState {
    /// Whether add-to-cart should be enabled.
    #[must_use]
    pub const fn can_purchase(self) -> bool {
        matches!(self, Self::Available)
    }

    /// Whether the waitlist capture action should be offered.
    #[must_use]
    pub const fn offers_waitlist(self) -> bool {
        matches!(self, Self::OutOfStockWaitlist)
    }
}

impl std::fmt::Display for PurchasabilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NeedsSelection => write!(f, "Needs selection"),
            Self::Available => write!(f, "Available"),
            Self::OutOfStockWaitlist => write!(f, "Out of stock"),
        }
    }
}
