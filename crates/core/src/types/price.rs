//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are stored unrounded in [`Decimal`]. Rounding and the decision to
//! show or hide cents happen only in [`Price::display`], so formatting can
//! never feed back into price computations.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

/// How cents are rendered by [`Price::display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CentsDisplay {
    /// Always render two decimal places (`$20.00`).
    #[default]
    Always,
    /// Drop the decimals for whole amounts (`$20`, but `$19.99`).
    HideWhole,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Format for display (e.g., `$19.99`).
    ///
    /// Rounds half away from zero to two decimal places; the stored amount is
    /// left untouched.
    #[must_use]
    pub fn display(&self, cents: CentsDisplay) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let magnitude = rounded.abs();
        let symbol = self.currency_code.symbol();

        if cents == CentsDisplay::HideWhole && magnitude.fract().is_zero() {
            format!("{sign}{symbol}{}", magnitude.trunc())
        } else {
            format!("{sign}{symbol}{magnitude:.2}")
        }
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(amount: Decimal) -> Price {
        Price::new(amount, CurrencyCode::USD)
    }

    #[test]
    fn test_display_always_shows_cents() {
        assert_eq!(usd(Decimal::new(20, 0)).display(CentsDisplay::Always), "$20.00");
        assert_eq!(usd(Decimal::new(1999, 2)).display(CentsDisplay::Always), "$19.99");
    }

    #[test]
    fn test_display_hide_whole() {
        assert_eq!(usd(Decimal::new(20, 0)).display(CentsDisplay::HideWhole), "$20");
        assert_eq!(usd(Decimal::new(1999, 2)).display(CentsDisplay::HideWhole), "$19.99");
    }

    #[test]
    fn test_display_rounds_without_mutating() {
        let price = usd(Decimal::new(19_995, 3));
        assert_eq!(price.display(CentsDisplay::Always), "$20.00");
        assert_eq!(price.display(CentsDisplay::HideWhole), "$20");
        assert_eq!(price.amount, Decimal::new(19_995, 3));
    }

    #[test]
    fn test_display_negative_and_other_currencies() {
        assert_eq!(usd(Decimal::new(-500, 2)).display(CentsDisplay::Always), "-$5.00");
        let eur = Price::new(Decimal::new(1050, 2), CurrencyCode::EUR);
        assert_eq!(eur.display(CentsDisplay::Always), "€10.50");
        assert_eq!(CurrencyCode::GBP.code(), "GBP");
    }

    #[test]
    fn test_zero() {
        let zero = Price::zero(CurrencyCode::CAD);
        assert!(zero.amount.is_zero());
        assert_eq!(zero.display(CentsDisplay::HideWhole), "$0");
    }
}
