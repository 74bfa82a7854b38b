//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts coming from the remote API are JSON floats (`9.99`); they are
//! decoded straight into [`Decimal`] so cart arithmetic never goes through
//! binary floating point. Rounding happens only at display time.

use core::fmt;

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

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the catalog's currency (USD).
    #[must_use]
    pub const fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// Amount rounded half away from zero to two decimal places.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for Price {
    /// Formats as symbol plus two decimals, e.g. `$19.99`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        if rounded.is_sign_negative() && !rounded.is_zero() {
            write!(f, "-{}{:.2}", self.currency_code.symbol(), rounded.abs())
        } else {
            write!(f, "{}{:.2}", self.currency_code.symbol(), rounded.abs())
        }
    }
}

/// ISO 4217 currency codes. The catalog is priced in US dollars only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::USD => "$",
        }
    }
}
