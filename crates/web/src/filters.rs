//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use rust_decimal::{Decimal, RoundingStrategy};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a decimal with one fractional digit (ratings, percentages).
///
/// Usage in templates: `{{ product.rating|one_decimal }}`
#[askama::filter_fn]
pub fn one_decimal(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(one_decimal_value(&value.to_string()))
}

/// Values that are not decimals are returned unchanged.
fn one_decimal_value(raw: &str) -> String {
    raw.parse::<Decimal>().map_or_else(
        |_| raw.to_string(),
        |d| format!("{:.1}", d.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_decimal() {
        assert_eq!(one_decimal_value("4.94"), "4.9");
        assert_eq!(one_decimal_value("4.95"), "5.0");
        assert_eq!(one_decimal_value("3"), "3.0");
        assert_eq!(one_decimal_value("n/a"), "n/a");
    }
}
