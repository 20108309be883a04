//! Rounding and percentage formatting shared by the calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a monetary amount to two decimal places, midpoint away from zero.
///
/// # Examples
///
/// ```
/// use tier_engine::calculation::round_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_currency(dec!(10.104)), dec!(10.10));
/// assert_eq!(round_currency(dec!(10.105)), dec!(10.11));
/// ```
pub fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats a percentage value (already scaled to 0–100) as a string.
///
/// The value is rounded to two decimal places and trailing zeros are
/// dropped.
///
/// # Examples
///
/// ```
/// use tier_engine::calculation::format_percent;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_percent(dec!(10.00)), "10%");
/// assert_eq!(format_percent(dec!(13.4000)), "13.4%");
/// assert_eq!(format_percent(dec!(6.6666)), "6.67%");
/// ```
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", round_currency(value).normalize())
}
