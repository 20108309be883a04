//! Progressive accumulation across an ordered range set.
//!
//! This module applies each range's rate only to the portion of the input
//! that falls inside the range, walking the ranges in ascending order of
//! their lower bound. It is shared by the tax and commission facades.

use rust_decimal::Decimal;
use tracing::debug;

use super::rounding::{format_percent, round_currency};
use crate::error::{EngineError, EngineResult};
use crate::models::{ProgressiveBreakdown, RangeContribution, RateBasis, RateRange, Scope};

/// Calculates the progressive breakdown of `input` over `ranges`.
///
/// Ranges are processed in ascending `min` order regardless of the order
/// they are passed in. For every range whose lower bound the input reaches,
/// the attributed portion is
///
/// ```text
/// min(input, max ?? input) - min + 1
/// ```
///
/// The `+ 1` treats the stored bounds as whole units with both endpoints
/// included, so the ranges behave as `(previous max, max]`. It is applied
/// to fractional amounts as well; the golden-value tests pin that
/// behaviour. A running remainder starts at `input`, each portion is
/// subtracted from it, and iteration stops once it reaches zero.
///
/// Each contribution is rounded to two decimal places and `total` is the sum
/// of the rounded contributions.
///
/// # Errors
///
/// - [`EngineError::Validation`] if `input` is negative.
/// - [`EngineError::NoRangesConfigured`] if `ranges` is empty.
/// - [`EngineError::CalculationOverflow`] if a portion, contribution or
///   total exceeds the `Decimal` range.
///
/// # Example
///
/// ```
/// use tier_engine::calculation::calculate_progressive;
/// use tier_engine::models::{RangeBounds, RateBasis, RateRange, Scope};
/// use rust_decimal_macros::dec;
///
/// let brackets = vec![
///     RateRange::new(Scope::Global, RangeBounds::new(dec!(0), Some(dec!(100))).unwrap(), dec!(0.10)),
///     RateRange::new(Scope::Global, RangeBounds::new(dec!(101), None).unwrap(), dec!(0.20)),
/// ];
///
/// let breakdown = calculate_progressive(dec!(150), &Scope::Global, &brackets, RateBasis::Fraction).unwrap();
///
/// assert_eq!(breakdown.lines[0].portion, dec!(101));
/// assert_eq!(breakdown.lines[1].portion, dec!(50));
/// assert_eq!(breakdown.total, dec!(20.10));
/// assert_eq!(breakdown.effective_rate, "13.4%");
/// ```
pub fn calculate_progressive(
    input: Decimal,
    scope: &Scope,
    ranges: &[RateRange],
    basis: RateBasis,
) -> EngineResult<ProgressiveBreakdown> {
    if input < Decimal::ZERO {
        return Err(EngineError::validation(
            "input",
            format!("{} must not be negative", input),
        ));
    }

    if ranges.is_empty() {
        return Err(EngineError::NoRangesConfigured {
            scope: scope.clone(),
        });
    }

    let mut ordered: Vec<&RateRange> = ranges.iter().collect();
    ordered.sort_by_key(|range| range.bounds.min());

    let mut remaining = input;
    let mut total = Decimal::ZERO;
    let mut lines = Vec::new();

    for (position, range) in ordered.into_iter().enumerate() {
        if remaining <= Decimal::ZERO {
            break;
        }

        let portion = portion_within(input, range).ok_or_else(|| overflow(input))?;
        if portion <= Decimal::ZERO {
            continue;
        }

        let contribution = portion
            .checked_mul(basis.multiplier(range.rate))
            .map(round_currency)
            .ok_or_else(|| overflow(input))?;
        total = total
            .checked_add(contribution)
            .ok_or_else(|| overflow(input))?;
        remaining = remaining
            .checked_sub(portion)
            .ok_or_else(|| overflow(input))?;

        debug!(
            range_id = %range.id,
            portion = %portion,
            contribution = %contribution,
            remaining = %remaining,
            "Applied range"
        );

        lines.push(RangeContribution {
            range_id: range.id,
            label: range.label(position),
            min_value: range.bounds.min(),
            max_value: range.bounds.max(),
            rate: basis.display(range.rate),
            portion,
            contribution,
        });
    }

    let effective_rate = if input.is_zero() {
        "0%".to_string()
    } else {
        total
            .checked_div(input)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(format_percent)
            .ok_or_else(|| overflow(input))?
    };
    let residual = input.checked_sub(total).ok_or_else(|| overflow(input))?;

    Ok(ProgressiveBreakdown {
        input,
        lines,
        total,
        residual,
        effective_rate,
    })
}

fn overflow(input: Decimal) -> EngineError {
    EngineError::CalculationOverflow { input }
}

/// The portion of `input` attributed to `range`, zero below its lower bound.
///
/// `None` when the inclusive "+1" pushes the portion past `Decimal::MAX`.
fn portion_within(input: Decimal, range: &RateRange) -> Option<Decimal> {
    let min = range.bounds.min();
    if input < min {
        return Some(Decimal::ZERO);
    }

    let upper = match range.bounds.max() {
        Some(max) => input.min(max),
        None => input,
    };
    upper.checked_sub(min)?.checked_add(Decimal::ONE)
}
