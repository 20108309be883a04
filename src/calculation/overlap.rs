//! Overlap validation for range sets.
//!
//! A range set within one scope must partition the number line without
//! overlaps. These functions are pure: the caller loads the comparison set
//! for the scope and persists the candidate only when validation passes.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{RangeBounds, RateRange};

/// Finds the first existing range whose span intersects the candidate.
///
/// The range with id `excluding` is skipped, which lets an update be
/// checked against every range except the one being replaced.
///
/// # Example
///
/// ```
/// use tier_engine::calculation::find_overlap;
/// use tier_engine::models::{RangeBounds, RateRange, Scope};
/// use rust_decimal_macros::dec;
///
/// let existing = vec![RateRange::new(
///     Scope::Global,
///     RangeBounds::new(dec!(80), Some(dec!(120))).unwrap(),
///     dec!(0.1),
/// )];
///
/// let clashing = RangeBounds::new(dec!(50), Some(dec!(100))).unwrap();
/// let clear = RangeBounds::new(dec!(50), Some(dec!(79))).unwrap();
///
/// assert!(find_overlap(&clashing, &existing, None).is_some());
/// assert!(find_overlap(&clear, &existing, None).is_none());
/// ```
pub fn find_overlap<'a>(
    candidate: &RangeBounds,
    existing: &'a [RateRange],
    excluding: Option<Uuid>,
) -> Option<&'a RateRange> {
    existing
        .iter()
        .filter(|range| Some(range.id) != excluding)
        .find(|range| candidate.intersects(&range.bounds))
}

/// Rejects the candidate with [`EngineError::Overlap`] if it intersects any
/// existing range other than `excluding`.
pub fn validate_no_overlap(
    candidate: &RangeBounds,
    existing: &[RateRange],
    excluding: Option<Uuid>,
) -> EngineResult<()> {
    match find_overlap(candidate, existing, excluding) {
        Some(conflict) => Err(overlap_error(candidate, conflict)),
        None => Ok(()),
    }
}

/// Validates raw candidate bounds against an existing set.
///
/// The candidate's own ordering (`min <= max`, `min >= 0`) is checked first
/// and reported as a validation error; only a well-formed candidate is
/// compared against the existing ranges.
pub fn validate_candidate(
    min_value: Decimal,
    max_value: Option<Decimal>,
    existing: &[RateRange],
    excluding: Option<Uuid>,
) -> EngineResult<RangeBounds> {
    let bounds = RangeBounds::new(min_value, max_value)?;
    validate_no_overlap(&bounds, existing, excluding)?;
    Ok(bounds)
}

/// Checks every pair within a batch of ranges.
///
/// Used by bulk replacement when the caller asks for the incoming list to
/// be validated as a whole.
pub fn validate_batch(ranges: &[RateRange]) -> EngineResult<()> {
    for (index, range) in ranges.iter().enumerate() {
        validate_no_overlap(&range.bounds, &ranges[index + 1..], None)?;
    }
    Ok(())
}

fn overlap_error(candidate: &RangeBounds, conflict: &RateRange) -> EngineError {
    EngineError::Overlap {
        candidate_min: candidate.min(),
        candidate_max: candidate.max(),
        existing_id: conflict.id,
        existing_min: conflict.bounds.min(),
        existing_max: conflict.bounds.max(),
    }
}
