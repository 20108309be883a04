//! Range model and related types.
//!
//! This module defines [`RangeBounds`], the explicit bounded/open-ended
//! interval used by both tax brackets and commission tiers, and
//! [`RateRange`], the stored entity that carries a rate for one interval.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Scope;
use crate::error::{EngineError, EngineResult};

/// An inclusive interval of the input domain.
///
/// The open-ended top range is modelled as its own variant so that every
/// comparison against "+∞" is explicit.
///
/// # Example
///
/// ```
/// use tier_engine::models::RangeBounds;
/// use rust_decimal::Decimal;
///
/// let lower = RangeBounds::new(Decimal::ZERO, Some(Decimal::from(100))).unwrap();
/// let upper = RangeBounds::new(Decimal::from(101), None).unwrap();
///
/// assert!(!lower.intersects(&upper));
/// assert!(upper.is_open_ended());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeBounds {
    /// A range with both an inclusive lower and an inclusive upper bound.
    Bounded {
        /// Inclusive lower bound.
        min: Decimal,
        /// Inclusive upper bound.
        max: Decimal,
    },
    /// A range that extends to infinity.
    Unbounded {
        /// Inclusive lower bound.
        min: Decimal,
    },
}

impl RangeBounds {
    /// Builds bounds from a lower bound and an optional upper bound.
    ///
    /// Fails with a validation error when `min` is negative or when `max`
    /// lies below `min`.
    pub fn new(min: Decimal, max: Option<Decimal>) -> EngineResult<Self> {
        if min < Decimal::ZERO {
            return Err(EngineError::validation(
                "min_value",
                format!("lower bound {} must not be negative", min),
            ));
        }

        match max {
            Some(max) if max < min => Err(EngineError::validation(
                "max_value",
                format!("upper bound {} is below lower bound {}", max, min),
            )),
            Some(max) => Ok(RangeBounds::Bounded { min, max }),
            None => Ok(RangeBounds::Unbounded { min }),
        }
    }

    /// Returns the inclusive lower bound.
    pub fn min(&self) -> Decimal {
        match *self {
            RangeBounds::Bounded { min, .. } | RangeBounds::Unbounded { min } => min,
        }
    }

    /// Returns the inclusive upper bound, or `None` for an open-ended range.
    pub fn max(&self) -> Option<Decimal> {
        match *self {
            RangeBounds::Bounded { max, .. } => Some(max),
            RangeBounds::Unbounded { .. } => None,
        }
    }

    /// Returns true if the range has no upper bound.
    pub fn is_open_ended(&self) -> bool {
        matches!(self, RangeBounds::Unbounded { .. })
    }

    /// Returns true if `value` lies inside the inclusive span.
    pub fn contains(&self, value: Decimal) -> bool {
        match *self {
            RangeBounds::Bounded { min, max } => min <= value && value <= max,
            RangeBounds::Unbounded { min } => min <= value,
        }
    }

    /// Returns true if the inclusive spans of the two ranges share any point.
    ///
    /// `A.min <= (B.max ?? +∞) && B.min <= (A.max ?? +∞)`
    ///
    /// # Example
    ///
    /// ```
    /// use tier_engine::models::RangeBounds;
    /// use rust_decimal::Decimal;
    ///
    /// let existing = RangeBounds::new(Decimal::from(80), Some(Decimal::from(120))).unwrap();
    /// let clashing = RangeBounds::new(Decimal::from(50), Some(Decimal::from(100))).unwrap();
    /// let clear = RangeBounds::new(Decimal::from(50), Some(Decimal::from(79))).unwrap();
    ///
    /// assert!(clashing.intersects(&existing));
    /// assert!(!clear.intersects(&existing));
    /// ```
    pub fn intersects(&self, other: &RangeBounds) -> bool {
        let self_reaches_other = other.max().is_none_or(|max| self.min() <= max);
        let other_reaches_self = self.max().is_none_or(|max| other.min() <= max);
        self_reaches_other && other_reaches_self
    }
}

/// A stored range carrying a rate: a tax bracket or a commission tier.
///
/// Tax brackets use [`Scope::Global`] and leave `tier_level` empty;
/// commission tiers use [`Scope::Kpi`] and carry an explicit, unique
/// `tier_level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRange {
    /// Stable surrogate identifier.
    pub id: Uuid,
    /// The scope the range belongs to.
    pub scope: Scope,
    /// The interval the rate applies to.
    pub bounds: RangeBounds,
    /// The rate applied to the portion of input inside the range.
    pub rate: Decimal,
    /// Explicit tier order for commission tiers.
    pub tier_level: Option<u32>,
    /// Inactive ranges are skipped by calculations.
    pub active: bool,
    /// Free-text label.
    pub notes: Option<String>,
    /// When the range was first stored.
    pub created_at: DateTime<Utc>,
    /// When the range was last written.
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency token, bumped on every update.
    pub version: u32,
}

impl RateRange {
    /// Creates a fresh, active range with a new id and current timestamps.
    pub fn new(scope: Scope, bounds: RangeBounds, rate: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            scope,
            bounds,
            rate,
            tier_level: None,
            active: true,
            notes: None,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Sets the commission tier level.
    pub fn with_tier_level(mut self, tier_level: u32) -> Self {
        self.tier_level = Some(tier_level);
        self
    }

    /// Sets the free-text label.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets whether the range participates in calculations.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Returns the display label for the range at `position` in a sorted set.
    ///
    /// Notes win when present; otherwise tiers are named by their level and
    /// brackets by their 1-based position.
    pub fn label(&self, position: usize) -> String {
        match (&self.notes, self.tier_level) {
            (Some(notes), _) if !notes.trim().is_empty() => notes.clone(),
            (_, Some(level)) => format!("Tier {}", level),
            _ => format!("Bracket {}", position + 1),
        }
    }
}
