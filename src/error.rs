//! Error types for the tiered-range calculation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the bracket store, the overlap validator, the
//! progressive calculator and the calculation facades can report.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Scope;

/// The main error type for the tiered-range calculation engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use tier_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/tax_brackets.yaml".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Configuration file not found: /missing/tax_brackets.yaml"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Malformed input such as a negative income or an inverted range.
    #[error("Invalid value for '{field}': {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The candidate range intersects a range already stored for the scope.
    #[error(
        "Range [{candidate_min}, {}] overlaps existing range {existing_id} [{existing_min}, {}]",
        display_max(.candidate_max),
        display_max(.existing_max)
    )]
    Overlap {
        /// Lower bound of the rejected candidate.
        candidate_min: Decimal,
        /// Upper bound of the rejected candidate, `None` when open-ended.
        candidate_max: Option<Decimal>,
        /// Identifier of the stored range it collides with.
        existing_id: Uuid,
        /// Lower bound of the stored range.
        existing_min: Decimal,
        /// Upper bound of the stored range, `None` when open-ended.
        existing_max: Option<Decimal>,
    },

    /// A commission tier level is already taken within the KPI.
    #[error("Tier level {tier_level} already exists for {scope}")]
    DuplicateTierLevel {
        /// The scope the tier belongs to.
        scope: Scope,
        /// The duplicated tier level.
        tier_level: u32,
    },

    /// An update was based on a stale read of the range.
    #[error("Range {id} was modified concurrently (expected version {expected}, found {actual})")]
    StaleVersion {
        /// The range being updated.
        id: Uuid,
        /// The version the caller read.
        expected: u32,
        /// The version currently stored.
        actual: u32,
    },

    /// No ranges are configured for the scope being calculated.
    #[error("No ranges configured for {scope}")]
    NoRangesConfigured {
        /// The scope that has no ranges.
        scope: Scope,
    },

    /// A portion, contribution or total does not fit in a `Decimal`.
    #[error("Calculation on {input} exceeds the supported numeric range")]
    CalculationOverflow {
        /// The input that was being calculated.
        input: Decimal,
    },

    /// The range id does not exist.
    #[error("Range not found: {id}")]
    RangeNotFound {
        /// The id that was looked up.
        id: Uuid,
    },

    /// The KPI id is not known to the engine.
    #[error("KPI not found: {kpi_id}")]
    KpiNotFound {
        /// The KPI id that was looked up.
        kpi_id: String,
    },
}

impl EngineError {
    /// Shorthand for building a [`EngineError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn display_max(max: &Option<Decimal>) -> String {
    match max {
        Some(value) => value.to_string(),
        None => "∞".to_string(),
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
