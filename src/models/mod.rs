//! Domain models for the tiered-range calculation engine.
//!
//! This module contains the range entity shared by tax brackets and
//! commission tiers, the scope that partitions range sets, and the
//! calculation results.

mod calculation_result;
mod range;
mod scope;

pub use calculation_result::{
    CommissionResult, CommissionTierDetail, ProgressiveBreakdown, RangeContribution, RateBasis,
    TaxCalculationResult, TaxDetail,
};
pub use range::{RangeBounds, RateRange};
pub use scope::Scope;
