//! Calculation logic for the tiered-range engine.
//!
//! This module contains the overlap validator that guards every write to a
//! range set, the progressive calculator shared by tax brackets and
//! commission tiers, and the rounding helpers both rely on.

mod overlap;
mod progressive;
mod rounding;

pub use overlap::{find_overlap, validate_batch, validate_candidate, validate_no_overlap};
pub use progressive::calculate_progressive;
pub use rounding::{format_percent, round_currency};
