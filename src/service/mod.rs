//! Calculation facades.
//!
//! The two facades load the relevant range set, run the overlap validator on
//! writes and the progressive calculator on reads, and shape the results.

mod commission;
mod kpi;
mod tax;

pub use commission::{BulkReplaceOptions, CommissionTierInput, CommissionTierService};
pub use kpi::{Kpi, KpiDirectory};
pub use tax::{TaxBracketInput, TaxBracketService};
