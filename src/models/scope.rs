//! Scope model.
//!
//! A scope partitions ranges into independent sets. Tax brackets live in the
//! single global scope; commission tiers are scoped per KPI.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The partition key a range belongs to.
///
/// Ranges are only ever compared for overlap within the same scope.
///
/// # Example
///
/// ```
/// use tier_engine::models::Scope;
///
/// let scope = Scope::Kpi("sales_revenue".to_string());
/// assert_eq!(scope.to_string(), "KPI 'sales_revenue'");
/// assert_eq!(Scope::Global.to_string(), "global tax brackets");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "kpi_id", rename_all = "snake_case")]
pub enum Scope {
    /// The global tax bracket set.
    Global,
    /// The commission tier set of one KPI.
    Kpi(String),
}

impl Scope {
    /// Returns the KPI id when the scope is KPI-specific.
    pub fn kpi_id(&self) -> Option<&str> {
        match self {
            Scope::Global => None,
            Scope::Kpi(id) => Some(id),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => write!(f, "global tax brackets"),
            Scope::Kpi(id) => write!(f, "KPI '{}'", id),
        }
    }
}
