//! KPI directory used to resolve commission scopes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{EngineError, EngineResult};
use crate::models::Scope;

/// A KPI known to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpi {
    /// Stable KPI identifier, also the commission scope key.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Kpi {
    /// Returns the commission scope owned by this KPI.
    pub fn scope(&self) -> Scope {
        Scope::Kpi(self.id.clone())
    }
}

/// The set of KPIs commission tiers may be attached to.
///
/// # Example
///
/// ```
/// use tier_engine::service::KpiDirectory;
///
/// let directory = KpiDirectory::new().with_kpi("sales_revenue", "Sales revenue");
/// assert_eq!(directory.resolve("sales_revenue").unwrap().name, "Sales revenue");
/// assert!(directory.resolve("unknown").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct KpiDirectory {
    kpis: BTreeMap<String, Kpi>,
}

impl KpiDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a KPI, replacing any previous entry with the same id.
    pub fn with_kpi(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        self.kpis.insert(
            id.clone(),
            Kpi {
                id,
                name: name.into(),
            },
        );
        self
    }

    /// Looks a KPI up by id.
    pub fn resolve(&self, kpi_id: &str) -> EngineResult<&Kpi> {
        self.kpis
            .get(kpi_id)
            .ok_or_else(|| EngineError::KpiNotFound {
                kpi_id: kpi_id.to_string(),
            })
    }

    /// Returns every KPI ordered by id.
    pub fn all(&self) -> impl Iterator<Item = &Kpi> {
        self.kpis.values()
    }
}
