//! Application state for the tiered-range engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use tracing::info;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::service::{BulkReplaceOptions, CommissionTierService, KpiDirectory, TaxBracketService};
use crate::store::{InMemoryRangeRepository, RangeRepository, ScopeLocks};

/// Shared application state.
///
/// Contains the two calculation facades. Both share one repository and one
/// lock table.
#[derive(Clone)]
pub struct AppState {
    tax: TaxBracketService,
    commission: CommissionTierService,
}

impl AppState {
    /// Creates a new application state from the two facades.
    pub fn new(tax: TaxBracketService, commission: CommissionTierService) -> Self {
        Self { tax, commission }
    }

    /// Creates an empty in-memory state for the given KPIs.
    pub fn in_memory(kpis: KpiDirectory) -> Self {
        let repository: Arc<dyn RangeRepository> = Arc::new(InMemoryRangeRepository::new());
        let locks = Arc::new(ScopeLocks::new());

        Self::new(
            TaxBracketService::new(Arc::clone(&repository), Arc::clone(&locks)),
            CommissionTierService::new(repository, locks, Arc::new(kpis)),
        )
    }

    /// Creates an in-memory state seeded from configuration.
    ///
    /// Seed brackets go through the same overlap validation as API writes;
    /// seed tiers are bulk inserted per KPI with overlap validation on.
    pub async fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let state = Self::in_memory(config.kpi_directory());

        for bracket in config.tax_brackets() {
            state.tax.create(bracket.clone()).await?;
        }

        let options = BulkReplaceOptions {
            replace_existing: true,
            validate_overlaps: true,
        };
        for kpi in config.kpis().iter().filter(|kpi| !kpi.tiers.is_empty()) {
            state
                .commission
                .bulk_replace(&kpi.id, kpi.tiers.clone(), options)
                .await?;
        }

        info!(
            tax_brackets = config.tax_brackets().len(),
            kpis = config.kpis().len(),
            "Seeded range store from configuration"
        );
        Ok(state)
    }

    /// Returns the tax bracket facade.
    pub fn tax(&self) -> &TaxBracketService {
        &self.tax
    }

    /// Returns the commission tier facade.
    pub fn commission(&self) -> &CommissionTierService {
        &self.commission
    }
}
