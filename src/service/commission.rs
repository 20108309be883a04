//! Commission tier facade.
//!
//! Commission tiers are scoped per KPI and carry an explicit tier level that
//! must be unique within the KPI. Only active tiers take part in a
//! commission calculation.

use std::collections::HashSet;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::kpi::KpiDirectory;
use crate::calculation::{
    calculate_progressive, validate_batch, validate_candidate, validate_no_overlap,
};
use crate::error::{EngineError, EngineResult};
use crate::models::{CommissionResult, RangeBounds, RateBasis, RateRange, Scope};
use crate::store::{RangeRepository, ScopeLocks};

fn default_active() -> bool {
    true
}

/// The fields a caller supplies to create or update a commission tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionTierInput {
    /// Explicit tier order, unique within the KPI.
    pub tier_level: u32,
    /// Inclusive lower bound.
    pub min_revenue: Decimal,
    /// Inclusive upper bound; `None` for the open-ended top tier.
    #[serde(default)]
    pub max_revenue: Option<Decimal>,
    /// Commission rate as a percentage.
    pub commission_rate: Decimal,
    /// Inactive tiers are kept but skipped by calculations.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Optional label.
    #[serde(default)]
    pub notes: Option<String>,
}

impl CommissionTierInput {
    fn into_range(self, scope: Scope, bounds: RangeBounds) -> RateRange {
        let mut range = RateRange::new(scope, bounds, self.commission_rate)
            .with_tier_level(self.tier_level)
            .with_active(self.active);
        range.notes = self.notes;
        range
    }
}

/// Options for [`CommissionTierService::bulk_replace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BulkReplaceOptions {
    /// Delete every existing tier of the KPI before inserting.
    #[serde(default)]
    pub replace_existing: bool,
    /// Run the overlap validator across the incoming list (and against
    /// kept tiers when appending). Off by default: the batch is inserted
    /// as given.
    #[serde(default)]
    pub validate_overlaps: bool,
}

/// Commission tier management and commission calculation.
#[derive(Clone)]
pub struct CommissionTierService {
    repository: Arc<dyn RangeRepository>,
    locks: Arc<ScopeLocks>,
    kpis: Arc<KpiDirectory>,
}

impl CommissionTierService {
    /// Creates the facade over a repository, a shared lock table and the
    /// KPI directory.
    pub fn new(
        repository: Arc<dyn RangeRepository>,
        locks: Arc<ScopeLocks>,
        kpis: Arc<KpiDirectory>,
    ) -> Self {
        Self {
            repository,
            locks,
            kpis,
        }
    }

    /// Returns the KPI directory.
    pub fn kpis(&self) -> &KpiDirectory {
        &self.kpis
    }

    /// Returns every tier of a KPI ordered by tier level.
    pub async fn list(&self, kpi_id: &str) -> EngineResult<Vec<RateRange>> {
        let scope = self.kpis.resolve(kpi_id)?.scope();
        self.repository.list_scope(&scope).await
    }

    /// Returns one tier.
    pub async fn get(&self, id: Uuid) -> EngineResult<RateRange> {
        let range = self.repository.get(id).await?;
        if range.scope.kpi_id().is_none() {
            return Err(EngineError::RangeNotFound { id });
        }
        Ok(range)
    }

    /// Validates and stores a new tier for a KPI.
    ///
    /// # Errors
    ///
    /// - [`EngineError::KpiNotFound`] for an unknown KPI.
    /// - [`EngineError::Validation`] for a negative rate or inverted bounds.
    /// - [`EngineError::DuplicateTierLevel`] if the level is taken.
    /// - [`EngineError::Overlap`] if the tier intersects an existing one.
    pub async fn create(&self, kpi_id: &str, input: CommissionTierInput) -> EngineResult<RateRange> {
        let scope = self.kpis.resolve(kpi_id)?.scope();
        validate_commission_rate(input.commission_rate)?;

        let _guard = self.locks.acquire(&scope).await;
        let existing = self.repository.list_scope(&scope).await?;
        ensure_level_free(&scope, input.tier_level, &existing, None)?;
        let bounds = validate_candidate(input.min_revenue, input.max_revenue, &existing, None)?;

        let stored = self
            .repository
            .insert(input.into_range(scope.clone(), bounds))
            .await?;

        info!(
            scope = %scope,
            range_id = %stored.id,
            tier_level = ?stored.tier_level,
            "Created commission tier"
        );
        Ok(stored)
    }

    /// Re-validates and overwrites an existing tier.
    pub async fn update(
        &self,
        id: Uuid,
        input: CommissionTierInput,
        expected_version: Option<u32>,
    ) -> EngineResult<RateRange> {
        validate_commission_rate(input.commission_rate)?;

        let scope = self.get(id).await?.scope;
        let _guard = self.locks.acquire(&scope).await;
        let stored = self.get(id).await?;
        let existing = self.repository.list_scope(&scope).await?;
        ensure_level_free(&scope, input.tier_level, &existing, Some(id))?;
        let bounds = validate_candidate(input.min_revenue, input.max_revenue, &existing, Some(id))?;

        let mut range = stored.clone();
        range.bounds = bounds;
        range.rate = input.commission_rate;
        range.tier_level = Some(input.tier_level);
        range.active = input.active;
        range.notes = input.notes;

        let updated = self
            .repository
            .update(range, expected_version.unwrap_or(stored.version))
            .await?;

        info!(
            scope = %scope,
            range_id = %id,
            version = updated.version,
            "Updated commission tier"
        );
        Ok(updated)
    }

    /// Removes a tier.
    pub async fn delete(&self, id: Uuid) -> EngineResult<RateRange> {
        let scope = self.get(id).await?.scope;
        let _guard = self.locks.acquire(&scope).await;
        let removed = self.repository.delete(id).await?;

        info!(scope = %scope, range_id = %id, "Deleted commission tier");
        Ok(removed)
    }

    /// Inserts a full list of tiers for a KPI in one write.
    ///
    /// Every tier is checked on its own (bounds ordering, rate, unique tier
    /// level) and the whole batch is rejected on the first failure. Overlaps
    /// between tiers are only checked when `options.validate_overlaps` is
    /// set.
    pub async fn bulk_replace(
        &self,
        kpi_id: &str,
        inputs: Vec<CommissionTierInput>,
        options: BulkReplaceOptions,
    ) -> EngineResult<Vec<RateRange>> {
        let scope = self.kpis.resolve(kpi_id)?.scope();

        let mut levels = HashSet::new();
        let mut batch = Vec::with_capacity(inputs.len());
        for input in inputs {
            validate_commission_rate(input.commission_rate)?;
            if !levels.insert(input.tier_level) {
                return Err(EngineError::DuplicateTierLevel {
                    scope,
                    tier_level: input.tier_level,
                });
            }
            let bounds = RangeBounds::new(input.min_revenue, input.max_revenue)?;
            batch.push(input.into_range(scope.clone(), bounds));
        }

        let _guard = self.locks.acquire(&scope).await;

        if !options.replace_existing {
            let existing = self.repository.list_scope(&scope).await?;
            for range in &batch {
                if let Some(level) = range.tier_level {
                    ensure_level_free(&scope, level, &existing, None)?;
                }
                if options.validate_overlaps {
                    validate_no_overlap(&range.bounds, &existing, None)?;
                }
            }
        }

        if options.validate_overlaps {
            validate_batch(&batch)?;
        }

        let stored = self
            .repository
            .replace_scope(&scope, batch, options.replace_existing)
            .await?;

        info!(
            scope = %scope,
            count = stored.len(),
            replace_existing = options.replace_existing,
            validate_overlaps = options.validate_overlaps,
            "Bulk replaced commission tiers"
        );
        Ok(stored)
    }

    /// Calculates progressive commission on `revenue` using the KPI's active
    /// tiers.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] if `revenue` is negative.
    /// - [`EngineError::KpiNotFound`] for an unknown KPI.
    /// - [`EngineError::NoRangesConfigured`] if the KPI has no active tiers.
    pub async fn calculate(&self, kpi_id: &str, revenue: Decimal) -> EngineResult<CommissionResult> {
        if revenue < Decimal::ZERO {
            return Err(EngineError::validation("revenue", "revenue must not be negative"));
        }

        let kpi = self.kpis.resolve(kpi_id)?;
        let scope = kpi.scope();
        let tiers: Vec<RateRange> = self
            .repository
            .list_scope(&scope)
            .await?
            .into_iter()
            .filter(|tier| tier.active)
            .collect();

        if tiers.is_empty() {
            warn!(scope = %scope, "No active commission tiers");
        }

        let breakdown = calculate_progressive(revenue, &scope, &tiers, RateBasis::Percent)?;
        Ok(CommissionResult::from_breakdown(&kpi.id, &kpi.name, breakdown))
    }
}

fn validate_commission_rate(rate: Decimal) -> EngineResult<()> {
    if rate < Decimal::ZERO {
        return Err(EngineError::validation(
            "commission_rate",
            format!("{} must not be negative", rate),
        ));
    }
    Ok(())
}

fn ensure_level_free(
    scope: &Scope,
    tier_level: u32,
    existing: &[RateRange],
    excluding: Option<Uuid>,
) -> EngineResult<()> {
    let taken = existing
        .iter()
        .filter(|range| Some(range.id) != excluding)
        .any(|range| range.tier_level == Some(tier_level));

    if taken {
        return Err(EngineError::DuplicateTierLevel {
            scope: scope.clone(),
            tier_level,
        });
    }
    Ok(())
}
