//! Tax bracket facade.
//!
//! Owns the write path for the global bracket set (validate, then persist)
//! and the tax calculation built on the progressive calculator.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::calculation::{calculate_progressive, validate_candidate};
use crate::error::{EngineError, EngineResult};
use crate::models::{RateBasis, RateRange, Scope, TaxCalculationResult};
use crate::store::{RangeRepository, ScopeLocks};

/// The fields a caller supplies to create or update a tax bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracketInput {
    /// Inclusive lower bound.
    pub min_income: Decimal,
    /// Inclusive upper bound; `None` for the open-ended top bracket.
    #[serde(default)]
    pub max_income: Option<Decimal>,
    /// Rate as a fraction between 0 and 1.
    pub tax_rate: Decimal,
    /// Optional label.
    #[serde(default)]
    pub description: Option<String>,
}

/// Tax bracket management and tax calculation.
#[derive(Clone)]
pub struct TaxBracketService {
    repository: Arc<dyn RangeRepository>,
    locks: Arc<ScopeLocks>,
}

impl TaxBracketService {
    /// Creates the facade over a repository and a shared lock table.
    pub fn new(repository: Arc<dyn RangeRepository>, locks: Arc<ScopeLocks>) -> Self {
        Self { repository, locks }
    }

    /// Returns every bracket in ascending order.
    pub async fn list(&self) -> EngineResult<Vec<RateRange>> {
        self.repository.list_scope(&Scope::Global).await
    }

    /// Returns one bracket.
    pub async fn get(&self, id: Uuid) -> EngineResult<RateRange> {
        let range = self.repository.get(id).await?;
        if range.scope != Scope::Global {
            return Err(EngineError::RangeNotFound { id });
        }
        Ok(range)
    }

    /// Validates and stores a new bracket.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] for a rate outside `0..=1` or inverted bounds.
    /// - [`EngineError::Overlap`] if the bracket intersects an existing one.
    pub async fn create(&self, input: TaxBracketInput) -> EngineResult<RateRange> {
        validate_tax_rate(input.tax_rate)?;

        let _guard = self.locks.acquire(&Scope::Global).await;
        let existing = self.repository.list_scope(&Scope::Global).await?;
        let bounds = validate_candidate(input.min_income, input.max_income, &existing, None)?;

        let mut range = RateRange::new(Scope::Global, bounds, input.tax_rate);
        range.notes = input.description;
        let stored = self.repository.insert(range).await?;

        info!(range_id = %stored.id, min = %stored.bounds.min(), "Created tax bracket");
        Ok(stored)
    }

    /// Re-validates and overwrites an existing bracket.
    ///
    /// The bracket is compared against every other bracket but itself. When
    /// `expected_version` is given the write is rejected if the bracket has
    /// been modified since that version was read.
    pub async fn update(
        &self,
        id: Uuid,
        input: TaxBracketInput,
        expected_version: Option<u32>,
    ) -> EngineResult<RateRange> {
        validate_tax_rate(input.tax_rate)?;

        let _guard = self.locks.acquire(&Scope::Global).await;
        let stored = self.get(id).await?;
        let existing = self.repository.list_scope(&Scope::Global).await?;
        let bounds = validate_candidate(input.min_income, input.max_income, &existing, Some(id))?;

        let mut range = stored.clone();
        range.bounds = bounds;
        range.rate = input.tax_rate;
        range.notes = input.description;

        let updated = self
            .repository
            .update(range, expected_version.unwrap_or(stored.version))
            .await?;

        info!(range_id = %id, version = updated.version, "Updated tax bracket");
        Ok(updated)
    }

    /// Removes a bracket.
    pub async fn delete(&self, id: Uuid) -> EngineResult<RateRange> {
        let _guard = self.locks.acquire(&Scope::Global).await;
        self.get(id).await?;
        let removed = self.repository.delete(id).await?;

        info!(range_id = %id, "Deleted tax bracket");
        Ok(removed)
    }

    /// Calculates progressive tax on `income` against the current brackets.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] if `income` is negative.
    /// - [`EngineError::NoRangesConfigured`] if no brackets exist.
    pub async fn calculate(&self, income: Decimal) -> EngineResult<TaxCalculationResult> {
        if income < Decimal::ZERO {
            return Err(EngineError::validation("income", "income must not be negative"));
        }

        let brackets = self.repository.list_scope(&Scope::Global).await?;
        let breakdown =
            calculate_progressive(income, &Scope::Global, &brackets, RateBasis::Fraction)?;
        Ok(breakdown.into())
    }
}

fn validate_tax_rate(rate: Decimal) -> EngineResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(EngineError::validation(
            "tax_rate",
            format!("{} must be a fraction between 0 and 1", rate),
        ));
    }
    Ok(())
}
