//! Bracket store for range sets.
//!
//! This module defines the [`RangeRepository`] seam the facades persist
//! through, an in-memory implementation, and the per-scope write locks that
//! serialize validate-then-write sequences.

mod locks;
mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::models::{RateRange, Scope};

pub use locks::ScopeLocks;
pub use memory::InMemoryRangeRepository;

/// Persistence for tax brackets and commission tiers.
///
/// Implementations maintain `updated_at` and `version` on every write.
#[async_trait]
pub trait RangeRepository: Send + Sync {
    /// Returns every range in the scope, ordered by tier level then lower bound.
    async fn list_scope(&self, scope: &Scope) -> EngineResult<Vec<RateRange>>;

    /// Returns one range by id.
    async fn get(&self, id: Uuid) -> EngineResult<RateRange>;

    /// Stores a new range.
    async fn insert(&self, range: RateRange) -> EngineResult<RateRange>;

    /// Overwrites a stored range if its version still equals `expected_version`.
    async fn update(&self, range: RateRange, expected_version: u32) -> EngineResult<RateRange>;

    /// Removes a range and returns it.
    async fn delete(&self, id: Uuid) -> EngineResult<RateRange>;

    /// Inserts `ranges` into `scope` as one write, first removing every
    /// existing range in the scope when `replace_existing` is set.
    async fn replace_scope(
        &self,
        scope: &Scope,
        ranges: Vec<RateRange>,
        replace_existing: bool,
    ) -> EngineResult<Vec<RateRange>>;
}
