//! In-memory range repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::RangeRepository;
use crate::error::{EngineError, EngineResult};
use crate::models::{RateRange, Scope};

/// A [`RangeRepository`] that keeps every range in a map behind a lock.
///
/// Reads take a snapshot of the scope, so calculations never observe a
/// half-applied bulk replacement.
#[derive(Debug, Default)]
pub struct InMemoryRangeRepository {
    ranges: RwLock<HashMap<Uuid, RateRange>>,
}

impl InMemoryRangeRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_for_listing(ranges: &mut [RateRange]) {
    ranges.sort_by(|a, b| {
        a.tier_level
            .cmp(&b.tier_level)
            .then_with(|| a.bounds.min().cmp(&b.bounds.min()))
    });
}

#[async_trait]
impl RangeRepository for InMemoryRangeRepository {
    async fn list_scope(&self, scope: &Scope) -> EngineResult<Vec<RateRange>> {
        let ranges = self.ranges.read().await;
        let mut in_scope: Vec<RateRange> = ranges
            .values()
            .filter(|range| &range.scope == scope)
            .cloned()
            .collect();
        sort_for_listing(&mut in_scope);
        Ok(in_scope)
    }

    async fn get(&self, id: Uuid) -> EngineResult<RateRange> {
        self.ranges
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(EngineError::RangeNotFound { id })
    }

    async fn insert(&self, range: RateRange) -> EngineResult<RateRange> {
        self.ranges.write().await.insert(range.id, range.clone());
        Ok(range)
    }

    async fn update(&self, mut range: RateRange, expected_version: u32) -> EngineResult<RateRange> {
        let mut ranges = self.ranges.write().await;
        let stored = ranges
            .get(&range.id)
            .ok_or(EngineError::RangeNotFound { id: range.id })?;

        if stored.version != expected_version {
            return Err(EngineError::StaleVersion {
                id: range.id,
                expected: expected_version,
                actual: stored.version,
            });
        }

        range.created_at = stored.created_at;
        range.version = stored.version + 1;
        range.updated_at = Utc::now();
        ranges.insert(range.id, range.clone());
        Ok(range)
    }

    async fn delete(&self, id: Uuid) -> EngineResult<RateRange> {
        self.ranges
            .write()
            .await
            .remove(&id)
            .ok_or(EngineError::RangeNotFound { id })
    }

    async fn replace_scope(
        &self,
        scope: &Scope,
        ranges: Vec<RateRange>,
        replace_existing: bool,
    ) -> EngineResult<Vec<RateRange>> {
        let mut stored = self.ranges.write().await;
        if replace_existing {
            stored.retain(|_, range| &range.scope != scope);
        }
        for range in &ranges {
            stored.insert(range.id, range.clone());
        }
        Ok(ranges)
    }
}
