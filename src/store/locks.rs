//! Per-scope write serialization.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::Scope;

/// Hands out one async mutex per scope.
///
/// Holding the guard across "load existing set, validate, write" keeps a
/// concurrent writer from inserting an overlapping range into the same
/// scope between the check and the write. Writers to different scopes do
/// not contend.
#[derive(Debug, Default)]
pub struct ScopeLocks {
    locks: Mutex<HashMap<Scope, Arc<Mutex<()>>>>,
}

impl ScopeLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive write access to `scope`.
    pub async fn acquire(&self, scope: &Scope) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(scope.clone()).or_default())
        };
        lock.lock_owned().await
    }
}
