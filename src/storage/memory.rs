//! In-memory snapshot storage for testing.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::core::Snapshot;
use crate::error::{FlipdeckError, Result};
use crate::identity::SnapshotKey;
use crate::storage::SnapshotStore;

/// In-memory snapshot store.
///
/// Thread-safe via `RwLock<HashMap>`. Counts saves so tests can observe
/// debouncing, and can be told to fail saves to exercise fail-open paths.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<String, Snapshot>>,
    save_count: RwLock<usize>,
    fail_saves: RwLock<bool>,
}

impl MemorySnapshotStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.snapshots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no snapshots.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        *self.save_count.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.write().unwrap_or_else(PoisonError::into_inner) = fail;
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &SnapshotKey) -> Result<Option<Snapshot>> {
        let snapshots = self.snapshots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(snapshots.get(key.as_str()).cloned())
    }

    fn save(&self, key: &SnapshotKey, snapshot: &Snapshot) -> Result<()> {
        if *self.fail_saves.read().unwrap_or_else(PoisonError::into_inner) {
            return Err(FlipdeckError::serde("simulated save failure"));
        }
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.as_str().to_string(), snapshot.clone());
        *self.save_count.write().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }

    fn clear(&self, key: &SnapshotKey) -> Result<()> {
        self.snapshots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key.as_str());
        Ok(())
    }
}
