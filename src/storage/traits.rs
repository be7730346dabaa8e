//! Snapshot storage trait.

use std::sync::Arc;

use crate::core::Snapshot;
use crate::error::Result;
use crate::identity::SnapshotKey;

/// Persistence contract for study snapshots, keyed per identity.
///
/// Callers treat every error as "no snapshot" on load and as best-effort on
/// save; in-memory state is never rolled back because a save failed.
pub trait SnapshotStore: Send + Sync {
    /// Load the snapshot for a key.
    ///
    /// Returns `Ok(None)` if nothing has been saved yet.
    fn load(&self, key: &SnapshotKey) -> Result<Option<Snapshot>>;

    /// Save (replace) the snapshot for a key.
    fn save(&self, key: &SnapshotKey, snapshot: &Snapshot) -> Result<()>;

    /// Remove the snapshot for a key.
    ///
    /// Returns `Ok(())` even if nothing was stored.
    fn clear(&self, key: &SnapshotKey) -> Result<()>;

    /// Write out anything buffered. Stores that write through do nothing.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Lets an `Arc<T>` be shared between a session and the test that inspects it.
impl<T: SnapshotStore + ?Sized> SnapshotStore for Arc<T> {
    fn load(&self, key: &SnapshotKey) -> Result<Option<Snapshot>> {
        (**self).load(key)
    }

    fn save(&self, key: &SnapshotKey, snapshot: &Snapshot) -> Result<()> {
        (**self).save(key, snapshot)
    }

    fn clear(&self, key: &SnapshotKey) -> Result<()> {
        (**self).clear(key)
    }

    fn flush(&self) -> Result<()> {
        (**self).flush()
    }
}
