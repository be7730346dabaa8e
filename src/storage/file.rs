//! File-based snapshot storage.
//!
//! Snapshots are stored as JSON files in `~/.flipdeck/snapshots/`, one per
//! snapshot key. Atomic writes are achieved via temp file + rename pattern.

use std::fs;
use std::path::PathBuf;

use crate::config::snapshots_dir;
use crate::core::Snapshot;
use crate::error::{FlipdeckError, Result};
use crate::identity::SnapshotKey;
use crate::storage::SnapshotStore;
use crate::util::{read_to_string_limited, write_atomic};

/// File-based snapshot storage.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    /// Directory where snapshot files are stored.
    snapshots_dir: PathBuf,
}

impl FileSnapshotStore {
    /// Create a store in the default directory.
    ///
    /// Uses `~/.flipdeck/snapshots/` or `$FLIPDECK_HOME/snapshots/`.
    pub fn new() -> Result<Self> {
        let dir = snapshots_dir().ok_or_else(|| {
            FlipdeckError::config("Could not determine snapshots directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a store in a custom directory, creating it if needed.
    pub fn with_dir(snapshots_dir: impl Into<PathBuf>) -> Result<Self> {
        let snapshots_dir = snapshots_dir.into();

        if !snapshots_dir.exists() {
            fs::create_dir_all(&snapshots_dir)
                .map_err(|e| FlipdeckError::storage(&snapshots_dir, e))?;
        }

        Ok(Self { snapshots_dir })
    }

    /// Path of the snapshot file for a key.
    pub fn snapshot_path(&self, key: &SnapshotKey) -> PathBuf {
        self.snapshots_dir.join(format!("{}.json", key))
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, key: &SnapshotKey) -> Result<Option<Snapshot>> {
        let path = self.snapshot_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let content = read_to_string_limited(&path)?;
        let snapshot = Snapshot::from_json(&content).map_err(|e| {
            FlipdeckError::serde(format!("corrupt snapshot {}: {}", path.display(), e))
        })?;

        Ok(Some(snapshot))
    }

    fn save(&self, key: &SnapshotKey, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        write_atomic(&self.snapshot_path(key), &json)
    }

    fn clear(&self, key: &SnapshotKey) -> Result<()> {
        let path = self.snapshot_path(key);

        if path.exists() {
            fs::remove_file(&path).map_err(|e| FlipdeckError::storage(&path, e))?;
        }

        Ok(())
    }
}
