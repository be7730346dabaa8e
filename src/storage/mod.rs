//! Snapshot storage for flipdeck.
//!
//! This module provides persistent storage for study snapshots,
//! supporting file-based and in-memory backends plus a debouncing decorator.

pub mod debounce;
pub mod file;
pub mod memory;
pub mod traits;

pub use debounce::DebouncedStore;
pub use file::FileSnapshotStore;
pub use memory::MemorySnapshotStore;
pub use traits::SnapshotStore;
