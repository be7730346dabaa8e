//! Debounced snapshot writes.
//!
//! Reviews come in bursts, so [`DebouncedStore`] holds the latest snapshot per
//! key and writes it once the configured quiet period has passed without a new
//! save. A background thread owns the timer. `flush` and `Drop` write whatever
//! is still pending; `clear` cancels it.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::core::Snapshot;
use crate::error::Result;
use crate::identity::SnapshotKey;
use crate::storage::SnapshotStore;

#[derive(Default)]
struct Pending {
    writes: HashMap<SnapshotKey, Snapshot>,
    deadline: Option<Instant>,
    shutdown: bool,
}

struct Shared<S> {
    inner: S,
    pending: Mutex<Pending>,
    wake: Condvar,
    // Held while writes move from `pending` into `inner`. Loads and clears
    // take it too, so they never see a write that is in neither place.
    write_lock: Mutex<()>,
}

impl<S: SnapshotStore> Shared<S> {
    fn lock_pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_pending(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let writes = {
            let mut pending = self.lock_pending();
            pending.deadline = None;
            std::mem::take(&mut pending.writes)
        };

        let mut first_err = None;
        for (key, snapshot) in writes {
            if let Err(e) = self.inner.save(&key, &snapshot) {
                tracing::debug!(key = %key, error = %e, "snapshot write failed");
                first_err.get_or_insert(e);
            }
        }

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn run_worker<S: SnapshotStore>(shared: Arc<Shared<S>>) {
    let mut pending = shared.lock_pending();
    loop {
        if pending.shutdown {
            return;
        }
        match pending.deadline {
            None => {
                pending = shared
                    .wake
                    .wait(pending)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    drop(pending);
                    if let Err(e) = shared.write_pending() {
                        tracing::warn!(error = %e, "debounced snapshot save failed");
                    }
                    pending = shared.lock_pending();
                } else {
                    pending = shared
                        .wake
                        .wait_timeout(pending, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0;
                }
            }
        }
    }
}

/// A [`SnapshotStore`] decorator that coalesces bursts of saves.
///
/// Last write wins per key. Loads see pending writes. A zero delay makes the
/// store write through without a background thread.
pub struct DebouncedStore<S: SnapshotStore + 'static> {
    shared: Arc<Shared<S>>,
    delay: Duration,
    worker: Option<JoinHandle<()>>,
}

impl<S: SnapshotStore + 'static> DebouncedStore<S> {
    pub fn new(inner: S, delay: Duration) -> Self {
        let shared = Arc::new(Shared {
            inner,
            pending: Mutex::new(Pending::default()),
            wake: Condvar::new(),
            write_lock: Mutex::new(()),
        });

        let worker = if delay.is_zero() {
            None
        } else {
            let worker_shared = Arc::clone(&shared);
            match thread::Builder::new()
                .name("flipdeck-save".to_string())
                .spawn(move || run_worker(worker_shared))
            {
                Ok(handle) => Some(handle),
                Err(e) => {
                    tracing::warn!(error = %e, "could not start save thread, writing through");
                    None
                }
            }
        };

        Self {
            shared,
            delay,
            worker,
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.shared.inner
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether any write is waiting for its quiet period.
    pub fn has_pending(&self) -> bool {
        !self.shared.lock_pending().writes.is_empty()
    }
}

impl<S: SnapshotStore + 'static> SnapshotStore for DebouncedStore<S> {
    fn load(&self, key: &SnapshotKey) -> Result<Option<Snapshot>> {
        let _guard = self
            .shared
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(snapshot) = self.shared.lock_pending().writes.get(key) {
            return Ok(Some(snapshot.clone()));
        }
        self.shared.inner.load(key)
    }

    fn save(&self, key: &SnapshotKey, snapshot: &Snapshot) -> Result<()> {
        if self.worker.is_none() {
            return self.shared.inner.save(key, snapshot);
        }

        let mut pending = self.shared.lock_pending();
        pending.writes.insert(key.clone(), snapshot.clone());
        pending.deadline = Some(Instant::now() + self.delay);
        self.shared.wake.notify_one();
        Ok(())
    }

    fn clear(&self, key: &SnapshotKey) -> Result<()> {
        let _guard = self
            .shared
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        {
            let mut pending = self.shared.lock_pending();
            pending.writes.remove(key);
            if pending.writes.is_empty() {
                pending.deadline = None;
            }
        }
        self.shared.inner.clear(key)
    }

    fn flush(&self) -> Result<()> {
        self.shared.write_pending()?;
        self.shared.inner.flush()
    }
}

impl<S: SnapshotStore + 'static> Drop for DebouncedStore<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.worker.take() {
            self.shared.lock_pending().shutdown = true;
            self.shared.wake.notify_one();
            if handle.join().is_err() {
                tracing::warn!("save thread panicked");
            }
        }
        if let Err(e) = self.shared.write_pending() {
            tracing::warn!(error = %e, "final snapshot save failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::storage::traits::tests::{sample_snapshot, test_snapshot_store_contract};
    use crate::storage::MemorySnapshotStore;
    use std::sync::mpsc;

    const LONG: Duration = Duration::from_secs(30);

    fn versioned(know_count: u32) -> Snapshot {
        let mut snapshot = sample_snapshot();
        snapshot.cards[0].know_count = know_count;
        snapshot
    }

    #[test]
    fn test_debounced_store_contract() {
        let store = DebouncedStore::new(MemorySnapshotStore::new(), LONG);
        test_snapshot_store_contract(&store);
    }

    #[test]
    fn test_burst_is_coalesced() {
        let inner = Arc::new(MemorySnapshotStore::new());
        let store = DebouncedStore::new(Arc::clone(&inner), LONG);
        let key = Identity::Anonymous.snapshot_key();

        for i in 1..=5 {
            store.save(&key, &versioned(i)).unwrap();
        }

        assert_eq!(inner.save_count(), 0);
        assert!(store.has_pending());
        // Pending write is visible before it lands
        assert_eq!(store.load(&key).unwrap().unwrap().cards[0].know_count, 5);

        store.flush().unwrap();

        assert_eq!(inner.save_count(), 1);
        assert_eq!(inner.load(&key).unwrap().unwrap().cards[0].know_count, 5);
        assert!(!store.has_pending());
    }

    #[test]
    fn test_write_lands_after_quiet_period() {
        let inner = Arc::new(MemorySnapshotStore::new());
        let store = DebouncedStore::new(Arc::clone(&inner), Duration::from_millis(20));
        let key = Identity::Anonymous.snapshot_key();

        store.save(&key, &versioned(1)).unwrap();
        store.save(&key, &versioned(2)).unwrap();

        let start = Instant::now();
        while inner.save_count() == 0 && start.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(inner.save_count(), 1);
        assert_eq!(inner.load(&key).unwrap().unwrap().cards[0].know_count, 2);
    }

    /// Store whose `save` reports that it started, then waits to be released.
    struct GatedStore {
        inner: MemorySnapshotStore,
        started: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl SnapshotStore for GatedStore {
        fn load(&self, key: &SnapshotKey) -> Result<Option<Snapshot>> {
            self.inner.load(key)
        }

        fn save(&self, key: &SnapshotKey, snapshot: &Snapshot) -> Result<()> {
            let _ = self.started.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
            self.inner.save(key, snapshot)
        }

        fn clear(&self, key: &SnapshotKey) -> Result<()> {
            self.inner.clear(key)
        }
    }

    #[test]
    fn test_load_during_write_sees_new_snapshot() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let store = DebouncedStore::new(
            GatedStore {
                inner: MemorySnapshotStore::new(),
                started: Mutex::new(started_tx),
                release: Mutex::new(release_rx),
            },
            LONG,
        );
        let key = Identity::Anonymous.snapshot_key();
        store.save(&key, &versioned(3)).unwrap();

        thread::scope(|s| {
            let writer = s.spawn(|| store.flush());
            // The write has left the pending map but not reached the inner store
            started_rx.recv().unwrap();
            let reader = s.spawn(|| store.load(&key));
            thread::sleep(Duration::from_millis(20));
            release_tx.send(()).unwrap();

            writer.join().unwrap().unwrap();
            let loaded = reader.join().unwrap().unwrap().unwrap();
            assert_eq!(loaded.cards[0].know_count, 3);
        });
    }

    #[test]
    fn test_clear_cancels_pending_write() {
        let inner = Arc::new(MemorySnapshotStore::new());
        let store = DebouncedStore::new(Arc::clone(&inner), LONG);
        let key = Identity::Anonymous.snapshot_key();

        store.save(&key, &versioned(1)).unwrap();
        store.clear(&key).unwrap();
        store.flush().unwrap();

        assert_eq!(inner.save_count(), 0);
        assert!(store.load(&key).unwrap().is_none());
    }

    #[test]
    fn test_clear_keeps_other_keys_pending() {
        let inner = Arc::new(MemorySnapshotStore::new());
        let store = DebouncedStore::new(Arc::clone(&inner), LONG);
        let local = Identity::Anonymous.snapshot_key();
        let user = Identity::User("ada".to_string()).snapshot_key();

        store.save(&local, &versioned(1)).unwrap();
        store.save(&user, &versioned(2)).unwrap();
        store.clear(&local).unwrap();
        store.flush().unwrap();

        assert!(inner.load(&local).unwrap().is_none());
        assert_eq!(inner.load(&user).unwrap().unwrap().cards[0].know_count, 2);
    }

    #[test]
    fn test_drop_flushes() {
        let inner = Arc::new(MemorySnapshotStore::new());
        let key = Identity::Anonymous.snapshot_key();
        {
            let store = DebouncedStore::new(Arc::clone(&inner), LONG);
            store.save(&key, &versioned(4)).unwrap();
        }

        assert_eq!(inner.save_count(), 1);
        assert_eq!(inner.load(&key).unwrap().unwrap().cards[0].know_count, 4);
    }

    #[test]
    fn test_zero_delay_writes_through() {
        let inner = Arc::new(MemorySnapshotStore::new());
        let store = DebouncedStore::new(Arc::clone(&inner), Duration::ZERO);
        let key = Identity::Anonymous.snapshot_key();

        store.save(&key, &versioned(1)).unwrap();
        store.save(&key, &versioned(2)).unwrap();

        assert_eq!(inner.save_count(), 2);
        assert!(!store.has_pending());
    }

    #[test]
    fn test_flush_reports_failure() {
        let inner = Arc::new(MemorySnapshotStore::new());
        let store = DebouncedStore::new(Arc::clone(&inner), LONG);
        let key = Identity::Anonymous.snapshot_key();

        inner.set_fail_saves(true);
        store.save(&key, &versioned(1)).unwrap();
        assert!(store.flush().is_err());

        // The failed write is dropped, not retried
        inner.set_fail_saves(false);
        store.flush().unwrap();
        assert_eq!(inner.save_count(), 0);
    }
}
