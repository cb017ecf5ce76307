//! Per-resource write serialization.
//!
//! The remote API has no compare-and-swap, so two writers racing on one ID
//! could interleave Show/diff/stage. Writers in one process take the ID's lock
//! for the whole read-modify-write sequence.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::resources::kind::Kind;

type LockKey = (Kind, String);

/// Async locks keyed by kind and resource ID.
#[derive(Debug, Clone, Default)]
pub struct ResourceLocks {
    inner: Arc<DashMap<LockKey, Arc<Mutex<()>>>>,
}

impl ResourceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one resource.
    pub async fn lock(&self, kind: Kind, id: &str) -> ResourceGuard {
        let key = (kind, id.to_string());
        let mutex = self
            .inner
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = mutex.lock_owned().await;
        ResourceGuard {
            guard: Some(guard),
            key,
            locks: self.inner.clone(),
        }
    }

    /// Number of resources with a held or awaited lock.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Exclusive access to one resource; released on drop.
#[derive(Debug)]
pub struct ResourceGuard {
    guard: Option<OwnedMutexGuard<()>>,
    key: LockKey,
    locks: Arc<DashMap<LockKey, Arc<Mutex<()>>>>,
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: nobody holds or waits for this lock.
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
