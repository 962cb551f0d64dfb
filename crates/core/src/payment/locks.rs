//! Per-payment-reference mutual exclusion.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Async locks keyed by payment reference.
///
/// Serializes materialization attempts for one reference inside this
/// process. Entries are dropped once nobody holds or waits on them.
#[derive(Default)]
pub struct ReferenceLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held for the duration of one materialization attempt. Dropping it, or
/// dropping a pending [`ReferenceLocks::acquire`], releases the map entry
/// once nobody else holds or waits on it.
pub struct ReferenceGuard<'a> {
    owner: &'a ReferenceLocks,
    reference: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ReferenceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, reference: &str) -> ReferenceGuard<'_> {
        let lock = self
            .locks
            .entry(reference.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        // Built before waiting so a dropped `acquire` still releases the entry.
        let mut held = ReferenceGuard {
            owner: self,
            reference: reference.to_string(),
            guard: None,
        };
        held.guard = Some(lock.lock_owned().await);
        held
    }

    /// Number of references currently tracked.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for ReferenceGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Map entry + nobody else holding a clone: strong count is 1.
        self.owner
            .locks
            .remove_if(&self.reference, |_, lock| Arc::strong_count(lock) == 1);
    }
}
