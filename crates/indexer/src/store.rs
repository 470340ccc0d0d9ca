//! Concurrent position-outcome index store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Shared associative store mapping `(signature, outcome)` keys to
/// observation counts.
///
/// Increments on an existing key take the shared read lock and bump an
/// atomic counter, so any number of callers can hit hot keys without
/// contention; only the first observation of a key takes the write lock.
/// Counts only ever grow and entries are never removed during a run.
#[derive(Debug, Default)]
pub struct PositionIndex {
    counters: RwLock<HashMap<String, AtomicU64>>,
}

impl PositionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically get-or-insert the counter for `key` and increment it.
    ///
    /// The final count for a key is exactly the number of `increment`
    /// calls issued for it, regardless of interleaving.
    pub fn increment(&self, key: &str) {
        {
            let counters = self.counters.read();
            if let Some(count) = counters.get(key) {
                count.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        let mut counters = self.counters.write();
        counters
            .entry(key.to_owned())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Number of distinct keys observed.
    pub fn len(&self) -> usize {
        self.counters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.read().is_empty()
    }

    /// Sum of all counts, i.e. the total number of indexed observations.
    pub fn total_observations(&self) -> u64 {
        self.counters
            .read()
            .values()
            .map(|count| count.load(Ordering::Relaxed))
            .sum()
    }

    /// Point-in-time copy of the index, sorted by key.
    ///
    /// Intended for after indexing has completed; a snapshot taken while
    /// increments are still in flight is not torn, but may or may not
    /// include them.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.counters
            .read()
            .iter()
            .map(|(key, count)| (key.clone(), count.load(Ordering::Relaxed)))
            .collect()
    }
}
