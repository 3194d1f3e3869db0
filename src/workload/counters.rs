/*!
 * Operation Counters
 *
 * Per-thread tallies and the mutex-protected aggregator they fold into.
 * The aggregator is separate from the lock under benchmark and is taken
 * once per worker, at completion.
 */

use crate::core::types::OpKind;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Per-thread operation tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadCounters {
    /// Completed searches
    pub search: u64,
    /// Completed insert attempts
    pub insert: u64,
    /// Completed delete attempts
    pub delete: u64,
    /// Searches that found their key
    pub search_hits: u64,
    /// Inserts that added a new key
    pub inserted: u64,
    /// Deletes that removed a key
    pub deleted: u64,
}

impl ThreadCounters {
    /// Count one completed operation and whether it took effect
    #[inline]
    pub fn record(&mut self, op: OpKind, hit: bool) {
        let hit = u64::from(hit);
        match op {
            OpKind::Search => {
                self.search += 1;
                self.search_hits += hit;
            }
            OpKind::Insert => {
                self.insert += 1;
                self.inserted += hit;
            }
            OpKind::Delete => {
                self.delete += 1;
                self.deleted += hit;
            }
        }
    }

    /// All completed operations
    #[inline]
    pub fn total(&self) -> u64 {
        self.search + self.insert + self.delete
    }

    /// Add another thread's tallies
    pub fn merge(&mut self, other: &ThreadCounters) {
        self.search += other.search;
        self.insert += other.insert;
        self.delete += other.delete;
        self.search_hits += other.search_hits;
        self.inserted += other.inserted;
        self.deleted += other.deleted;
    }

    /// Net change in set size caused by these operations
    pub fn net_growth(&self) -> i64 {
        self.inserted as i64 - self.deleted as i64
    }
}

#[derive(Debug, Default)]
struct AggregateState {
    totals: ThreadCounters,
    folds: usize,
}

/// Global totals merged from every worker
#[derive(Debug, Default)]
pub struct Aggregator {
    state: Mutex<AggregateState>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one worker's final counters into the totals
    pub fn fold(&self, local: &ThreadCounters) {
        let mut state = self.state.lock();
        state.totals.merge(local);
        state.folds += 1;
    }

    /// Current totals
    pub fn totals(&self) -> ThreadCounters {
        self.state.lock().totals
    }

    /// Number of workers folded so far
    pub fn folds(&self) -> usize {
        self.state.lock().folds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_record_and_total() {
        let mut counters = ThreadCounters::default();
        counters.record(OpKind::Search, true);
        counters.record(OpKind::Search, false);
        counters.record(OpKind::Insert, true);
        counters.record(OpKind::Delete, false);

        assert_eq!(counters.total(), 4);
        assert_eq!(counters.search_hits, 1);
        assert_eq!(counters.inserted, 1);
        assert_eq!(counters.deleted, 0);
        assert_eq!(counters.net_growth(), 1);
    }

    #[test]
    fn test_concurrent_folds() {
        let aggregator = Arc::new(Aggregator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let aggregator = aggregator.clone();
                thread::spawn(move || {
                    let mut local = ThreadCounters::default();
                    for _ in 0..100 {
                        local.record(OpKind::Search, false);
                    }
                    aggregator.fold(&local);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(aggregator.folds(), 8);
        assert_eq!(aggregator.totals().search, 800);
        assert_eq!(aggregator.totals().total(), 800);
    }
}
