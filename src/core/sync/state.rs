/*!
 * Lock State
 *
 * Admission counters owned by the writer-priority lock. Only ever touched
 * while the lock's internal mutex is held.
 */

use serde::{Deserialize, Serialize};

/// Internal admission state
#[derive(Debug, Default)]
pub(super) struct LockState {
    pub(super) active_readers: usize,
    pub(super) waiting_readers: usize,
    pub(super) waiting_writers: usize,
    pub(super) writer_active: bool,
    pub(super) destroyed: bool,
    pub(super) stats: LockStats,
}

impl LockState {
    pub(super) const fn new() -> Self {
        Self {
            active_readers: 0,
            waiting_readers: 0,
            waiting_writers: 0,
            writer_active: false,
            destroyed: false,
            stats: LockStats::new(),
        }
    }

    #[inline]
    pub(super) fn is_idle(&self) -> bool {
        self.active_readers == 0
            && !self.writer_active
            && self.waiting_readers == 0
            && self.waiting_writers == 0
    }

    pub(super) fn snapshot(&self) -> LockSnapshot {
        LockSnapshot {
            active_readers: self.active_readers,
            waiting_readers: self.waiting_readers,
            waiting_writers: self.waiting_writers,
            writer_active: self.writer_active,
            destroyed: self.destroyed,
        }
    }
}

/// Observable lock mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockMode {
    /// No holder
    Idle,
    /// `k >= 1` concurrent readers
    Reading(usize),
    /// One exclusive writer
    Writing,
}

/// Point-in-time copy of the admission counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSnapshot {
    pub active_readers: usize,
    pub waiting_readers: usize,
    pub waiting_writers: usize,
    pub writer_active: bool,
    pub destroyed: bool,
}

impl LockSnapshot {
    /// Current mode derived from the counters
    pub fn mode(&self) -> LockMode {
        if self.writer_active {
            LockMode::Writing
        } else if self.active_readers > 0 {
            LockMode::Reading(self.active_readers)
        } else {
            LockMode::Idle
        }
    }

    /// A writer and readers are never active together
    pub fn is_exclusive(&self) -> bool {
        !(self.writer_active && self.active_readers > 0)
    }
}

/// Cumulative admission statistics
///
/// Recorded inside the lock's own critical section, so the numbers are
/// exact rather than sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockStats {
    /// Completed read admissions
    pub read_acquisitions: u64,
    /// Completed write admissions
    pub write_acquisitions: u64,
    /// Read admissions that had to block at least once
    pub contended_reads: u64,
    /// Write admissions that had to block at least once
    pub contended_writes: u64,
    /// Highest number of simultaneously active readers observed
    pub peak_readers: usize,
}

impl LockStats {
    pub const fn new() -> Self {
        Self {
            read_acquisitions: 0,
            write_acquisitions: 0,
            contended_reads: 0,
            contended_writes: 0,
            peak_readers: 0,
        }
    }

    #[inline]
    pub(super) fn record_read(&mut self, blocked: bool, active_readers: usize) {
        self.read_acquisitions += 1;
        if blocked {
            self.contended_reads += 1;
        }
        self.peak_readers = self.peak_readers.max(active_readers);
    }

    #[inline]
    pub(super) fn record_write(&mut self, blocked: bool) {
        self.write_acquisitions += 1;
        if blocked {
            self.contended_writes += 1;
        }
    }

    /// Fraction of admissions that blocked (0.0 when nothing was admitted)
    pub fn contention_rate(&self) -> f64 {
        let total = self.read_acquisitions + self.write_acquisitions;
        if total == 0 {
            0.0
        } else {
            (self.contended_reads + self.contended_writes) as f64 / total as f64
        }
    }
}
