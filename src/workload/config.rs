/*!
 * Workload Configuration
 *
 * Thread count, set size, operation budget, operation mix and lock
 * backend for one benchmark run.
 */

use crate::core::errors::ConfigError;
use crate::core::limits::{
    DEFAULT_INITIAL_KEYS, DEFAULT_INSERT_FRACTION, DEFAULT_KEY_SPACE, DEFAULT_SEARCH_FRACTION,
    DEFAULT_THREADS, DEFAULT_TOTAL_OPS, MIX_EPSILON,
};
use crate::core::sync::LockConfig;
use crate::core::types::OpKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Probability split across search / insert / delete
///
/// Delete is the remainder `1 - search - insert`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpMix {
    search: f64,
    insert: f64,
}

impl OpMix {
    /// Validated mix
    pub fn new(search: f64, insert: f64) -> Result<Self, ConfigError> {
        let mix = Self { search, insert };
        mix.validate()?;
        Ok(mix)
    }

    /// Check both fractions are probabilities and leave a non-negative delete share
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("search", self.search), ("insert", self.insert)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::FractionOutOfRange {
                    name: name.to_string(),
                    value,
                });
            }
        }
        if self.search + self.insert > 1.0 + MIX_EPSILON {
            return Err(ConfigError::MixOverflow {
                search: self.search,
                insert: self.insert,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn search(&self) -> f64 {
        self.search
    }

    #[inline]
    pub fn insert(&self) -> f64 {
        self.insert
    }

    #[inline]
    pub fn delete(&self) -> f64 {
        (1.0 - self.search - self.insert).max(0.0)
    }

    /// Map a uniform draw in `[0, 1)` to an operation class
    #[inline]
    pub fn select(&self, draw: f64) -> OpKind {
        if draw < self.search {
            OpKind::Search
        } else if draw < self.search + self.insert {
            OpKind::Insert
        } else {
            OpKind::Delete
        }
    }
}

impl Default for OpMix {
    fn default() -> Self {
        Self {
            search: DEFAULT_SEARCH_FRACTION,
            insert: DEFAULT_INSERT_FRACTION,
        }
    }
}

/// Which lock guards the shared set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LockBackend {
    /// Hand-built monitor lock with writer priority
    #[default]
    WriterPriority,
    /// `parking_lot::RwLock`
    ParkingLot,
    /// Single `parking_lot::Mutex` (readers serialize too)
    Mutex,
}

impl fmt::Display for LockBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LockBackend::WriterPriority => "writer-priority",
            LockBackend::ParkingLot => "parking-lot",
            LockBackend::Mutex => "mutex",
        })
    }
}

/// Complete configuration for a benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Worker thread count
    pub threads: usize,
    /// Distinct keys inserted before workers start
    pub initial_keys: usize,
    /// Operations across all workers (remainder of `total_ops / threads` is dropped)
    pub total_ops: u64,
    /// Operation class probabilities
    pub mix: OpMix,
    /// Keys are drawn from `0..key_space`
    pub key_space: u64,
    /// Lock guarding the set
    pub backend: LockBackend,
    /// Writer-priority lock settings (ignored by other backends)
    pub lock: LockConfig,
    /// Fixed seed for reproducible key streams; time-derived when `None`
    pub seed: Option<u64>,
    /// Number of repeated runs
    pub runs: u32,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self::read_heavy()
    }
}

impl WorkloadConfig {
    /// 1,000 keys, 4 threads x 25,000 ops, 90% search / 5% insert / 5% delete
    pub fn read_heavy() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            initial_keys: DEFAULT_INITIAL_KEYS,
            total_ops: DEFAULT_TOTAL_OPS,
            mix: OpMix::default(),
            key_space: DEFAULT_KEY_SPACE,
            backend: LockBackend::default(),
            lock: LockConfig::default(),
            seed: None,
            runs: 1,
        }
    }

    /// Half the operations mutate the set
    pub fn write_heavy() -> Self {
        Self {
            mix: OpMix {
                search: 0.5,
                insert: 0.25,
            },
            ..Self::read_heavy()
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_backend(mut self, backend: LockBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_mix(mut self, mix: OpMix) -> Self {
        self.mix = mix;
        self
    }

    /// Reject configurations that cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.threads == 0 {
            return Err(ConfigError::NoThreads);
        }
        if self.key_space == 0 {
            return Err(ConfigError::EmptyKeySpace);
        }
        if self.runs == 0 {
            return Err(ConfigError::NoRuns);
        }
        self.mix.validate()
    }

    /// Operations each worker performs
    #[inline]
    pub fn ops_per_thread(&self) -> u64 {
        self.total_ops / self.threads.max(1) as u64
    }

    /// Operations actually executed across all workers
    #[inline]
    pub fn expected_ops(&self) -> u64 {
        self.ops_per_thread() * self.threads as u64
    }
}
