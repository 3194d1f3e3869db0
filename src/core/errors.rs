/*!
 * Error Types
 * Centralized error handling with thiserror and miette diagnostics
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reader-writer lock errors
///
/// Admission itself never fails once started (no timeouts); every variant
/// here is reported before any state change.
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", rename_all = "snake_case")]
pub enum LockError {
    #[error("Invalid lock handle")]
    #[diagnostic(
        code(lock::null_handle),
        help("The lock was destroyed or never initialized. Create a new lock.")
    )]
    NullHandle,

    #[error("Failed to initialize lock primitives")]
    #[diagnostic(
        code(lock::init_failed),
        help("Underlying monitor primitives could not be created. The run cannot continue.")
    )]
    Init,

    #[error("Release called without held access")]
    #[diagnostic(
        code(lock::not_held),
        help("Each successful acquire must be paired with exactly one release. Check for double release.")
    )]
    NotHeld,

    #[error("Lock is busy: {active_readers} active readers, writer active: {writer_active}, {waiters} waiters")]
    #[diagnostic(
        code(lock::busy),
        help("Destroy is only valid once every holder has released and no thread is waiting.")
    )]
    Busy {
        active_readers: usize,
        writer_active: bool,
        waiters: usize,
    },
}

/// Ordered set errors
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", rename_all = "snake_case")]
pub enum SetError {
    #[error("Node allocation failed for key {key}")]
    #[diagnostic(
        code(set::allocation_failure),
        help("System may be low on memory. Reduce the key count or the insert share.")
    )]
    AllocationFailure { key: u64 },
}

/// Failure of a single locked set access
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Diagnostic)]
pub enum AccessError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Set(#[from] SetError),
}

/// Workload configuration errors
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Thread count must be at least 1")]
    #[diagnostic(code(config::no_threads), help("Pass a positive thread count."))]
    NoThreads,

    #[error("{name} fraction {value} is outside [0, 1]")]
    #[diagnostic(
        code(config::fraction_out_of_range),
        help("Search and insert shares are probabilities between 0 and 1.")
    )]
    FractionOutOfRange { name: String, value: f64 },

    #[error("Search ({search}) + insert ({insert}) exceeds 1")]
    #[diagnostic(
        code(config::mix_overflow),
        help("The delete share is the remainder 1 - search - insert and cannot be negative.")
    )]
    MixOverflow { search: f64, insert: f64 },

    #[error("Key space must be at least 1")]
    #[diagnostic(code(config::empty_key_space))]
    EmptyKeySpace,

    #[error("Run count must be at least 1")]
    #[diagnostic(code(config::no_runs))]
    NoRuns,

    #[error("Invalid input for {field}: {input:?}")]
    #[diagnostic(
        code(config::invalid_input),
        help("Enter a plain number, e.g. 1000 for counts or 0.9 for fractions.")
    )]
    InvalidInput { field: String, input: String },
}

/// Errors surfaced while running a workload
#[derive(Error, Debug, Diagnostic)]
pub enum WorkloadError {
    #[error("Worker {rank} lock failure: {source}")]
    #[diagnostic(code(workload::lock_failure))]
    Lock {
        rank: usize,
        #[source]
        source: LockError,
    },

    #[error("Worker {rank} set failure: {source}")]
    #[diagnostic(code(workload::set_failure))]
    Set {
        rank: usize,
        #[source]
        source: SetError,
    },

    #[error("Worker {rank} panicked")]
    #[diagnostic(
        code(workload::worker_panicked),
        help("A worker thread panicked. Run with RUST_LOG=debug for details.")
    )]
    WorkerPanicked { rank: usize },

    #[error("Failed to spawn worker {rank}: {reason}")]
    #[diagnostic(code(workload::spawn_failed))]
    Spawn { rank: usize, reason: String },

    #[error("Set holds {actual} keys but counters imply {expected}")]
    #[diagnostic(
        code(workload::size_mismatch),
        help("Successful inserts and deletes no longer account for the final set size.")
    )]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Set keys are no longer strictly ascending")]
    #[diagnostic(code(workload::order_violation))]
    OrderViolation,

    #[error("Recorded {recorded} of {expected} operations from {folds} of {workers} workers")]
    #[diagnostic(
        code(workload::lost_updates),
        help("Per-thread counters were not folded into the aggregator exactly once.")
    )]
    LostUpdates {
        expected: u64,
        recorded: u64,
        folds: usize,
        workers: usize,
    },
}

/// Unified benchmark error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum BenchError {
    #[error("Lock error: {0}")]
    #[diagnostic(transparent)]
    Lock(#[from] LockError),

    #[error("Set error: {0}")]
    #[diagnostic(transparent)]
    Set(#[from] SetError),

    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Workload error: {0}")]
    #[diagnostic(transparent)]
    Workload(#[from] WorkloadError),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(bench::io_error),
        help("Reading interactive input or writing the summary failed.")
    )]
    Io(String),
}

impl WorkloadError {
    /// Attach the failing worker's rank to an access error
    pub fn from_access(rank: usize, err: AccessError) -> Self {
        match err {
            AccessError::Lock(source) => WorkloadError::Lock { rank, source },
            AccessError::Set(source) => WorkloadError::Set { rank, source },
        }
    }
}

impl From<AccessError> for BenchError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Lock(e) => BenchError::Lock(e),
            AccessError::Set(e) => BenchError::Set(e),
        }
    }
}

impl From<std::io::Error> for BenchError {
    fn from(err: std::io::Error) -> Self {
        BenchError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(err: serde_json::Error) -> Self {
        BenchError::Io(format!("JSON serialization failed: {}", err))
    }
}
