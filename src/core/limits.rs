/*!
 * Benchmark Limits and Constants
 *
 * Centralized location for defaults and thresholds used by the workload
 * harness. Grouped by domain.
 */

// =============================================================================
// KEY SPACE
// =============================================================================

/// Keys are drawn uniformly from `0..DEFAULT_KEY_SPACE`
pub const DEFAULT_KEY_SPACE: u64 = 100_000_000;

/// Pre-population gives up after `initial_keys * PREPOPULATE_ATTEMPT_FACTOR` draws
pub const PREPOPULATE_ATTEMPT_FACTOR: usize = 2;

/// Seed for the single-threaded pre-population stream when none is configured
pub const DEFAULT_PREPOPULATE_SEED: u64 = 1;

// =============================================================================
// OPERATION MIX
// =============================================================================

/// Tolerance when checking that search + insert does not exceed 1
pub const MIX_EPSILON: f64 = 1e-9;

/// Default search share
pub const DEFAULT_SEARCH_FRACTION: f64 = 0.9;

/// Default insert share (delete takes the remainder)
pub const DEFAULT_INSERT_FRACTION: f64 = 0.05;

// =============================================================================
// WORKLOAD SIZE
// =============================================================================

/// Default number of keys inserted before workers start
pub const DEFAULT_INITIAL_KEYS: usize = 1_000;

/// Default number of operations across all workers
pub const DEFAULT_TOTAL_OPS: u64 = 100_000;

/// Default worker count
pub const DEFAULT_THREADS: usize = 4;

/// Thread-name prefix for workers (shows up in tracing output)
pub const WORKER_THREAD_PREFIX: &str = "worker";
