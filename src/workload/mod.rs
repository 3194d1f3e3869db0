/*!
 * Workload Generator
 *
 * Multi-threaded search/insert/delete workload over a lock-protected
 * ordered set.
 *
 * # Architecture
 *
 * - `WorkloadDriver` owns the run: pre-population, worker pool, timing
 * - `BenchContext` is the only shared state: the locked set plus the
 *   `Aggregator` that workers fold their `ThreadCounters` into
 * - `SharedSet` hides which lock backend guards the set
 *
 * Workers keep all counters thread-local and touch the aggregator once,
 * at exit, so aggregation never competes with the lock under benchmark.
 */

mod backend;
mod config;
mod counters;
mod driver;
mod summary;

pub use backend::{AccessResult, SharedSet};
pub use config::{LockBackend, OpMix, WorkloadConfig};
pub use counters::{Aggregator, ThreadCounters};
pub use driver::{BenchContext, Prepopulated, WorkloadDriver};
pub use summary::{RepeatedSummary, RunSummary};
