/*!
 * rwbench
 *
 * Writer-priority reader-writer lock, the sorted ordered set it protects,
 * and a multi-threaded workload generator that drives them under
 * contention.
 */

pub mod core;
pub mod monitoring;
pub mod workload;

// Re-exports
pub use crate::core::errors::*;
pub use crate::core::sync::{LockConfig, LockMode, LockSnapshot, LockStats, ReleasePolicy, RwCell, WriterPriorityLock};
pub use crate::core::OrderedSet;
pub use monitoring::init_tracing;
pub use workload::{LockBackend, OpMix, RunSummary, WorkloadConfig, WorkloadDriver};
