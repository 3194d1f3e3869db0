/*!
 * Core Module
 * Fundamental types, error handling and synchronization primitives
 */

pub mod data_structures;
pub mod errors;
pub mod limits;
pub mod sync;
pub mod types;

// Re-export for convenience
pub use data_structures::OrderedSet;
pub use errors::*;
pub use sync::{LockConfig, ReleasePolicy, RwCell, WriterPriorityLock};
pub use types::*;
