/*!
 * Core Types
 * Common type definitions used across the benchmark
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered-set key
pub type Key = u64;

/// Result type for lock operations
pub type LockResult<T> = Result<T, super::errors::LockError>;

/// Result type for ordered-set operations
pub type SetResult<T> = Result<T, super::errors::SetError>;

/// Operation class selected by a worker for each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Membership query, taken under the read lock
    Search,
    /// Insertion, taken under the write lock
    Insert,
    /// Deletion, taken under the write lock
    Delete,
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpKind::Search => "search",
            OpKind::Insert => "insert",
            OpKind::Delete => "delete",
        })
    }
}
