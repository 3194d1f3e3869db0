/*!
 * Shared Set Backends
 *
 * The ordered set wrapped in one of the supported locks. Every call
 * brackets a single set operation with the matching lock mode: read for
 * search, write for insert and delete.
 */

use super::config::LockBackend;
use crate::core::data_structures::OrderedSet;
use crate::core::errors::AccessError;
use crate::core::sync::{LockConfig, LockStats, RwCell};
use crate::core::types::{Key, OpKind};
use parking_lot::{Mutex, RwLock};

/// Result type for locked set accesses
pub type AccessResult<T> = Result<T, AccessError>;

/// Ordered set behind a lock, shareable across workers
pub trait SharedSet: Send + Sync {
    /// Membership test under read access
    fn search(&self, key: Key) -> AccessResult<bool>;

    /// Insertion under write access
    fn insert(&self, key: Key) -> AccessResult<bool>;

    /// Deletion under write access
    fn delete(&self, key: Key) -> AccessResult<bool>;

    /// Run one operation of the given class
    #[inline]
    fn apply(&self, op: OpKind, key: Key) -> AccessResult<bool> {
        match op {
            OpKind::Search => self.search(key),
            OpKind::Insert => self.insert(key),
            OpKind::Delete => self.delete(key),
        }
    }

    /// Admission statistics, if the backend records them
    fn lock_stats(&self) -> Option<LockStats> {
        None
    }

    /// Tear the lock down and hand back the set
    fn into_set(self: Box<Self>) -> AccessResult<OrderedSet>;

    /// Backend name for logs and summaries
    fn name(&self) -> &'static str;
}

impl LockBackend {
    /// Wrap a pre-populated set in this backend's lock
    pub fn wrap(self, set: OrderedSet, config: LockConfig) -> Box<dyn SharedSet> {
        match self {
            LockBackend::WriterPriority => Box::new(RwCell::with_config(set, config)),
            LockBackend::ParkingLot => Box::new(RwLock::new(set)),
            LockBackend::Mutex => Box::new(Mutex::new(set)),
        }
    }
}

impl SharedSet for RwCell<OrderedSet> {
    fn search(&self, key: Key) -> AccessResult<bool> {
        Ok(self.read()?.member(key))
    }

    fn insert(&self, key: Key) -> AccessResult<bool> {
        Ok(self.write()?.insert(key)?)
    }

    fn delete(&self, key: Key) -> AccessResult<bool> {
        Ok(self.write()?.delete(key))
    }

    fn lock_stats(&self) -> Option<LockStats> {
        Some(self.stats())
    }

    fn into_set(self: Box<Self>) -> AccessResult<OrderedSet> {
        Ok((*self).destroy()?)
    }

    fn name(&self) -> &'static str {
        "writer-priority"
    }
}

impl SharedSet for RwLock<OrderedSet> {
    fn search(&self, key: Key) -> AccessResult<bool> {
        Ok(self.read().member(key))
    }

    fn insert(&self, key: Key) -> AccessResult<bool> {
        Ok(self.write().insert(key)?)
    }

    fn delete(&self, key: Key) -> AccessResult<bool> {
        Ok(self.write().delete(key))
    }

    fn into_set(self: Box<Self>) -> AccessResult<OrderedSet> {
        Ok((*self).into_inner())
    }

    fn name(&self) -> &'static str {
        "parking-lot"
    }
}

impl SharedSet for Mutex<OrderedSet> {
    fn search(&self, key: Key) -> AccessResult<bool> {
        Ok(self.lock().member(key))
    }

    fn insert(&self, key: Key) -> AccessResult<bool> {
        Ok(self.lock().insert(key)?)
    }

    fn delete(&self, key: Key) -> AccessResult<bool> {
        Ok(self.lock().delete(key))
    }

    fn into_set(self: Box<Self>) -> AccessResult<OrderedSet> {
        Ok((*self).into_inner())
    }

    fn name(&self) -> &'static str {
        "mutex"
    }
}
