/*!
 * Lock-Protected Cell
 *
 * Pairs a [`WriterPriorityLock`] with the data it protects so that every
 * access is bracketed by the matching lock mode.
 *
 * The inner lock is never handed out. Its admission state only changes
 * through guards, so a live guard always matches the lock's mode.
 */

use super::rwlock::{ReadLease, WriteLease, WriterPriorityLock};
use super::state::{LockSnapshot, LockStats};
use super::LockConfig;
use crate::core::types::LockResult;
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

/// Data guarded by a writer-priority lock
///
/// Only the guards can acquire or release the inner lock:
///
/// ```compile_fail
/// use rwbench::core::sync::RwCell;
///
/// let cell = RwCell::new(0u32);
/// let _w = cell.write().unwrap();
/// cell.lock().release().unwrap();
/// ```
pub struct RwCell<T> {
    lock: WriterPriorityLock,
    value: UnsafeCell<T>,
}

// SAFETY: shared access to `value` only happens through guards, which hold
// read admission (shared refs) or write admission (the unique mutable ref).
unsafe impl<T: Send> Send for RwCell<T> {}
unsafe impl<T: Send + Sync> Sync for RwCell<T> {}

impl<T> RwCell<T> {
    /// Wrap `value` with a strict-release lock
    pub const fn new(value: T) -> Self {
        Self::with_config(value, LockConfig::strict())
    }

    /// Wrap `value` with a lock using `config`
    pub const fn with_config(value: T, config: LockConfig) -> Self {
        Self {
            lock: WriterPriorityLock::with_config(config),
            value: UnsafeCell::new(value),
        }
    }

    /// Shared access under read admission
    pub fn read(&self) -> LockResult<RwCellReadGuard<'_, T>> {
        let lease = self.lock.read()?;
        Ok(RwCellReadGuard {
            cell: self,
            _lease: lease,
        })
    }

    /// Exclusive access under write admission
    pub fn write(&self) -> LockResult<RwCellWriteGuard<'_, T>> {
        let lease = self.lock.write()?;
        Ok(RwCellWriteGuard {
            cell: self,
            _lease: lease,
        })
    }

    /// Copy of the inner lock's admission counters
    pub fn snapshot(&self) -> LockSnapshot {
        self.lock.snapshot()
    }

    /// Cumulative admission statistics of the inner lock
    pub fn stats(&self) -> LockStats {
        self.lock.stats()
    }

    /// Tear the inner lock down and return the data
    ///
    /// Owning the cell proves no guard is alive, so this only fails if the
    /// lock was already destroyed.
    pub fn destroy(self) -> LockResult<T> {
        self.lock.destroy()?;
        Ok(self.value.into_inner())
    }

    /// Consume the cell, returning the data
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for RwCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Shared view of an [`RwCell`]
pub struct RwCellReadGuard<'a, T> {
    cell: &'a RwCell<T>,
    _lease: ReadLease<'a>,
}

impl<T> Deref for RwCellReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: read admission excludes any writer for the guard's lifetime.
        unsafe { &*self.cell.value.get() }
    }
}

/// Exclusive view of an [`RwCell`]
pub struct RwCellWriteGuard<'a, T> {
    cell: &'a RwCell<T>,
    _lease: WriteLease<'a>,
}

impl<T> Deref for RwCellWriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: write admission excludes every other holder.
        unsafe { &*self.cell.value.get() }
    }
}

impl<T> DerefMut for RwCellWriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: write admission excludes every other holder.
        unsafe { &mut *self.cell.value.get() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::LockMode;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_read_write_access() {
        let cell = RwCell::new(vec![1, 2]);
        {
            let mut w = cell.write().unwrap();
            w.push(3);
            assert_eq!(cell.snapshot().mode(), LockMode::Writing);
        }
        let r1 = cell.read().unwrap();
        let r2 = cell.read().unwrap();
        assert_eq!(*r1, vec![1, 2, 3]);
        assert_eq!(r2.len(), 3);
        assert_eq!(cell.snapshot().mode(), LockMode::Reading(2));
    }

    #[test]
    fn test_write_guard_holds_mode_until_dropped() {
        let cell = Arc::new(RwCell::new(vec![1]));
        let mut w = cell.write().unwrap();

        let reader = {
            let cell = cell.clone();
            thread::spawn(move || cell.read().unwrap().clone())
        };
        while cell.snapshot().waiting_readers == 0 {
            thread::sleep(Duration::from_millis(1));
        }

        // The reader stays parked while the writer mutates.
        assert_eq!(cell.snapshot().mode(), LockMode::Writing);
        w.push(2);
        assert_eq!(cell.snapshot().mode(), LockMode::Writing);
        drop(w);

        assert_eq!(reader.join().unwrap(), vec![1, 2]);
        assert_eq!(cell.snapshot().mode(), LockMode::Idle);
        assert_eq!(cell.stats().contended_reads, 1);
    }

    #[test]
    fn test_destroy_returns_value() {
        let cell = RwCell::new(String::from("keys"));
        drop(cell.read().unwrap());
        assert_eq!(cell.destroy().unwrap(), "keys");
    }

    #[test]
    fn test_concurrent_increments() {
        let cell = Arc::new(RwCell::new(0u64));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = cell.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        *cell.write().unwrap() += 1;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let cell = Arc::try_unwrap(cell).ok().unwrap();
        assert_eq!(cell.into_inner(), 8000);
    }
}
