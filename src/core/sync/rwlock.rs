/*!
 * Writer-Priority Reader-Writer Lock
 *
 * Monitor-based lock (one mutex, one condvar per waiter class) admitting
 * either many concurrent readers or one exclusive writer.
 *
 * # Admission Policy
 *
 * - A reader waits while a writer is active **or waiting**, so a writer
 *   is never overtaken by readers that arrive after it.
 * - A writer waits while any reader or another writer is active.
 * - Writer release wakes exactly one waiting writer if there is one,
 *   otherwise broadcasts to all waiting readers.
 * - The last reader out wakes one waiting writer.
 *
 * Among writers there is no FIFO guarantee; whichever parked writer the
 * condvar picks goes next.
 */

use super::config::{LockConfig, ReleasePolicy};
use super::state::{LockSnapshot, LockState, LockStats};
use crate::core::errors::LockError;
use crate::core::types::LockResult;
use parking_lot::{Condvar, Mutex};
use tracing::{error, trace};

/// Reader-writer lock with writer priority
///
/// The lock protects no data itself. Pair it with [`RwCell`](super::RwCell)
/// for a data-carrying wrapper, or bracket accesses manually with
/// [`acquire_read`](Self::acquire_read) / [`acquire_write`](Self::acquire_write)
/// and [`release`](Self::release).
///
/// # Example
///
/// ```
/// use rwbench::core::sync::WriterPriorityLock;
///
/// let lock = WriterPriorityLock::new();
/// lock.acquire_read().unwrap();
/// lock.acquire_read().unwrap();
/// lock.release().unwrap();
/// lock.release().unwrap();
///
/// lock.acquire_write().unwrap();
/// lock.release().unwrap();
/// lock.destroy().unwrap();
/// ```
pub struct WriterPriorityLock {
    state: Mutex<LockState>,
    readers: Condvar,
    writers: Condvar,
    config: LockConfig,
}

impl WriterPriorityLock {
    /// Create an idle lock with the strict release policy
    pub const fn new() -> Self {
        Self::with_config(LockConfig::strict())
    }

    /// Create an idle lock with the given configuration
    pub const fn with_config(config: LockConfig) -> Self {
        Self {
            state: Mutex::new(LockState::new()),
            readers: Condvar::new(),
            writers: Condvar::new(),
            config,
        }
    }

    /// Initialize a lock, reporting primitive-creation failure
    ///
    /// `parking_lot` primitives are constructed without allocation, so this
    /// never produces `LockError::Init` today.
    pub fn init(config: LockConfig) -> LockResult<Self> {
        Ok(Self::with_config(config))
    }

    /// Configuration the lock was created with
    pub fn config(&self) -> LockConfig {
        self.config
    }

    /// Block until admitted as a reader
    pub fn acquire_read(&self) -> LockResult<()> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(LockError::NullHandle);
        }

        state.waiting_readers += 1;
        let mut blocked = false;
        while state.writer_active || state.waiting_writers > 0 {
            if !blocked {
                trace!(
                    waiting_writers = state.waiting_writers,
                    writer_active = state.writer_active,
                    "reader blocked"
                );
                blocked = true;
            }
            self.readers.wait(&mut state);
        }
        state.waiting_readers -= 1;

        state.active_readers += 1;
        let active = state.active_readers;
        state.stats.record_read(blocked, active);
        Ok(())
    }

    /// Block until admitted as the sole writer
    pub fn acquire_write(&self) -> LockResult<()> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(LockError::NullHandle);
        }

        state.waiting_writers += 1;
        let mut blocked = false;
        while state.active_readers > 0 || state.writer_active {
            if !blocked {
                trace!(
                    active_readers = state.active_readers,
                    writer_active = state.writer_active,
                    "writer blocked"
                );
                blocked = true;
            }
            self.writers.wait(&mut state);
        }
        state.waiting_writers -= 1;

        state.writer_active = true;
        state.stats.record_write(blocked);
        Ok(())
    }

    /// Release one held access (read or write)
    ///
    /// With [`ReleasePolicy::Strict`] a release while nothing is held fails
    /// with `LockError::NotHeld`; with [`ReleasePolicy::Lenient`] it is a no-op.
    pub fn release(&self) -> LockResult<()> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(LockError::NullHandle);
        }

        if state.writer_active {
            state.writer_active = false;
            if state.waiting_writers > 0 {
                self.writers.notify_one();
            } else {
                self.readers.notify_all();
            }
        } else if state.active_readers > 0 {
            state.active_readers -= 1;
            if state.active_readers == 0 && state.waiting_writers > 0 {
                self.writers.notify_one();
            }
        } else {
            return match self.config.release_policy {
                ReleasePolicy::Strict => Err(LockError::NotHeld),
                ReleasePolicy::Lenient => Ok(()),
            };
        }

        Ok(())
    }

    /// Acquire read access, released when the lease drops
    pub fn read(&self) -> LockResult<ReadLease<'_>> {
        self.acquire_read()?;
        Ok(ReadLease { lock: self })
    }

    /// Acquire write access, released when the lease drops
    pub fn write(&self) -> LockResult<WriteLease<'_>> {
        self.acquire_write()?;
        Ok(WriteLease { lock: self })
    }

    /// Tear the lock down
    ///
    /// Only valid from Idle with no waiters; a busy lock is left untouched
    /// and `LockError::Busy` returned. Every later operation reports
    /// `LockError::NullHandle`.
    pub fn destroy(&self) -> LockResult<()> {
        let mut state = self.state.lock();
        if state.destroyed {
            return Err(LockError::NullHandle);
        }
        if !state.is_idle() {
            return Err(LockError::Busy {
                active_readers: state.active_readers,
                writer_active: state.writer_active,
                waiters: state.waiting_readers + state.waiting_writers,
            });
        }
        state.destroyed = true;
        Ok(())
    }

    /// Whether [`destroy`](Self::destroy) has completed
    pub fn is_destroyed(&self) -> bool {
        self.state.lock().destroyed
    }

    /// Copy of the admission counters
    pub fn snapshot(&self) -> LockSnapshot {
        self.state.lock().snapshot()
    }

    /// Cumulative admission statistics
    pub fn stats(&self) -> LockStats {
        self.state.lock().stats
    }
}

impl Default for WriterPriorityLock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for WriterPriorityLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriterPriorityLock")
            .field("state", &self.snapshot())
            .field("config", &self.config)
            .finish()
    }
}

/// Scoped read access on a [`WriterPriorityLock`]
#[must_use = "dropping the lease releases the read lock immediately"]
pub struct ReadLease<'a> {
    lock: &'a WriterPriorityLock,
}

impl Drop for ReadLease<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.lock.release() {
            error!(error = %e, "read lease release failed");
        }
    }
}

/// Scoped write access on a [`WriterPriorityLock`]
#[must_use = "dropping the lease releases the write lock immediately"]
pub struct WriteLease<'a> {
    lock: &'a WriterPriorityLock,
}

impl Drop for WriteLease<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.lock.release() {
            error!(error = %e, "write lease release failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sync::LockMode;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn wait_until(lock: &WriterPriorityLock, pred: impl Fn(&LockSnapshot) -> bool) {
        while !pred(&lock.snapshot()) {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_initial_state_idle() {
        let lock = WriterPriorityLock::init(LockConfig::default()).unwrap();
        let snap = lock.snapshot();
        assert_eq!(snap.mode(), LockMode::Idle);
        assert_eq!(snap.waiting_readers, 0);
        assert_eq!(snap.waiting_writers, 0);
        assert!(!snap.destroyed);
    }

    #[test]
    fn test_multiple_readers() {
        let lock = WriterPriorityLock::new();
        lock.acquire_read().unwrap();
        lock.acquire_read().unwrap();
        assert_eq!(lock.snapshot().mode(), LockMode::Reading(2));

        lock.release().unwrap();
        assert_eq!(lock.snapshot().mode(), LockMode::Reading(1));
        lock.release().unwrap();
        assert_eq!(lock.snapshot().mode(), LockMode::Idle);
    }

    #[test]
    fn test_write_then_idle() {
        let lock = WriterPriorityLock::new();
        lock.acquire_write().unwrap();
        assert_eq!(lock.snapshot().mode(), LockMode::Writing);
        lock.release().unwrap();
        assert_eq!(lock.snapshot().mode(), LockMode::Idle);
    }

    #[test]
    fn test_strict_release_without_acquire() {
        let lock = WriterPriorityLock::new();
        assert_eq!(lock.release(), Err(LockError::NotHeld));
        assert_eq!(lock.snapshot().mode(), LockMode::Idle);
    }

    #[test]
    fn test_lenient_release_is_inert() {
        let lock = WriterPriorityLock::with_config(LockConfig::legacy());
        assert_eq!(lock.release(), Ok(()));
        assert_eq!(lock.snapshot(), WriterPriorityLock::new().snapshot());
    }

    #[test]
    fn test_double_release_reported() {
        let lock = WriterPriorityLock::new();
        lock.acquire_write().unwrap();
        lock.release().unwrap();
        assert_eq!(lock.release(), Err(LockError::NotHeld));
    }

    #[test]
    fn test_writer_waits_for_reader() {
        let lock = Arc::new(WriterPriorityLock::new());
        lock.acquire_read().unwrap();

        let lock_clone = lock.clone();
        let writer = thread::spawn(move || {
            lock_clone.acquire_write().unwrap();
            let mode = lock_clone.snapshot().mode();
            lock_clone.release().unwrap();
            mode
        });

        wait_until(&lock, |s| s.waiting_writers == 1);
        assert_eq!(lock.snapshot().mode(), LockMode::Reading(1));

        lock.release().unwrap();
        assert_eq!(writer.join().unwrap(), LockMode::Writing);
        assert_eq!(lock.stats().contended_writes, 1);
    }

    #[test]
    fn test_writer_release_broadcasts_readers() {
        let lock = Arc::new(WriterPriorityLock::new());
        lock.acquire_write().unwrap();

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let lock = lock.clone();
                thread::spawn(move || {
                    lock.acquire_read().unwrap();
                    lock.release().unwrap();
                })
            })
            .collect();

        wait_until(&lock, |s| s.waiting_readers == 3);
        lock.release().unwrap();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(lock.snapshot().mode(), LockMode::Idle);
        assert_eq!(lock.stats().contended_reads, 3);
    }

    #[test]
    fn test_leases_release_on_drop() {
        let lock = WriterPriorityLock::new();
        {
            let _a = lock.read().unwrap();
            let _b = lock.read().unwrap();
            assert_eq!(lock.snapshot().mode(), LockMode::Reading(2));
        }
        {
            let _w = lock.write().unwrap();
            assert_eq!(lock.snapshot().mode(), LockMode::Writing);
        }
        assert_eq!(lock.snapshot().mode(), LockMode::Idle);
    }

    #[test]
    fn test_destroy_busy_then_ok() {
        let lock = WriterPriorityLock::new();
        lock.acquire_read().unwrap();
        assert!(matches!(
            lock.destroy(),
            Err(LockError::Busy {
                active_readers: 1,
                ..
            })
        ));
        lock.release().unwrap();
        lock.destroy().unwrap();
        assert!(lock.is_destroyed());
    }

    #[test]
    fn test_operations_after_destroy() {
        let lock = WriterPriorityLock::new();
        lock.destroy().unwrap();
        assert_eq!(lock.acquire_read(), Err(LockError::NullHandle));
        assert_eq!(lock.acquire_write(), Err(LockError::NullHandle));
        assert_eq!(lock.release(), Err(LockError::NullHandle));
        assert_eq!(lock.destroy(), Err(LockError::NullHandle));
        assert_eq!(lock.snapshot().waiting_readers, 0);
    }
}
