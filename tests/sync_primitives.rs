/*!
 * Synchronization Primitives Integration Tests
 *
 * Mutual exclusion, writer priority and teardown of the writer-priority
 * lock under real thread contention
 */

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use rwbench::core::sync::{LockMode, LockSnapshot, RwCell, WriterPriorityLock};
use rwbench::{LockConfig, LockError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn wait_until(lock: &WriterPriorityLock, pred: impl Fn(&LockSnapshot) -> bool) {
    while !pred(&lock.snapshot()) {
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_readers_and_writers_never_overlap() {
    let lock = Arc::new(WriterPriorityLock::new());
    let readers_inside = Arc::new(AtomicUsize::new(0));
    let writers_inside = Arc::new(AtomicUsize::new(0));
    let violation = Arc::new(AtomicBool::new(false));

    let handles: Vec<_> = (0..8)
        .map(|rank| {
            let lock = lock.clone();
            let readers_inside = readers_inside.clone();
            let writers_inside = writers_inside.clone();
            let violation = violation.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    if (rank + i) % 4 == 0 {
                        lock.acquire_write().unwrap();
                        let writers = writers_inside.fetch_add(1, Ordering::SeqCst);
                        if writers != 0 || readers_inside.load(Ordering::SeqCst) != 0 {
                            violation.store(true, Ordering::SeqCst);
                        }
                        writers_inside.fetch_sub(1, Ordering::SeqCst);
                        lock.release().unwrap();
                    } else {
                        lock.acquire_read().unwrap();
                        readers_inside.fetch_add(1, Ordering::SeqCst);
                        if writers_inside.load(Ordering::SeqCst) != 0 {
                            violation.store(true, Ordering::SeqCst);
                        }
                        readers_inside.fetch_sub(1, Ordering::SeqCst);
                        lock.release().unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(!violation.load(Ordering::SeqCst), "reader and writer overlapped");
    assert_eq!(lock.snapshot().mode(), LockMode::Idle);

    let stats = lock.stats();
    assert_eq!(stats.read_acquisitions + stats.write_acquisitions, 4_000);
    assert_eq!(stats.write_acquisitions, 1_000);
}

#[test]
fn test_waiting_writer_blocks_new_readers() {
    let lock = Arc::new(WriterPriorityLock::new());
    let order = Arc::new(Mutex::new(Vec::new()));

    // First reader holds the lock while a writer queues behind it.
    lock.acquire_read().unwrap();

    let writer = {
        let lock = lock.clone();
        let order = order.clone();
        thread::spawn(move || {
            lock.acquire_write().unwrap();
            order.lock().push("writer");
            lock.release().unwrap();
        })
    };
    wait_until(&lock, |s| s.waiting_writers == 1);

    let late_reader = {
        let lock = lock.clone();
        let order = order.clone();
        thread::spawn(move || {
            lock.acquire_read().unwrap();
            order.lock().push("reader");
            lock.release().unwrap();
        })
    };
    wait_until(&lock, |s| s.waiting_readers == 1);

    // The late reader must not join the active one.
    assert_eq!(lock.snapshot().mode(), LockMode::Reading(1));

    lock.release().unwrap();
    writer.join().unwrap();
    late_reader.join().unwrap();

    assert_eq!(*order.lock(), vec!["writer", "reader"]);
}

#[test]
fn test_queued_writers_run_before_queued_readers() {
    let lock = Arc::new(WriterPriorityLock::new());
    let order = Arc::new(Mutex::new(Vec::new()));
    lock.acquire_write().unwrap();

    let mut handles = Vec::new();
    for _ in 0..3 {
        let lock = lock.clone();
        let order = order.clone();
        handles.push(thread::spawn(move || {
            lock.acquire_read().unwrap();
            order.lock().push('r');
            lock.release().unwrap();
        }));
    }
    wait_until(&lock, |s| s.waiting_readers == 3);

    for _ in 0..2 {
        let lock = lock.clone();
        let order = order.clone();
        handles.push(thread::spawn(move || {
            lock.acquire_write().unwrap();
            order.lock().push('w');
            lock.release().unwrap();
        }));
    }
    wait_until(&lock, |s| s.waiting_writers == 2);

    lock.release().unwrap();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*order.lock(), vec!['w', 'w', 'r', 'r', 'r']);
    assert_eq!(lock.snapshot().mode(), LockMode::Idle);
}

#[test]
fn test_snapshot_always_exclusive() {
    let lock = Arc::new(WriterPriorityLock::new());
    let done = Arc::new(AtomicBool::new(false));

    let workers: Vec<_> = (0..4)
        .map(|rank| {
            let lock = lock.clone();
            thread::spawn(move || {
                for _ in 0..1_000 {
                    if rank == 0 {
                        let _w = lock.write().unwrap();
                    } else {
                        let _r = lock.read().unwrap();
                    }
                }
            })
        })
        .collect();

    let observer = {
        let lock = lock.clone();
        let done = done.clone();
        thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                assert!(lock.snapshot().is_exclusive());
            }
        })
    };

    for worker in workers {
        worker.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    observer.join().unwrap();
}

#[test]
fn test_cell_counter_under_contention() {
    let cell = Arc::new(RwCell::new(0u64));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let cell = cell.clone();
            thread::spawn(move || {
                for _ in 0..1_000 {
                    *cell.write().unwrap() += 1;
                    let _ = *cell.read().unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*cell.read().unwrap(), 6_000);
    let cell = Arc::try_unwrap(cell).ok().unwrap();
    assert_eq!(cell.into_inner(), 6_000);
}

#[test]
fn test_destroy_refused_while_writer_waits() {
    let lock = Arc::new(WriterPriorityLock::new());
    lock.acquire_read().unwrap();

    let writer = {
        let lock = lock.clone();
        thread::spawn(move || {
            lock.acquire_write().unwrap();
            lock.release().unwrap();
        })
    };
    wait_until(&lock, |s| s.waiting_writers == 1);

    assert_eq!(
        lock.destroy(),
        Err(LockError::Busy {
            active_readers: 1,
            writer_active: false,
            waiters: 1,
        })
    );

    lock.release().unwrap();
    writer.join().unwrap();
    lock.destroy().unwrap();
    assert_eq!(lock.acquire_read(), Err(LockError::NullHandle));
}

#[test]
fn test_release_policies() {
    let strict = WriterPriorityLock::init(LockConfig::strict()).unwrap();
    assert_eq!(strict.release(), Err(LockError::NotHeld));

    let lenient = WriterPriorityLock::init(LockConfig::legacy()).unwrap();
    assert_eq!(lenient.release(), Ok(()));
    lenient.acquire_read().unwrap();
    assert_eq!(lenient.release(), Ok(()));
    assert_eq!(lenient.release(), Ok(()));
    assert_eq!(lenient.snapshot().mode(), LockMode::Idle);
}
