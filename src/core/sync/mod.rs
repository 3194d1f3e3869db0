/*!
 * Synchronization Primitives
 *
 * Hand-built reader-writer lock with writer priority:
 * - `WriterPriorityLock`: monitor (mutex + reader/writer condvars) with
 *   explicit acquire/release and RAII leases
 * - `RwCell`: data-carrying wrapper handing out read/write guards
 *
 * # Architecture
 *
 * All admission counters live in a single `LockState` behind the lock's
 * internal mutex. Readers and writers block on separate condvars so a
 * writer release can signal one writer without waking every reader.
 */

mod cell;
mod config;
mod rwlock;
mod state;

pub use cell::{RwCell, RwCellReadGuard, RwCellWriteGuard};
pub use config::{LockConfig, ReleasePolicy};
pub use rwlock::{ReadLease, WriteLease, WriterPriorityLock};
pub use state::{LockMode, LockSnapshot, LockStats};
