/*!
 * Data Structures
 *
 * Collections shared by benchmark workers:
 * - Ordered set: sorted singly-linked chain of unique keys in a node arena
 *
 * # Performance
 *
 * - O(n) scans by construction; the benchmark measures lock contention,
 *   not collection asymptotics
 * - Arena slots are recycled, so steady-state insert/delete does not allocate
 */

mod ordered_set;

pub use ordered_set::{Keys, OrderedSet};
