//! Binary max-heap priority queues for Rust
//!
//! This crate provides an array-backed binary heap of `(value, priority)`
//! entries in which the entry with the greatest priority is always served
//! first, together with lookup by value and in-place priority updates.
//!
//! # Features
//!
//! - **[`Heap`]**: O(log n) enqueue, dequeue and update; O(n) find. Handles
//!   are position handles that expire on the next mutation.
//! - **[`IndexedHeap`]** (feature `indexed`, on by default): the same bounds,
//!   with stable keys that survive unrelated mutations and O(log n) removal
//!   of arbitrary entries.
//! - **`serde`** (optional feature): serialization support for [`Entry`]
//!   and [`Heap`].
//!
//! Iteration always follows storage order, which is heap order rather than
//! sorted order. Use [`Heap::into_sorted_vec`] for a sorted drain.
//!
//! # Example
//!
//! ```rust
//! use binary_priority_queue::{Heap, QueueError};
//!
//! let mut heap = Heap::from_pairs([("x", 2), ("y", 5), ("z", 1)]);
//! assert_eq!(heap.len(), 3);
//!
//! let handle = heap.find(&"z").unwrap();
//! heap.update(&handle, 9).unwrap();
//!
//! assert_eq!(heap.dequeue().unwrap().value, "z");
//! assert_eq!(heap.dequeue().unwrap().value, "y");
//! assert_eq!(heap.dequeue().unwrap().value, "x");
//! assert_eq!(heap.dequeue(), Err(QueueError::EmptyQueue));
//! ```
//!
//! Neither queue performs internal locking. Wrap one in a mutex to share it
//! between threads.

pub mod entry;
pub mod heap;
#[cfg(feature = "indexed")]
pub mod indexed;
pub mod traits;

pub use entry::Entry;
pub use heap::{Heap, HeapHandle};
#[cfg(feature = "indexed")]
pub use indexed::{EntryKey, IndexedHeap};
pub use traits::{Handle, PriorityQueue, QueueError, UpdatablePriorityQueue};
