//! Common traits for the priority queues in this crate
//!
//! This module provides a two-tier trait hierarchy:
//!
//! - [`PriorityQueue`]: insertion, extraction of the maximum, and size queries
//! - [`UpdatablePriorityQueue`]: adds value lookup and priority updates
//!   through a queue-specific handle type
//!
//! Both [`Heap`](crate::heap::Heap) and, with the `indexed` feature,
//! [`IndexedHeap`](crate::indexed::IndexedHeap) implement both tiers, so
//! generic code can be written once against the traits.

use std::fmt;

use crate::entry::Entry;

/// Error type for queue operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueError {
    /// `dequeue` was called on a queue holding no entries
    EmptyQueue,
    /// The handle no longer refers to a live entry
    InvalidHandle,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::EmptyQueue => write!(f, "cannot dequeue from an empty queue"),
            QueueError::InvalidHandle => {
                write!(f, "handle does not refer to a live entry of this queue")
            }
        }
    }
}

impl std::error::Error for QueueError {}

/// Marker for handle types returned by [`UpdatablePriorityQueue::find`]
pub trait Handle: Clone + PartialEq + Eq + fmt::Debug {}

/// Base trait for max-priority queues
///
/// The entry with the numerically greatest priority is always served first.
/// Ties are broken arbitrarily; callers must not rely on insertion order
/// among equal priorities.
///
/// # Example
///
/// ```rust
/// use binary_priority_queue::{Heap, PriorityQueue};
///
/// fn drain<Q: PriorityQueue<&'static str, u32>>(mut queue: Q) -> Vec<u32> {
///     let mut out = Vec::new();
///     while let Ok(entry) = queue.dequeue() {
///         out.push(entry.priority);
///     }
///     out
/// }
///
/// let mut heap = Heap::new();
/// heap.enqueue("low", 1);
/// heap.enqueue("high", 9);
/// assert_eq!(drain(heap), vec![9, 1]);
/// ```
pub trait PriorityQueue<R, P: Ord> {
    /// Creates a new empty queue
    fn new() -> Self;

    /// Returns true if the queue holds no entries
    fn is_empty(&self) -> bool;

    /// Returns the number of entries in the queue
    fn len(&self) -> usize;

    /// Inserts `value` with the given priority
    ///
    /// # Time Complexity
    /// O(log n)
    fn enqueue(&mut self, value: R, priority: P);

    /// Returns the highest-priority entry without removing it
    fn peek(&self) -> Option<(&R, &P)>;

    /// Removes and returns the highest-priority entry
    ///
    /// # Errors
    /// Returns [`QueueError::EmptyQueue`] when the queue is empty; the queue
    /// is left untouched.
    ///
    /// # Time Complexity
    /// O(log n)
    fn dequeue(&mut self) -> Result<Entry<R, P>, QueueError>;
}

/// Extended queue trait with lookup by value and priority updates
pub trait UpdatablePriorityQueue<R, P: Ord>: PriorityQueue<R, P> {
    /// The handle type for this queue
    type Handle: Handle;

    /// Returns a handle to the first entry, in storage order, whose value
    /// equals `value`, or `None` if there is no such entry
    ///
    /// # Time Complexity
    /// O(n)
    fn find(&self, value: &R) -> Option<Self::Handle>
    where
        R: PartialEq;

    /// Dereferences a handle
    ///
    /// # Errors
    /// Returns [`QueueError::InvalidHandle`] if the handle is stale.
    fn get(&self, handle: &Self::Handle) -> Result<(&R, &P), QueueError>;

    /// Replaces the priority of the entry behind `handle` and restores the
    /// heap invariant
    ///
    /// The new priority may be higher or lower than the old one.
    ///
    /// # Errors
    /// Returns [`QueueError::InvalidHandle`] if the handle is stale; the
    /// queue is left untouched.
    ///
    /// # Time Complexity
    /// O(log n)
    fn update(&mut self, handle: &Self::Handle, new_priority: P) -> Result<(), QueueError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            QueueError::EmptyQueue.to_string(),
            "cannot dequeue from an empty queue"
        );
        assert!(QueueError::InvalidHandle.to_string().contains("handle"));
    }

    #[test]
    fn test_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(QueueError::EmptyQueue);
        assert!(err.source().is_none());
    }
}
