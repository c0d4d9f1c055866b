//! Array-backed binary max-heap
//!
//! [`Heap`] stores its entries in a flat `Vec` interpreted as a complete
//! binary tree: the entry at index `i` has its parent at `(i - 1) / 2` and
//! its children at `2i + 1` and `2i + 2`. The entry with the greatest
//! priority always sits at index 0.
//!
//! # Handles
//!
//! [`find`](Heap::find) and [`handles`](Heap::handles) hand out
//! [`HeapHandle`]s. A handle names a storage position, and positions move
//! whenever the heap is mutated, so every successful mutating call
//! invalidates all outstanding handles. Using a stale handle, or a handle
//! minted by a different heap, fails with [`QueueError::InvalidHandle`]
//! instead of silently touching the wrong entry. For handles that survive
//! unrelated mutations, see [`IndexedHeap`](crate::indexed::IndexedHeap).
//!
//! # Time Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `enqueue` | O(log n)   |
//! | `dequeue` | O(log n)   |
//! | `update`  | O(log n)   |
//! | `peek`    | O(1)       |
//! | `find`    | O(n)       |
//!
//! # Example
//!
//! ```rust
//! use binary_priority_queue::Heap;
//!
//! let mut heap = Heap::new();
//! heap.enqueue("a", 1);
//! heap.enqueue("b", 2);
//! heap.enqueue("c", 3);
//!
//! let handle = heap.find(&"a").unwrap();
//! heap.update(&handle, 10).unwrap();
//!
//! assert_eq!(heap.dequeue().unwrap().value, "a");
//! assert_eq!(heap.dequeue().unwrap().value, "c");
//! ```

use std::fmt;
use std::slice;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use log::{debug, trace};
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::entry::Entry;
use crate::traits::{Handle, PriorityQueue, QueueError, UpdatablePriorityQueue};

static NEXT_HEAP_ID: AtomicU64 = AtomicU64::new(0);

fn next_heap_id() -> u64 {
    NEXT_HEAP_ID.fetch_add(1, AtomicOrdering::Relaxed)
}

/// Position handle into a [`Heap`], valid until the heap's next mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapHandle {
    heap_id: u64,
    generation: u64,
    index: usize,
}

impl HeapHandle {
    /// Storage position this handle was minted for
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Handle for HeapHandle {}

/// A binary max-heap of `(value, priority)` entries
///
/// Construction from a list of pairs enqueues them one at a time in list
/// order, so the resulting layout depends on insertion order only.
pub struct Heap<R, P = u32> {
    data: Vec<Entry<R, P>>,
    /// Process-unique identity, stamped into every handle
    id: u64,
    /// Advanced by every successful mutation
    generation: u64,
}

impl<R, P> Heap<R, P> {
    /// Creates an empty heap
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty heap with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            id: next_heap_id(),
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Returns the highest-priority entry without removing it
    pub fn peek(&self) -> Option<&Entry<R, P>> {
        self.data.first()
    }

    /// Iterates over the entries in storage (heap) order, not sorted order
    ///
    /// The borrow prevents the heap from being mutated while the iterator
    /// is alive. Call again to restart.
    pub fn iter(&self) -> slice::Iter<'_, Entry<R, P>> {
        self.data.iter()
    }

    /// Iterates over `(handle, entry)` pairs in storage order
    ///
    /// The handles stay usable after the iterator is dropped, until the
    /// next mutation.
    pub fn handles(&self) -> impl Iterator<Item = (HeapHandle, &Entry<R, P>)> + '_ {
        let (heap_id, generation) = (self.id, self.generation);
        self.data.iter().enumerate().map(move |(index, entry)| {
            let handle = HeapHandle {
                heap_id,
                generation,
                index,
            };
            (handle, entry)
        })
    }

    /// Returns a handle to the first entry, in storage order, whose value
    /// equals `value`
    pub fn find(&self, value: &R) -> Option<HeapHandle>
    where
        R: PartialEq,
    {
        self.data
            .iter()
            .position(|entry| entry.value == *value)
            .map(|index| self.handle_at(index))
    }

    /// Dereferences a handle
    pub fn get(&self, handle: &HeapHandle) -> Result<&Entry<R, P>, QueueError> {
        let index = self.resolve(handle)?;
        Ok(&self.data[index])
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.data.clear();
        self.bump();
    }

    /// Consumes the heap, returning its storage in heap order
    pub fn into_vec(self) -> Vec<Entry<R, P>> {
        self.data
    }

    fn handle_at(&self, index: usize) -> HeapHandle {
        HeapHandle {
            heap_id: self.id,
            generation: self.generation,
            index,
        }
    }

    fn resolve(&self, handle: &HeapHandle) -> Result<usize, QueueError> {
        if handle.heap_id == self.id
            && handle.generation == self.generation
            && handle.index < self.data.len()
        {
            Ok(handle.index)
        } else {
            debug!(
                "rejected stale handle (index {}, generation {} vs {})",
                handle.index, handle.generation, self.generation
            );
            Err(QueueError::InvalidHandle)
        }
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

impl<R, P: Ord> Heap<R, P> {
    /// Builds a heap by enqueueing `pairs` one at a time, in order
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, P)>,
    {
        let mut heap = Self::new();
        heap.extend(pairs);
        heap
    }

    /// Inserts `value` with the given priority
    ///
    /// Duplicate values and duplicate priorities are both allowed.
    pub fn enqueue(&mut self, value: R, priority: P) {
        self.data.push(Entry::new(value, priority));
        let settled = self.sift_up(self.data.len() - 1);
        self.bump();
        trace!("enqueue settled at index {} of {}", settled, self.data.len());
    }

    /// Removes and returns the highest-priority entry
    ///
    /// # Errors
    /// Returns [`QueueError::EmptyQueue`] if the heap is empty.
    pub fn dequeue(&mut self) -> Result<Entry<R, P>, QueueError> {
        if self.data.is_empty() {
            debug!("dequeue on empty heap");
            return Err(QueueError::EmptyQueue);
        }

        // The last leaf takes the root's slot; the original root is returned.
        let max = self.data.swap_remove(0);
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        self.bump();
        trace!("dequeue left {} entries", self.data.len());
        Ok(max)
    }

    /// Sets the priority of the entry behind `handle`
    ///
    /// # Errors
    /// Returns [`QueueError::InvalidHandle`] if the heap has been mutated
    /// since the handle was obtained, or the handle belongs to another heap.
    pub fn update(&mut self, handle: &HeapHandle, new_priority: P) -> Result<(), QueueError> {
        let index = self.resolve(handle)?;
        self.data[index].priority = new_priority;

        // Only one direction can apply: the rest of the heap was valid.
        let mut settled = self.sift_up(index);
        if settled == index {
            settled = self.sift_down(index);
        }
        self.bump();
        trace!("update moved index {} to {}", index, settled);
        Ok(())
    }

    /// Consumes the heap, returning entries by descending priority
    pub fn into_sorted_vec(mut self) -> Vec<Entry<R, P>> {
        let mut sorted = Vec::with_capacity(self.data.len());
        while let Ok(entry) = self.dequeue() {
            sorted.push(entry);
        }
        sorted
    }

    /// Moves the entry at `index` toward the root while it outranks its
    /// parent, returning where it settled
    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.data[index].priority > self.data[parent].priority {
                self.data.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
        index
    }

    /// Moves the entry at `index` toward the leaves while its larger child
    /// outranks it, returning where it settled
    fn sift_down(&mut self, mut index: usize) -> usize {
        let len = self.data.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let larger = if right < len && self.data[right].priority > self.data[left].priority {
                right
            } else {
                left
            };

            if self.data[larger].priority > self.data[index].priority {
                self.data.swap(index, larger);
                index = larger;
            } else {
                break;
            }
        }
        index
    }
}

impl<R, P> Default for Heap<R, P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones get a fresh identity; handles from the original are not valid on
/// the clone.
impl<R: Clone, P: Clone> Clone for Heap<R, P> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            id: next_heap_id(),
            generation: 0,
        }
    }
}

impl<R: fmt::Debug, P: fmt::Debug> fmt::Debug for Heap<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap").field("entries", &self.data).finish()
    }
}

impl<R, P: Ord> Extend<(R, P)> for Heap<R, P> {
    fn extend<I: IntoIterator<Item = (R, P)>>(&mut self, iter: I) {
        for (value, priority) in iter {
            self.enqueue(value, priority);
        }
    }
}

impl<R, P: Ord> Extend<Entry<R, P>> for Heap<R, P> {
    fn extend<I: IntoIterator<Item = Entry<R, P>>>(&mut self, iter: I) {
        for entry in iter {
            self.enqueue(entry.value, entry.priority);
        }
    }
}

impl<R, P: Ord> FromIterator<(R, P)> for Heap<R, P> {
    fn from_iter<I: IntoIterator<Item = (R, P)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}

impl<R, P: Ord> FromIterator<Entry<R, P>> for Heap<R, P> {
    fn from_iter<I: IntoIterator<Item = Entry<R, P>>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

impl<R, P: Ord> From<Vec<(R, P)>> for Heap<R, P> {
    fn from(pairs: Vec<(R, P)>) -> Self {
        Self::from_pairs(pairs)
    }
}

impl<R, P> IntoIterator for Heap<R, P> {
    type Item = Entry<R, P>;
    type IntoIter = std::vec::IntoIter<Entry<R, P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, R, P> IntoIterator for &'a Heap<R, P> {
    type Item = &'a Entry<R, P>;
    type IntoIter = slice::Iter<'a, Entry<R, P>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<R, P: Ord> PriorityQueue<R, P> for Heap<R, P> {
    fn new() -> Self {
        Heap::new()
    }

    fn is_empty(&self) -> bool {
        Heap::is_empty(self)
    }

    fn len(&self) -> usize {
        Heap::len(self)
    }

    fn enqueue(&mut self, value: R, priority: P) {
        Heap::enqueue(self, value, priority)
    }

    fn peek(&self) -> Option<(&R, &P)> {
        Heap::peek(self).map(Entry::as_pair)
    }

    fn dequeue(&mut self) -> Result<Entry<R, P>, QueueError> {
        Heap::dequeue(self)
    }
}

impl<R, P: Ord> UpdatablePriorityQueue<R, P> for Heap<R, P> {
    type Handle = HeapHandle;

    fn find(&self, value: &R) -> Option<HeapHandle>
    where
        R: PartialEq,
    {
        Heap::find(self, value)
    }

    fn get(&self, handle: &HeapHandle) -> Result<(&R, &P), QueueError> {
        Heap::get(self, handle).map(Entry::as_pair)
    }

    fn update(&mut self, handle: &HeapHandle, new_priority: P) -> Result<(), QueueError> {
        Heap::update(self, handle, new_priority)
    }
}

/// Serialized as the entry sequence in storage order
#[cfg(feature = "serde")]
impl<R: Serialize, P: Serialize> Serialize for Heap<R, P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.data.iter())
    }
}

/// Rebuilt through sequential enqueue, so the invariant holds regardless of
/// the order found in the input
#[cfg(feature = "serde")]
impl<'de, R, P> Deserialize<'de> for Heap<R, P>
where
    R: Deserialize<'de>,
    P: Deserialize<'de> + Ord,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<Entry<R, P>>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
