//! Binary max-heap with stable entry keys
//!
//! [`IndexedHeap`] keeps the same array-backed tree as [`Heap`](crate::heap::Heap),
//! but the tree holds [`EntryKey`]s into a `slotmap` arena rather than the
//! entries themselves. Each arena slot records its current tree position,
//! and every swap rewrites the positions of both keys involved.
//!
//! A key therefore stays valid across any number of unrelated enqueues,
//! dequeues and updates, and only goes stale once its own entry leaves the
//! queue. Slotmap keys are generational, so a stale key is detected even if
//! its slot has since been reused.
//!
//! # Time Complexity
//!
//! | Operation  | Complexity |
//! |------------|------------|
//! | `enqueue`  | O(log n)   |
//! | `dequeue`  | O(log n)   |
//! | `update`   | O(log n)   |
//! | `remove`   | O(log n)   |
//! | `contains` | O(1)       |
//! | `find`     | O(n)       |
//!
//! # Example
//!
//! ```rust
//! use binary_priority_queue::IndexedHeap;
//!
//! let mut heap = IndexedHeap::new();
//! let slow = heap.enqueue("slow", 1);
//! heap.enqueue("fast", 5);
//! heap.enqueue("medium", 3);
//!
//! // Still valid after the other inserts.
//! heap.update(slow, 10).unwrap();
//! assert_eq!(heap.dequeue().unwrap().value, "slow");
//! assert!(!heap.contains(slow));
//! ```

use std::fmt;

use log::{debug, trace};
use slotmap::{new_key_type, SlotMap};

use crate::entry::Entry;
use crate::traits::{Handle, PriorityQueue, QueueError, UpdatablePriorityQueue};

new_key_type! {
    /// Stable key for an entry of an [`IndexedHeap`]
    pub struct EntryKey;
}

impl Handle for EntryKey {}

#[derive(Debug, Clone)]
struct Slot<R, P> {
    entry: Entry<R, P>,
    /// Index of this slot's key in `IndexedHeap::tree`
    position: usize,
}

/// A binary max-heap whose entries are addressed by stable keys
///
/// Cloning copies the arena, so keys from the original resolve to the
/// corresponding entries of the clone.
#[derive(Clone)]
pub struct IndexedHeap<R, P = u32> {
    slots: SlotMap<EntryKey, Slot<R, P>>,
    tree: Vec<EntryKey>,
}

impl<R, P> IndexedHeap<R, P> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
            tree: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns true if `key` still refers to an entry of this heap
    pub fn contains(&self, key: EntryKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Returns the highest-priority entry and its key without removing it
    pub fn peek(&self) -> Option<(EntryKey, &Entry<R, P>)> {
        let key = *self.tree.first()?;
        self.slots.get(key).map(|slot| (key, &slot.entry))
    }

    /// Dereferences a key
    pub fn get(&self, key: EntryKey) -> Result<&Entry<R, P>, QueueError> {
        self.slots
            .get(key)
            .map(|slot| &slot.entry)
            .ok_or(QueueError::InvalidHandle)
    }

    /// Iterates over `(key, value, priority)` in storage (heap) order
    pub fn iter(&self) -> impl Iterator<Item = (EntryKey, &R, &P)> + '_ {
        self.tree.iter().filter_map(move |&key| {
            self.slots
                .get(key)
                .map(|slot| (key, &slot.entry.value, &slot.entry.priority))
        })
    }

    /// Returns the key of the first entry, in storage order, whose value
    /// equals `value`
    pub fn find(&self, value: &R) -> Option<EntryKey>
    where
        R: PartialEq,
    {
        self.iter()
            .find(|(_, candidate, _)| *candidate == value)
            .map(|(key, _, _)| key)
    }

    /// Removes every entry, invalidating all keys
    pub fn clear(&mut self) {
        self.slots.clear();
        self.tree.clear();
    }

    fn set_position(&mut self, index: usize) {
        let key = self.tree[index];
        if let Some(slot) = self.slots.get_mut(key) {
            slot.position = index;
        }
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.tree.swap(a, b);
        self.set_position(a);
        self.set_position(b);
    }
}

impl<R, P: Ord> IndexedHeap<R, P> {
    /// Inserts `value` with the given priority, returning its key
    pub fn enqueue(&mut self, value: R, priority: P) -> EntryKey {
        let position = self.tree.len();
        let key = self.slots.insert(Slot {
            entry: Entry::new(value, priority),
            position,
        });
        self.tree.push(key);
        let settled = self.sift_up(position);
        trace!("enqueue {:?} settled at index {}", key, settled);
        key
    }

    /// Removes and returns the highest-priority entry
    ///
    /// # Errors
    /// Returns [`QueueError::EmptyQueue`] if the heap is empty.
    pub fn dequeue(&mut self) -> Result<Entry<R, P>, QueueError> {
        if self.tree.is_empty() {
            debug!("dequeue on empty indexed heap");
            return Err(QueueError::EmptyQueue);
        }
        self.remove_at(0)
    }

    /// Removes the entry behind `key`, wherever it sits in the heap
    ///
    /// # Errors
    /// Returns [`QueueError::InvalidHandle`] if the entry already left the heap.
    pub fn remove(&mut self, key: EntryKey) -> Result<Entry<R, P>, QueueError> {
        let position = self.position_of(key)?;
        self.remove_at(position)
    }

    /// Sets the priority of the entry behind `key`
    ///
    /// # Errors
    /// Returns [`QueueError::InvalidHandle`] if the entry already left the heap.
    pub fn update(&mut self, key: EntryKey, new_priority: P) -> Result<(), QueueError> {
        let position = self.position_of(key)?;
        if let Some(slot) = self.slots.get_mut(key) {
            slot.entry.priority = new_priority;
        }
        let settled = self.restore(position);
        trace!("update {:?} moved index {} to {}", key, position, settled);
        Ok(())
    }

    fn position_of(&self, key: EntryKey) -> Result<usize, QueueError> {
        match self.slots.get(key) {
            Some(slot) => Ok(slot.position),
            None => {
                debug!("rejected stale key {:?}", key);
                Err(QueueError::InvalidHandle)
            }
        }
    }

    fn remove_at(&mut self, position: usize) -> Result<Entry<R, P>, QueueError> {
        let key = self.tree.swap_remove(position);
        if position < self.tree.len() {
            // The former last leaf now fills the hole.
            self.set_position(position);
            self.restore(position);
        }
        let slot = self.slots.remove(key).ok_or(QueueError::InvalidHandle)?;
        trace!("removed {:?}, {} entries left", key, self.tree.len());
        Ok(slot.entry)
    }

    /// Sifts up, or down if nothing moved, returning the final index
    fn restore(&mut self, index: usize) -> usize {
        let settled = self.sift_up(index);
        if settled == index {
            self.sift_down(index)
        } else {
            settled
        }
    }

    fn priority_at(&self, index: usize) -> Option<&P> {
        self.slots
            .get(self.tree[index])
            .map(|slot| &slot.entry.priority)
    }

    fn outranks(&self, a: usize, b: usize) -> bool {
        self.priority_at(a) > self.priority_at(b)
    }

    fn sift_up(&mut self, mut index: usize) -> usize {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.outranks(index, parent) {
                self.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
        index
    }

    fn sift_down(&mut self, mut index: usize) -> usize {
        let len = self.tree.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let larger = if right < len && self.outranks(right, left) {
                right
            } else {
                left
            };

            if self.outranks(larger, index) {
                self.swap(index, larger);
                index = larger;
            } else {
                break;
            }
        }
        index
    }
}

impl<R, P> Default for IndexedHeap<R, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: fmt::Debug, P: fmt::Debug> fmt::Debug for IndexedHeap<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, value, priority)| (key, (value, priority))))
            .finish()
    }
}

impl<R, P: Ord> Extend<(R, P)> for IndexedHeap<R, P> {
    fn extend<I: IntoIterator<Item = (R, P)>>(&mut self, iter: I) {
        for (value, priority) in iter {
            self.enqueue(value, priority);
        }
    }
}

impl<R, P: Ord> FromIterator<(R, P)> for IndexedHeap<R, P> {
    fn from_iter<I: IntoIterator<Item = (R, P)>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

impl<R, P: Ord> PriorityQueue<R, P> for IndexedHeap<R, P> {
    fn new() -> Self {
        IndexedHeap::new()
    }

    fn is_empty(&self) -> bool {
        IndexedHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        IndexedHeap::len(self)
    }

    fn enqueue(&mut self, value: R, priority: P) {
        IndexedHeap::enqueue(self, value, priority);
    }

    fn peek(&self) -> Option<(&R, &P)> {
        IndexedHeap::peek(self).map(|(_, entry)| entry.as_pair())
    }

    fn dequeue(&mut self) -> Result<Entry<R, P>, QueueError> {
        IndexedHeap::dequeue(self)
    }
}

impl<R, P: Ord> UpdatablePriorityQueue<R, P> for IndexedHeap<R, P> {
    type Handle = EntryKey;

    fn find(&self, value: &R) -> Option<EntryKey>
    where
        R: PartialEq,
    {
        IndexedHeap::find(self, value)
    }

    fn get(&self, handle: &EntryKey) -> Result<(&R, &P), QueueError> {
        IndexedHeap::get(self, *handle).map(Entry::as_pair)
    }

    fn update(&mut self, handle: &EntryKey, new_priority: P) -> Result<(), QueueError> {
        IndexedHeap::update(self, *handle, new_priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Checks the max-heap property and that every slot knows its position
    fn assert_consistent<R, P: Ord>(heap: &IndexedHeap<R, P>) {
        assert_eq!(heap.slots.len(), heap.tree.len());
        for (index, key) in heap.tree.iter().enumerate() {
            assert_eq!(heap.slots[*key].position, index);
            if index > 0 {
                assert!(!heap.outranks(index, (index - 1) / 2));
            }
        }
    }

    #[test]
    fn test_basic_operations() {
        let mut heap = IndexedHeap::new();
        assert!(heap.is_empty());

        heap.enqueue("five", 5u32);
        heap.enqueue("one", 1);
        heap.enqueue("ten", 10);
        heap.enqueue("three", 3);
        assert_eq!(heap.len(), 4);
        assert_consistent(&heap);

        assert_eq!(heap.dequeue(), Ok(Entry::new("ten", 10)));
        assert_eq!(heap.dequeue(), Ok(Entry::new("five", 5)));
        assert_eq!(heap.dequeue(), Ok(Entry::new("three", 3)));
        assert_eq!(heap.dequeue(), Ok(Entry::new("one", 1)));
        assert_eq!(heap.dequeue(), Err(QueueError::EmptyQueue));
    }

    #[test]
    fn test_key_survives_unrelated_mutations() {
        let mut heap = IndexedHeap::new();
        let tracked = heap.enqueue("tracked", 1u32);
        for i in 0..20u32 {
            heap.enqueue("filler", i + 2);
        }
        heap.dequeue().unwrap();
        heap.dequeue().unwrap();

        assert_eq!(heap.get(tracked).unwrap().value, "tracked");
        heap.update(tracked, 100).unwrap();
        assert_consistent(&heap);

        let (top, entry) = heap.peek().unwrap();
        assert_eq!(top, tracked);
        assert_eq!(entry.priority, 100);
    }

    #[test]
    fn test_update_both_directions() {
        let mut heap: IndexedHeap<char, i32> = IndexedHeap::new();
        let keys: Vec<_> = "abcdefg"
            .chars()
            .enumerate()
            .map(|(i, c)| heap.enqueue(c, i as i32))
            .collect();

        heap.update(keys[0], 50).unwrap();
        assert_consistent(&heap);
        heap.update(keys[6], -50).unwrap();
        assert_consistent(&heap);

        let order: Vec<char> = std::iter::from_fn(|| heap.dequeue().ok())
            .map(|entry| entry.value)
            .collect();
        assert_eq!(order, vec!['a', 'f', 'e', 'd', 'c', 'b', 'g']);
    }

    #[test]
    fn test_removed_key_is_invalid() {
        let mut heap = IndexedHeap::new();
        let a = heap.enqueue("a", 3u32);
        let b = heap.enqueue("b", 1);

        assert_eq!(heap.dequeue().unwrap().value, "a");
        assert!(!heap.contains(a));
        assert_eq!(heap.update(a, 9), Err(QueueError::InvalidHandle));
        assert_eq!(heap.get(a), Err(QueueError::InvalidHandle));
        assert_eq!(heap.remove(a), Err(QueueError::InvalidHandle));

        // Slot reuse must not resurrect the old key.
        let c = heap.enqueue("c", 2);
        assert_ne!(a, c);
        assert!(!heap.contains(a));
        assert!(heap.contains(b));
    }

    #[test]
    fn test_remove_arbitrary_entry() {
        let mut heap: IndexedHeap<u32, u32> = IndexedHeap::new();
        let keys: Vec<_> = (0..15).map(|i| heap.enqueue(i, (i * 7) % 15)).collect();

        for key in keys.iter().step_by(3) {
            let removed = heap.remove(*key).unwrap();
            assert_eq!(removed.priority, (removed.value * 7) % 15);
            assert_consistent(&heap);
        }
        assert_eq!(heap.len(), 10);

        let mut last = u32::MAX;
        while let Ok(entry) = heap.dequeue() {
            assert!(entry.priority <= last);
            assert_ne!(entry.value % 3, 0);
            last = entry.priority;
        }
    }

    #[test]
    fn test_find_and_iter() {
        let heap: IndexedHeap<&str, u32> = [("x", 2), ("y", 5), ("z", 1)].into_iter().collect();

        let priorities: Vec<u32> = heap.iter().map(|(_, _, p)| *p).collect();
        assert_eq!(priorities, vec![5, 2, 1]);

        let key = heap.find(&"z").unwrap();
        assert_eq!(heap.get(key).unwrap().priority, 1);
        assert_eq!(heap.find(&"missing"), None);
    }

    #[test]
    fn test_clear_invalidates_keys() {
        let mut heap = IndexedHeap::new();
        let key = heap.enqueue("a", 1u32);
        heap.clear();
        assert!(heap.is_empty());
        assert!(!heap.contains(key));
        assert_eq!(heap.peek(), None);
    }

    #[test]
    fn test_clone_shares_keys() {
        let mut heap = IndexedHeap::new();
        let key = heap.enqueue("a", 1u32);
        heap.enqueue("b", 2);

        let mut copy = heap.clone();
        copy.update(key, 5).unwrap();
        assert_eq!(copy.peek().map(|(k, _)| k), Some(key));
        assert_eq!(heap.get(key).unwrap().priority, 1);
    }
}
