//! Re-sequencing of results that complete out of order.

use crate::error::ReorderError;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Items carrying the submission id used to restore order.
pub trait Sequenced {
    fn sequence_id(&self) -> u64;
}

/// Heap entry ordered by id only
#[derive(Debug)]
struct Entry<T>(u64, T);

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

/// Min-heap of pending items keyed by id
///
/// Items go in as they complete and come out strictly in id order, starting
/// from the id the buffer was created with. An item is released only once
/// every smaller id has been released.
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    heap: BinaryHeap<Reverse<Entry<T>>>,
    next_expected: u64,
    peak: usize,
}

impl<T: Sequenced> ReorderBuffer<T> {
    pub fn new(first_id: u64) -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_expected: first_id,
            peak: 0,
        }
    }

    /// Buffer `item`. Rejects ids already released or already buffered.
    pub fn push(&mut self, item: T) -> Result<(), ReorderError> {
        let id = item.sequence_id();
        if id < self.next_expected {
            return Err(ReorderError::Stale {
                id,
                next_expected: self.next_expected,
            });
        }
        if self.heap.iter().any(|Reverse(entry)| entry.0 == id) {
            return Err(ReorderError::Duplicate(id));
        }
        self.heap.push(Reverse(Entry(id, item)));
        self.peak = self.peak.max(self.heap.len());
        Ok(())
    }

    /// Release the smallest buffered item if it is the next expected one.
    pub fn pop_ready(&mut self) -> Option<T> {
        match self.heap.peek() {
            Some(Reverse(entry)) if entry.0 == self.next_expected => {}
            _ => return None,
        }
        let Reverse(Entry(_, item)) = self.heap.pop()?;
        self.next_expected += 1;
        Some(item)
    }

    /// Release every item that is now in sequence.
    pub fn drain_ready(&mut self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(move || self.pop_ready())
    }

    pub fn next_expected(&self) -> u64 {
        self.next_expected
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Largest number of items held at once.
    pub fn peak(&self) -> usize {
        self.peak
    }
}
