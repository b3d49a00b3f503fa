//! Array-backed binary min-heap keyed on node weight
//!
//! Ties between equal weights are resolved only by array position and the
//! sift path, so a fixed input order always yields the same extraction order.

use crate::error::{CompressError, Result};

/// Anything the heap can order.
pub trait Weighted {
    fn weight(&self) -> u64;
}

#[derive(Debug, Clone)]
pub struct MinHeap<T> {
    elements: Vec<T>,
}

impl<T> MinHeap<T> {
    pub fn new() -> Self {
        MinHeap {
            elements: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn parent(i: usize) -> usize {
        (i - 1) / 2
    }

    fn left(i: usize) -> usize {
        2 * i + 1
    }

    fn right(i: usize) -> usize {
        2 * i + 2
    }
}

impl<T: Weighted> MinHeap<T> {
    /// Heapify `source` in place in O(n).
    pub fn build(source: Vec<T>) -> Self {
        let mut heap = MinHeap { elements: source };
        let n = heap.len();
        for i in (0..n / 2).rev() {
            heap.sift_down(i);
        }
        heap
    }

    pub fn peek(&self) -> Option<&T> {
        self.elements.first()
    }

    pub fn insert(&mut self, value: T) {
        self.elements.push(value);
        self.sift_up(self.elements.len() - 1);
    }

    pub fn extract_min(&mut self) -> Result<T> {
        if self.elements.is_empty() {
            return Err(CompressError::HeapUnderflow);
        }
        let min = self.elements.swap_remove(0);
        if !self.elements.is_empty() {
            self.sift_down(0);
        }
        Ok(min)
    }

    fn sift_down(&mut self, mut i: usize) {
        let n = self.elements.len();
        loop {
            let l = Self::left(i);
            let r = Self::right(i);
            let mut smallest = i;
            if l < n && self.elements[l].weight() < self.elements[smallest].weight() {
                smallest = l;
            }
            if r < n && self.elements[r].weight() < self.elements[smallest].weight() {
                smallest = r;
            }
            if smallest == i {
                return;
            }
            self.elements.swap(i, smallest);
            i = smallest;
        }
    }

    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let p = Self::parent(i);
            if self.elements[i].weight() >= self.elements[p].weight() {
                return;
            }
            self.elements.swap(i, p);
            i = p;
        }
    }

    #[cfg(test)]
    fn is_valid(&self) -> bool {
        (1..self.elements.len())
            .all(|i| self.elements[Self::parent(i)].weight() <= self.elements[i].weight())
    }
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}
