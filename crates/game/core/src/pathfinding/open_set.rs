use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Open-set entry. Ordered so the heap pops lowest f, then lowest h, then the
/// earliest insertion.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OpenEntry {
    pub index: usize,
    pub g: f32,
    pub h: f32,
    sequence: u64,
}

impl OpenEntry {
    pub fn f(&self) -> f32 {
        self.g + self.h
    }
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so every key is reversed.
        other
            .f()
            .total_cmp(&self.f())
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Priority queue with lazy deletion: improved nodes are pushed again and stale
/// entries are skipped by the caller once the node is closed.
#[derive(Debug, Default)]
pub(crate) struct OpenSet {
    heap: BinaryHeap<OpenEntry>,
    next_sequence: u64,
}

impl OpenSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: BinaryHeap::with_capacity(capacity),
            next_sequence: 0,
        }
    }

    pub fn push(&mut self, index: usize, g: f32, h: f32) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(OpenEntry { index, g, h, sequence });
    }

    pub fn pop(&mut self) -> Option<OpenEntry> {
        self.heap.pop()
    }
}
