//! Borrowed views of a [`SpatialIndex`] for concurrent phases.
//!
//! Resizing reallocates both arrays, so it can never overlap with workers
//! holding pointers into them. The views make that a borrow rule:
//!
//! - [`IndexReader`] borrows the index shared. Any number of workers can
//!   read; nobody can write or resize.
//! - [`IndexWriter`] borrows the index exclusively and fixes its capacity at
//!   creation. Workers share `&IndexWriter` and append concurrently; a write
//!   beyond capacity traps instead of growing.
//!
//! Writers reserve bucket slots with a compare-and-swap on the cell's node
//! (a single 64-bit word), so two workers appending to the same key always
//! receive distinct slots. Relative order between workers is unspecified.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use mortar_core::{trap, Allocator, Violation};

use crate::index::{bucket_base, cell_identity, SpatialIndex};
use crate::node::{IndexStatus, Node};

const WRITER: &str = "SpatialIndex writer";
const BUCKET: &str = "SpatialIndex bucket";

/// Read-only, bounds-checked view of a [`SpatialIndex`].
pub struct IndexReader<'a, P: Copy + Default, A: Allocator + Clone> {
    index: &'a SpatialIndex<P, A>,
}

impl<'a, P: Copy + Default, A: Allocator + Clone> IndexReader<'a, P, A> {
    pub(crate) fn new(index: &'a SpatialIndex<P, A>) -> Self {
        Self { index }
    }

    /// Number of addressable cells.
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// Read the node at `key`; see [`SpatialIndex::query`].
    pub fn query(&self, key: u32) -> (IndexStatus, Node) {
        self.index.query(key)
    }

    /// The node at `key`, or `None` if out of bounds.
    pub fn get(&self, key: u32) -> Option<Node> {
        match self.index.query(key) {
            (IndexStatus::Ok, node) => Some(node),
            _ => None,
        }
    }

    /// Payloads at `key`; see [`SpatialIndex::bucket`].
    pub fn bucket(&self, key: u32) -> &'a [P] {
        self.index.bucket(key)
    }
}

impl<P: Copy + Default, A: Allocator + Clone> Clone for IndexReader<'_, P, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Copy + Default, A: Allocator + Clone> Copy for IndexReader<'_, P, A> {}

/// Fixed-capacity, lock-free writer over a [`SpatialIndex`].
///
/// Obtained from [`SpatialIndex::as_parallel_writer`]. Share it by reference
/// across worker threads for the duration of one write phase.
pub struct IndexWriter<'a, P> {
    nodes: *mut Node,
    values: *mut P,
    capacity: usize,
    max_per_bucket: usize,
    _borrow: PhantomData<&'a mut [P]>,
}

// SAFETY: the writer holds the index's exclusive borrow. Node cells are only
// touched through atomics, and each value slot is written by exactly the one
// worker that reserved it, so sharing across threads is sound as long as the
// payloads themselves can move between threads.
unsafe impl<P: Send> Send for IndexWriter<'_, P> {}
// SAFETY: see above.
unsafe impl<P: Send> Sync for IndexWriter<'_, P> {}

// Compile-time assertion: the writer can be shared by worker threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<IndexWriter<'static, u64>>();
};

impl<P: Copy> IndexWriter<'_, P> {
    pub(crate) fn new(
        nodes: *mut Node,
        values: *mut P,
        capacity: usize,
        max_per_bucket: usize,
    ) -> Self {
        Self {
            nodes,
            values,
            capacity,
            max_per_bucket,
            _borrow: PhantomData,
        }
    }

    /// Capacity fixed when the view was created.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Payload slots per cell.
    pub fn max_per_bucket(&self) -> usize {
        self.max_per_bucket
    }

    /// Store `node` at cell `node.index`, replacing whatever was there.
    ///
    /// # Panics
    ///
    /// Panics with [`Violation::IndexOutOfRange`] if `node.index` is negative
    /// or not below the fixed capacity.
    #[track_caller]
    pub fn add_no_resize(&self, node: Node) {
        let cell = match usize::try_from(node.index) {
            Ok(i) if i < self.capacity => i,
            _ => trap(Violation::IndexOutOfRange {
                container: WRITER,
                index: node.index as usize,
                capacity: self.capacity,
            }),
        };
        self.node_cell(cell).store(node.to_bits(), Ordering::Release);
    }

    /// Append `payload` to the bucket at `key`.
    ///
    /// Same bucket rules as [`SpatialIndex::insert_value`], but the capacity
    /// never changes.
    ///
    /// # Panics
    ///
    /// Panics with [`Violation::IndexOutOfRange`] if `key` is not below the
    /// fixed capacity, and with [`Violation::CapacityExceeded`] if the bucket
    /// is full.
    #[track_caller]
    pub fn insert_no_resize(&self, key: u32, payload: P) {
        let cell = key as usize;
        if cell >= self.capacity {
            trap(Violation::IndexOutOfRange {
                container: WRITER,
                index: cell,
                capacity: self.capacity,
            });
        }
        let atom = self.node_cell(cell);

        let mut current = atom.load(Ordering::Acquire);
        let (base, slot) = loop {
            let mut node = Node::from_bits(current);
            if node.is_vacant() {
                node = Node::new(cell_identity(key, self.capacity), 0);
            }
            let slot = node.count as usize;
            if slot >= self.max_per_bucket {
                trap(Violation::CapacityExceeded {
                    container: BUCKET,
                    requested: slot + 1,
                    capacity: self.max_per_bucket,
                });
            }
            let base = bucket_base(node.index, self.capacity, self.max_per_bucket);
            let next = Node::new(node.index, node.count + 1);
            match atom.compare_exchange_weak(
                current,
                next.to_bits(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break (base, slot),
                Err(actual) => current = actual,
            }
        };

        // SAFETY: base + slot < capacity * max_per_bucket because
        // bucket_base checked index < capacity and slot < max_per_bucket.
        // The CAS above handed this slot to this call alone.
        unsafe { self.values.add(base + slot).write(payload) };
    }

    fn node_cell(&self, cell: usize) -> &AtomicU64 {
        debug_assert!(cell < self.capacity);
        // SAFETY: cell < capacity, so the pointer is in bounds. Node is
        // 8-byte aligned and 8 bytes wide, matching AtomicU64. While the
        // writer lives it holds the index's exclusive borrow, so every access
        // to node memory goes through these atomics.
        unsafe { AtomicU64::from_ptr(self.nodes.add(cell).cast::<u64>()) }
    }
}

#[cfg(test)]
mod tests {
    use crate::{IndexConfig, SpatialIndex};

    use super::*;

    fn small(capacity: usize, max_per_bucket: usize) -> SpatialIndex<u32> {
        SpatialIndex::new(IndexConfig::new(capacity).with_max_per_bucket(max_per_bucket)).unwrap()
    }

    #[test]
    fn reader_matches_owner_queries() {
        let mut index = small(8, 4);
        let _ = index.insert_value(2, 9);
        let reader = index.as_parallel_reader();
        assert_eq!(reader.capacity(), 8);
        assert_eq!(reader.get(2), Some(Node::new(2, 1)));
        assert_eq!(reader.get(8), None);
        assert_eq!(reader.query(8).0, IndexStatus::OutOfBounds);
        assert_eq!(reader.bucket(2), &[9]);
    }

    #[test]
    fn readers_share_across_threads() {
        let mut index = small(64, 2);
        for key in 0..64 {
            let _ = index.insert_value(key, key * 10);
        }
        let reader = index.as_parallel_reader();
        std::thread::scope(|s| {
            for t in 0..4u32 {
                s.spawn(move || {
                    for key in (t..64).step_by(4) {
                        assert_eq!(reader.bucket(key), &[key * 10]);
                    }
                });
            }
        });
    }

    #[test]
    fn writer_add_no_resize() {
        let mut index = small(8, 2);
        {
            let writer = index.as_parallel_writer();
            writer.add_no_resize(Node::new(3, 0));
        }
        assert_eq!(index.query(3).1, Node::new(3, 0));
    }

    #[test]
    #[should_panic(expected = "SpatialIndex writer: index 8 out of range for capacity 8")]
    fn writer_add_beyond_capacity_traps() {
        let mut index = small(8, 2);
        let writer = index.as_parallel_writer();
        writer.add_no_resize(Node::new(8, 0));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn writer_add_negative_index_traps() {
        let mut index = small(8, 2);
        let writer = index.as_parallel_writer();
        writer.add_no_resize(Node::NULL);
    }

    #[test]
    fn writer_insert_matches_owner_semantics() {
        let mut index = small(8, 3);
        {
            let writer = index.as_parallel_writer();
            writer.insert_no_resize(5, 1);
            writer.insert_no_resize(5, 2);
        }
        assert_eq!(index.query(5).1, Node::new(5, 2));
        assert_eq!(index.bucket(5), &[1, 2]);
        assert_eq!(index.capacity(), 8);
    }

    #[test]
    #[should_panic(expected = "SpatialIndex writer: index 8 out of range")]
    fn writer_insert_beyond_capacity_traps() {
        let mut index = small(8, 2);
        let writer = index.as_parallel_writer();
        writer.insert_no_resize(8, 1);
    }

    #[test]
    #[should_panic(expected = "SpatialIndex bucket: capacity exceeded")]
    fn writer_bucket_overflow_traps() {
        let mut index = small(8, 2);
        let writer = index.as_parallel_writer();
        for p in 0..3 {
            writer.insert_no_resize(1, p);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "used after dispose")]
    fn writer_after_dispose_traps() {
        let mut index = small(8, 2);
        index.dispose();
        let _writer = index.as_parallel_writer();
    }
}
