//! The Morton-addressed spatial index.
//!
//! [`SpatialIndex`] is a flat array of [`Node`]s addressed directly by Z-order
//! key, plus a second flat array holding every cell's payload bucket. The two
//! arrays grow together: the value array is always exactly
//! `capacity * max_per_bucket` long, so a node's index maps to its bucket by
//! multiplication alone.
//!
//! ```text
//! nodes:  [ n0 | n1 | n2 | ... ]              capacity cells
//! values: [ b0 ........ | b1 ........ | ... ] capacity * max_per_bucket
//!           ^ n.index * max_per_bucket, n.count slots used
//! ```
//!
//! Keys are used as offsets, not hashed. Sparse key ranges still pay for
//! every cell in between.

use std::fmt;

use mortar_core::{
    debug_log, encode, trace_log, trap, Allocator, ContainerError, DisposeGuard, Global,
    RawBuffer, Violation,
};

use crate::config::IndexConfig;
use crate::node::{IndexStatus, Node};
use crate::parallel::{IndexReader, IndexWriter};

const CONTAINER: &str = "SpatialIndex";
const BUCKET: &str = "SpatialIndex bucket";

/// Spatial key/value index addressed by Morton code.
///
/// Each cell holds a [`Node`] and a bucket of up to `max_per_bucket`
/// payloads (`P` is typically an opaque entity handle). All mutating
/// operations take `&mut self`; for concurrent phases see
/// [`as_parallel_writer`](SpatialIndex::as_parallel_writer) and
/// [`as_parallel_reader`](SpatialIndex::as_parallel_reader).
pub struct SpatialIndex<P: Copy + Default, A: Allocator + Clone = Global> {
    nodes: RawBuffer<Node, A>,
    values: RawBuffer<P, A>,
    max_per_bucket: usize,
    guard: DisposeGuard,
}

impl<P: Copy + Default> SpatialIndex<P> {
    /// Create an index on the global heap.
    pub fn new(config: IndexConfig) -> Result<Self, ContainerError> {
        Self::new_in(config, Global)
    }
}

impl<P: Copy + Default, A: Allocator + Clone> SpatialIndex<P, A> {
    /// Create an index whose buffers come from `alloc`.
    ///
    /// Every cell starts vacant ([`Node::NULL`]).
    pub fn new_in(config: IndexConfig, alloc: A) -> Result<Self, ContainerError> {
        config.validate()?;
        let value_capacity =
            config
                .value_capacity()
                .ok_or_else(|| ContainerError::InvalidConfig {
                    reason: "value array overflows usize".into(),
                })?;
        let nodes = RawBuffer::filled_in(config.initial_capacity, Node::NULL, alloc.clone())?;
        let values = RawBuffer::filled_in(value_capacity, P::default(), alloc)?;
        Ok(Self {
            nodes,
            values,
            max_per_bucket: config.max_per_bucket,
            guard: DisposeGuard::new(CONTAINER),
        })
    }

    /// Number of addressable cells.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Payload slots per cell.
    #[inline]
    pub fn max_per_bucket(&self) -> usize {
        self.max_per_bucket
    }

    /// Read the node stored at `key`.
    ///
    /// Returns [`IndexStatus::OutOfBounds`] with [`Node::NULL`] if `key` is
    /// beyond the current capacity.
    #[track_caller]
    pub fn query(&self, key: u32) -> (IndexStatus, Node) {
        self.guard.check_live();
        match self.nodes.as_slice().get(key as usize) {
            Some(&node) => (IndexStatus::Ok, node),
            None => (IndexStatus::OutOfBounds, Node::NULL),
        }
    }

    /// [`query`](SpatialIndex::query) by point.
    #[track_caller]
    pub fn query_point(&self, x: i32, y: i32) -> (IndexStatus, Node) {
        self.query(encode(x, y))
    }

    /// The payloads stored for `key`, oldest first.
    ///
    /// Empty for vacant or out-of-bounds cells, and for nodes whose
    /// index/count do not describe a bucket inside the value array.
    #[track_caller]
    pub fn bucket(&self, key: u32) -> &[P] {
        self.guard.check_live();
        match self.nodes.as_slice().get(key as usize) {
            Some(node) => bucket_of(node, self.max_per_bucket, self.values.as_slice()),
            None => &[],
        }
    }

    /// Status plus payloads for the cell at a point.
    #[track_caller]
    pub fn query_bucket(&self, x: i32, y: i32) -> (IndexStatus, &[P]) {
        let key = encode(x, y);
        match self.query(key) {
            (IndexStatus::Ok, node) => (
                IndexStatus::Ok,
                bucket_of(&node, self.max_per_bucket, self.values.as_slice()),
            ),
            (status, _) => (status, &[]),
        }
    }

    /// Overwrite the node at `key`, growing if needed.
    ///
    /// This is a blind upsert: the previous node is replaced, never merged.
    #[track_caller]
    pub fn insert(&mut self, key: u32, node: Node) -> IndexStatus {
        self.guard.check_live();
        let grew = self.ensure_capacity(key as usize);
        self.nodes.as_mut_slice()[key as usize] = node;
        status(grew)
    }

    /// [`insert`](SpatialIndex::insert) by point.
    #[track_caller]
    pub fn insert_node_at(&mut self, x: i32, y: i32, node: Node) -> IndexStatus {
        self.insert(encode(x, y), node)
    }

    /// Append `payload` to the bucket at `key`, growing if needed.
    ///
    /// The first append to a vacant cell initialises it to
    /// `Node { index: key, count: 0 }`. Appends keep insertion order.
    ///
    /// # Panics
    ///
    /// Panics with [`Violation::CapacityExceeded`] if the bucket already
    /// holds `max_per_bucket` payloads, and with
    /// [`Violation::IndexOutOfRange`] if the stored node's index does not
    /// address a bucket within capacity.
    #[track_caller]
    pub fn insert_value(&mut self, key: u32, payload: P) -> IndexStatus {
        self.guard.check_live();
        let grew = self.ensure_capacity(key as usize);
        let capacity = self.capacity();
        let max = self.max_per_bucket;

        let node = &mut self.nodes.as_mut_slice()[key as usize];
        if node.is_vacant() {
            *node = Node::new(cell_identity(key, capacity), 0);
        }
        let slot = node.count as usize;
        if slot >= max {
            trap(Violation::CapacityExceeded {
                container: BUCKET,
                requested: slot + 1,
                capacity: max,
            });
        }
        let base = bucket_base(node.index, capacity, max);
        node.count += 1;
        self.values.as_mut_slice()[base + slot] = payload;
        status(grew)
    }

    /// [`insert_value`](SpatialIndex::insert_value) by point.
    #[track_caller]
    pub fn insert_point(&mut self, x: i32, y: i32, payload: P) -> IndexStatus {
        self.insert_value(encode(x, y), payload)
    }

    /// Mark every cell vacant.
    ///
    /// Logical reset only: node indices and the value array are left as they
    /// are, and no memory is freed or shrunk.
    #[track_caller]
    pub fn clear(&mut self) {
        self.guard.check_live();
        for node in self.nodes.as_mut_slice() {
            node.count = -1;
        }
        trace_log!(capacity = self.capacity(), "spatial index cleared");
    }

    /// Grow so that `required_index` is addressable.
    ///
    /// If `required_index >= capacity`, both arrays grow to
    /// `required_index * 2` cells (at least `required_index + 1`), keeping
    /// every existing node and payload. New cells start vacant. Returns
    /// whether growth happened.
    ///
    /// # Panics
    ///
    /// Panics if the grown value array would overflow `usize`.
    #[track_caller]
    pub fn ensure_capacity(&mut self, required_index: usize) -> bool {
        self.guard.check_live();
        if required_index < self.capacity() {
            return false;
        }
        let new_capacity = required_index
            .saturating_mul(2)
            .max(required_index.saturating_add(1));
        let Some(new_value_capacity) = new_capacity.checked_mul(self.max_per_bucket) else {
            panic!("{CONTAINER}: value array for {new_capacity} cells overflows usize");
        };
        debug_log!(
            old_capacity = self.capacity(),
            new_capacity,
            "spatial index growing"
        );
        self.nodes.grow(new_capacity, Node::NULL);
        self.values.grow(new_value_capacity, P::default());
        true
    }

    /// Free both arrays.
    ///
    /// In debug builds any later use, including a second `dispose`, panics
    /// with [`Violation::UseAfterDispose`]. Dropping without disposing also
    /// frees the memory.
    #[track_caller]
    pub fn dispose(&mut self) {
        self.guard.dispose();
        self.nodes.release();
        self.values.release();
        debug_log!(container = CONTAINER, "disposed");
    }

    /// Shared, bounds-checked read access for a read-only phase.
    ///
    /// The view is `Copy + Sync` and can be handed to any number of workers.
    #[track_caller]
    pub fn as_parallel_reader(&self) -> IndexReader<'_, P, A> {
        self.guard.check_live();
        IndexReader::new(self)
    }

    /// Fixed-capacity, lock-free write access for a concurrent phase.
    ///
    /// The view never resizes; size the index with
    /// [`ensure_capacity`](SpatialIndex::ensure_capacity) first. It borrows
    /// the index mutably, so no resize can happen while it is alive.
    #[track_caller]
    pub fn as_parallel_writer(&mut self) -> IndexWriter<'_, P> {
        self.guard.check_live();
        let capacity = self.capacity();
        let max_per_bucket = self.max_per_bucket;
        IndexWriter::new(
            self.nodes.as_mut_ptr(),
            self.values.as_mut_ptr(),
            capacity,
            max_per_bucket,
        )
    }
}

impl<P: Copy + Default, A: Allocator + Clone> fmt::Debug for SpatialIndex<P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("capacity", &self.capacity())
            .field("max_per_bucket", &self.max_per_bucket)
            .finish_non_exhaustive()
    }
}

#[inline]
fn status(grew: bool) -> IndexStatus {
    if grew {
        IndexStatus::IncreasedCapacity
    } else {
        IndexStatus::Ok
    }
}

/// The payload slice a node describes, or empty if it describes none.
pub(crate) fn bucket_of<'v, P>(node: &Node, max_per_bucket: usize, values: &'v [P]) -> &'v [P] {
    let Ok(index) = usize::try_from(node.index) else {
        return &[];
    };
    let len = node.len().min(max_per_bucket);
    index
        .checked_mul(max_per_bucket)
        .and_then(|base| values.get(base..base + len))
        .unwrap_or(&[])
}

/// The node index a vacant cell at `key` is initialised with.
#[track_caller]
pub(crate) fn cell_identity(key: u32, capacity: usize) -> i32 {
    match i32::try_from(key) {
        Ok(index) => index,
        Err(_) => trap(Violation::IndexOutOfRange {
            container: CONTAINER,
            index: key as usize,
            capacity: capacity.min(i32::MAX as usize),
        }),
    }
}

/// First value slot of the bucket for a node index.
#[track_caller]
pub(crate) fn bucket_base(index: i32, capacity: usize, max_per_bucket: usize) -> usize {
    match usize::try_from(index) {
        Ok(i) if i < capacity => i * max_per_bucket,
        _ => trap(Violation::IndexOutOfRange {
            container: BUCKET,
            index: index as usize,
            capacity,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(capacity: usize, max_per_bucket: usize) -> SpatialIndex<u32> {
        SpatialIndex::new(IndexConfig::new(capacity).with_max_per_bucket(max_per_bucket)).unwrap()
    }

    #[test]
    fn fresh_cells_are_null() {
        let index = small(8, 4);
        assert_eq!(index.query(3), (IndexStatus::Ok, Node::NULL));
        assert!(index.bucket(3).is_empty());
    }

    #[test]
    fn query_out_of_bounds() {
        let index = small(8, 4);
        assert_eq!(index.query(8), (IndexStatus::OutOfBounds, Node::NULL));
        assert_eq!(index.query(u32::MAX).0, IndexStatus::OutOfBounds);
        assert!(index.bucket(100).is_empty());
    }

    #[test]
    fn insert_then_query() {
        let mut index = small(16, 4);
        let node = Node::new(7, 0);
        assert_eq!(index.insert(5, node), IndexStatus::Ok);
        assert_eq!(index.query(5), (IndexStatus::Ok, node));
    }

    #[test]
    fn insert_is_blind_upsert() {
        let mut index = small(16, 4);
        let _ = index.insert(2, Node::new(2, 3));
        let _ = index.insert(2, Node::new(9, 1));
        assert_eq!(index.query(2).1, Node::new(9, 1));
    }

    #[test]
    fn insert_past_capacity_grows() {
        let mut index = small(4, 2);
        assert_eq!(index.insert(10, Node::EMPTY), IndexStatus::IncreasedCapacity);
        assert_eq!(index.capacity(), 20);
        assert_eq!(index.query(10).1, Node::EMPTY);
    }

    #[test]
    fn insert_at_exact_capacity_grows() {
        let mut index = small(4, 2);
        assert_eq!(index.insert(4, Node::EMPTY), IndexStatus::IncreasedCapacity);
        assert_eq!(index.capacity(), 8);
    }

    #[test]
    fn zero_capacity_grows_on_key_zero() {
        let mut index = small(0, 2);
        assert_eq!(index.insert_value(0, 1), IndexStatus::IncreasedCapacity);
        assert_eq!(index.capacity(), 1);
        assert_eq!(index.bucket(0), &[1]);
    }

    #[test]
    fn insert_value_initialises_vacant_cell() {
        let mut index = small(16, 4);
        assert_eq!(index.insert_value(6, 100), IndexStatus::Ok);
        assert_eq!(index.query(6).1, Node::new(6, 1));
        assert_eq!(index.bucket(6), &[100]);
    }

    #[test]
    fn insert_value_appends_in_order() {
        let mut index = small(16, 4);
        for p in [10, 20, 30] {
            let _ = index.insert_value(3, p);
        }
        assert_eq!(index.query(3).1.count, 3);
        assert_eq!(index.bucket(3), &[10, 20, 30]);
    }

    #[test]
    fn neighbouring_buckets_do_not_overlap() {
        let mut index = small(4, 3);
        for p in 0..3 {
            let _ = index.insert_value(0, p);
            let _ = index.insert_value(1, 100 + p);
        }
        assert_eq!(index.bucket(0), &[0, 1, 2]);
        assert_eq!(index.bucket(1), &[100, 101, 102]);
    }

    #[test]
    fn bucket_follows_node_index() {
        let mut index = small(8, 2);
        let _ = index.insert_value(5, 42);
        // Point key 1 at key 5's bucket.
        let _ = index.insert(1, Node::new(5, 1));
        assert_eq!(index.bucket(1), &[42]);
    }

    #[test]
    #[should_panic(expected = "SpatialIndex bucket: capacity exceeded")]
    fn bucket_overflow_traps() {
        let mut index = small(4, 2);
        for p in 0..3 {
            let _ = index.insert_value(1, p);
        }
    }

    #[test]
    #[should_panic(expected = "index 9 out of range")]
    fn foreign_node_index_traps_on_append() {
        let mut index = small(4, 2);
        let _ = index.insert(1, Node::new(9, 0));
        let _ = index.insert_value(1, 7);
    }

    #[test]
    fn clear_vacates_without_freeing() {
        let mut index = small(8, 4);
        let _ = index.insert_value(2, 11);
        let _ = index.insert_value(2, 12);
        index.clear();
        assert_eq!(index.capacity(), 8);
        let (status, node) = index.query(2);
        assert_eq!(status, IndexStatus::Ok);
        assert!(node.is_vacant());
        assert_eq!(node.index, 2);
        assert!(index.bucket(2).is_empty());

        // Refilling starts the bucket over.
        let _ = index.insert_value(2, 13);
        assert_eq!(index.bucket(2), &[13]);
    }

    #[test]
    fn growth_preserves_buckets() {
        let mut index = small(4, 3);
        let _ = index.insert_value(1, 5);
        let _ = index.insert_value(1, 6);
        let _ = index.insert_value(3, 9);
        assert!(index.ensure_capacity(50));
        assert_eq!(index.capacity(), 100);
        assert_eq!(index.bucket(1), &[5, 6]);
        assert_eq!(index.bucket(3), &[9]);
        assert!(index.query(60).1.is_vacant());
        assert!(!index.ensure_capacity(99));
    }

    #[test]
    fn point_overloads_use_morton_keys() {
        let mut index = small(64, 4);
        assert_eq!(index.insert_point(3, 5, 77), IndexStatus::Ok);
        assert_eq!(index.query(39).1, Node::new(39, 1));
        assert_eq!(index.query_point(3, 5).1, Node::new(39, 1));
        assert_eq!(index.query_bucket(3, 5), (IndexStatus::Ok, &[77][..]));

        let _ = index.insert_node_at(1, 1, Node::new(3, 0));
        assert_eq!(index.query(3).1, Node::new(3, 0));
    }

    #[test]
    fn query_bucket_out_of_bounds() {
        let index = small(4, 4);
        let (status, bucket) = index.query_bucket(100, 100);
        assert_eq!(status, IndexStatus::OutOfBounds);
        assert!(bucket.is_empty());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "SpatialIndex: used after dispose")]
    fn query_after_dispose_traps() {
        let mut index = small(4, 4);
        index.dispose();
        let _ = index.query(0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "used after dispose")]
    fn insert_after_dispose_traps() {
        let mut index = small(4, 4);
        index.dispose();
        let _ = index.insert_value(0, 1);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "used after dispose")]
    fn double_dispose_traps() {
        let mut index = small(4, 4);
        index.dispose();
        index.dispose();
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn insert_query_round_trip(
                key in 0u32..4096,
                index in any::<i32>(),
                count in any::<i32>(),
            ) {
                let mut spatial = small(16, 2);
                let node = Node::new(index, count);
                let _ = spatial.insert(key, node);
                prop_assert_eq!(spatial.query(key), (IndexStatus::Ok, node));
            }

            #[test]
            fn buckets_keep_insertion_order(
                key in 0u32..256,
                payloads in proptest::collection::vec(any::<u32>(), 0..=8),
            ) {
                let mut spatial = small(32, 8);
                for &p in &payloads {
                    let _ = spatial.insert_value(key, p);
                }
                let expected_count = if payloads.is_empty() { -1 } else { payloads.len() as i32 };
                prop_assert_eq!(spatial.query(key).1.count, expected_count);
                prop_assert_eq!(spatial.bucket(key), &payloads[..]);
            }
        }
    }
}
