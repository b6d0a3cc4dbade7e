//! Mortar: allocator-backed native containers for spatial and job-parallel
//! workloads.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Mortar sub-crates. For most users, adding `mortar` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use mortar::prelude::*;
//!
//! // Bucket entity ids by grid cell.
//! let mut index: SpatialIndex<u32> = SpatialIndex::new(IndexConfig::default()).unwrap();
//! let _ = index.insert_point(3, 5, 17);
//! let _ = index.insert_point(3, 5, 18);
//! assert_eq!(encode(3, 5), 39);
//! assert_eq!(index.bucket(39), &[17, 18]);
//!
//! // Hand out work to a pool of workers, then drain it.
//! let mut jobs = ConcurrentStack::with_capacity(8).unwrap();
//! {
//!     let writer = jobs.as_parallel_writer();
//!     std::thread::scope(|s| {
//!         for job in 0..8u32 {
//!             let writer = &writer;
//!             s.spawn(move || writer.push_no_resize(job));
//!         }
//!     });
//! }
//! let mut done = 0;
//! while jobs.pop().is_some() {
//!     done += 1;
//! }
//! assert_eq!(done, 8);
//!
//! index.dispose();
//! jobs.dispose();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`base`] | `mortar-core` | Morton encoding, allocators, `RawBuffer`, errors, dispose guard |
//! | [`index`] | `mortar-index` | `SpatialIndex`, `Node`, `IndexStatus`, parallel views |
//! | [`stack`] | `mortar-stack` | `ConcurrentStack` and its parallel views |
//!
//! # Logging
//!
//! Enable the `tracing` feature to emit growth, dispose, and leak events
//! through the `tracing` crate. Without it the logging macros compile away.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Shared building blocks (`mortar-core`).
///
/// Morton [`base::encode`]/[`base::decode`], the pluggable
/// [`base::Allocator`], the growable [`base::RawBuffer`], and the error types.
pub use mortar_core as base;

/// Morton-addressed spatial index (`mortar-index`).
///
/// [`index::SpatialIndex`] plus its [`index::IndexReader`] and
/// [`index::IndexWriter`] views.
pub use mortar_index as index;

/// Concurrent LIFO stack (`mortar-stack`).
///
/// [`stack::ConcurrentStack`] plus its [`stack::ParallelReader`] and
/// [`stack::ParallelWriter`] views.
pub use mortar_stack as stack;

/// Common imports for typical Mortar usage.
///
/// ```rust
/// use mortar::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use mortar_core::{decode, encode, Allocator, ContainerError, Global, Violation};

    // Spatial index
    pub use mortar_index::{IndexConfig, IndexReader, IndexStatus, IndexWriter, Node, SpatialIndex};

    // Stack
    pub use mortar_stack::{ConcurrentStack, ParallelReader, ParallelWriter};
}
