//! Morton-addressed spatial index for Mortar.
//!
//! A [`SpatialIndex`] maps Z-order keys (see [`mortar_core::encode`]) to
//! [`Node`]s and keeps a fixed-size payload bucket per cell. Keys index the
//! node array directly, so lookups are a bounds check and a load.
//!
//! # Architecture
//!
//! ```text
//! SpatialIndex<P, A>
//! ├── RawBuffer<Node, A>   capacity cells, Node::NULL when vacant
//! ├── RawBuffer<P, A>      capacity * max_per_bucket payload slots
//! └── DisposeGuard         use-after-dispose traps (debug builds)
//!
//! as_parallel_reader(&self)     ──► IndexReader  (Copy + Sync, read-only)
//! as_parallel_writer(&mut self) ──► IndexWriter  (Sync, fixed capacity, CAS appends)
//! ```
//!
//! # Example
//!
//! ```
//! use mortar_index::{IndexConfig, IndexStatus, SpatialIndex};
//!
//! let mut index: SpatialIndex<u32> = SpatialIndex::new(IndexConfig::default()).unwrap();
//! assert_eq!(index.insert_point(3, 5, 7), IndexStatus::Ok);
//! assert_eq!(index.query_bucket(3, 5), (IndexStatus::Ok, &[7][..]));
//! index.dispose();
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod config;
pub mod index;
pub mod node;
pub mod parallel;

// Public re-exports for the primary API surface.
pub use config::IndexConfig;
pub use index::SpatialIndex;
pub use node::{IndexStatus, Node};
pub use parallel::{IndexReader, IndexWriter};
