//! Core building blocks for Mortar containers.
//!
//! This is the leaf crate with zero internal dependencies. It provides the
//! pieces shared by the spatial index and the concurrent stack:
//!
//! ```text
//! morton::encode(x, y) ──► u32 key ──► SpatialIndex (mortar-index)
//!
//! Allocator ──► RawBuffer<T, A> ──┬─► SpatialIndex nodes + bucket values
//!                                 └─► ConcurrentStack slots (mortar-stack)
//!
//! DisposeGuard: liveness checks in debug builds, nothing in release
//! ```
//!
//! # Unsafe code
//!
//! Raw allocation lives in [`alloc`] and [`buffer`]. Everything else in the
//! crate is safe code; those two modules opt back in with a module-level
//! `allow` and carry a `// SAFETY:` comment on every block.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

#[macro_use]
pub mod log;

pub mod alloc;
pub mod buffer;
pub mod error;
pub mod guard;
pub mod morton;

// Public re-exports for the primary API surface.
pub use alloc::{Allocator, Global};
pub use buffer::RawBuffer;
pub use error::{trap, ContainerError, Violation};
pub use guard::DisposeGuard;
pub use morton::{decode, encode};

#[doc(hidden)]
pub mod __private {
    #[cfg(feature = "tracing")]
    pub use tracing;
}
