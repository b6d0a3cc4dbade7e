//! Growable LIFO stack with lock-free parallel views.
//!
//! # Architecture
//!
//! ```text
//! ConcurrentStack<T, A>
//! ├── RawBuffer<T, A>   slots, T::default() when free
//! ├── AtomicUsize       length / top-of-stack, shared with the views
//! └── DisposeGuard      use-after-dispose traps (debug builds)
//!
//! owner mode (&mut self)   push (grows) / pop / peek / reserve
//! as_parallel_writer()     push_no_resize   fetch_add, never grows
//! as_parallel_reader()     pop              fetch_sub, undo on empty
//! ```
//!
//! Structural growth happens only in owner mode. Size the stack with
//! [`ConcurrentStack::reserve`] before a concurrent push phase.
//!
//! # Example
//!
//! ```
//! use mortar_stack::ConcurrentStack;
//!
//! let mut stack = ConcurrentStack::with_capacity(64).unwrap();
//! {
//!     let writer = stack.as_parallel_writer();
//!     std::thread::scope(|s| {
//!         for t in 0..4u32 {
//!             let writer = &writer;
//!             s.spawn(move || writer.push_no_resize(t));
//!         }
//!     });
//! }
//! assert_eq!(stack.len(), 4);
//! stack.dispose();
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod parallel;
pub mod stack;

// Public re-exports for the primary API surface.
pub use parallel::{ParallelReader, ParallelWriter};
pub use stack::ConcurrentStack;
