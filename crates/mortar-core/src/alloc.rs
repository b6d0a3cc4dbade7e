//! Pluggable memory providers.
//!
//! Containers take their backing-memory provider as a type parameter rather
//! than reaching for a process-wide global, so tests can count allocations
//! and callers can route container memory to their own arenas.

#![allow(unsafe_code)]

use std::alloc::Layout;
use std::ptr::NonNull;

/// A source of raw memory for container buffers.
///
/// # Safety
///
/// Implementations must return either `None` or a pointer to a block that is
/// valid for reads and writes of `layout.size()` bytes, aligned to
/// `layout.align()`, and not aliased by any other live allocation. The block
/// must stay valid until passed back to [`deallocate`](Allocator::deallocate)
/// with the same layout.
///
/// Containers never call `allocate` with a zero-sized layout.
pub unsafe trait Allocator {
    /// Allocate a block described by `layout`, or `None` on exhaustion.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Return a block previously obtained from [`allocate`](Allocator::allocate).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `allocate` on this allocator with the
    /// same `layout`, and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// The process heap, via [`std::alloc`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Global;

// SAFETY: forwards to the registered global allocator, which upholds the
// same contract for non-zero-sized layouts.
unsafe impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        debug_assert!(layout.size() > 0, "zero-sized allocation requested");
        // SAFETY: layout has non-zero size (container contract).
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: caller guarantees ptr came from `allocate` with this layout.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

// SAFETY: a shared reference forwards to the same underlying allocator.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        (**self).allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract.
        unsafe { (**self).deallocate(ptr, layout) }
    }
}
