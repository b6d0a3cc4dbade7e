//! Owned, allocator-backed arrays with explicit growth.
//!
//! [`RawBuffer`] is the storage primitive under every Mortar container. It
//! owns one allocation, is always fully initialised, and only changes size
//! when its owner calls [`grow`](RawBuffer::grow). Growth allocates a new
//! block, copies the existing prefix byte for byte, fills the tail, then
//! frees the old block. Pointers handed out before a growth are dangling
//! afterwards; containers rely on `&mut self` to rule that out.

#![allow(unsafe_code)]

use std::alloc::{handle_alloc_error, Layout};
use std::fmt;
use std::ops::Range;
use std::ptr::NonNull;

use crate::alloc::{Allocator, Global};
use crate::error::ContainerError;

/// A fixed-capacity, fully initialised array that grows only on request.
///
/// `T: Copy` keeps the buffer free of drop glue: growth and release are
/// plain byte copies and frees.
pub struct RawBuffer<T: Copy, A: Allocator = Global> {
    ptr: NonNull<T>,
    capacity: usize,
    alloc: A,
}

// SAFETY: the buffer uniquely owns its allocation; sending it sends the
// elements and the allocator.
unsafe impl<T: Copy + Send, A: Allocator + Send> Send for RawBuffer<T, A> {}
// SAFETY: shared access only hands out `&[T]` and `&A`.
unsafe impl<T: Copy + Sync, A: Allocator + Sync> Sync for RawBuffer<T, A> {}

impl<T: Copy> RawBuffer<T> {
    /// Allocate `capacity` elements from the global heap, each set to `fill`.
    pub fn filled(capacity: usize, fill: T) -> Result<Self, ContainerError> {
        Self::filled_in(capacity, fill, Global)
    }
}

impl<T: Copy, A: Allocator> RawBuffer<T, A> {
    /// Allocate `capacity` elements from `alloc`, each set to `fill`.
    ///
    /// Returns [`ContainerError::CapacityOverflow`] if the byte size does not
    /// fit a valid layout. Allocator exhaustion goes through
    /// [`handle_alloc_error`], like the standard collections.
    pub fn filled_in(capacity: usize, fill: T, alloc: A) -> Result<Self, ContainerError> {
        let layout = Self::layout_for(capacity)?;
        let ptr = Self::allocate(&alloc, layout);
        // SAFETY: `ptr` is valid for `capacity` writes of T (or dangling with
        // capacity 0 / zero-sized T, where writes are no-ops).
        unsafe { fill_raw(ptr, 0..capacity, fill) };
        Ok(Self {
            ptr,
            capacity,
            alloc,
        })
    }

    /// Number of elements.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The allocator backing this buffer.
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Shared view of every element.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: ptr is valid and initialised for `capacity` elements.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.capacity) }
    }

    /// Exclusive view of every element.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.capacity) }
    }

    /// Raw pointer to the first element, for accessors that coordinate their
    /// own disjoint writes. Valid until the next `grow` or `release`.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Set every element in `range` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is not within `0..capacity`.
    pub fn fill(&mut self, range: Range<usize>, value: T) {
        self.as_mut_slice()[range].fill(value);
    }

    /// Grow to `new_capacity` elements, preserving the existing prefix and
    /// setting the new tail to `fill`.
    ///
    /// Does nothing if `new_capacity <= capacity`; buffers never shrink.
    ///
    /// # Panics
    ///
    /// Panics if the new byte size overflows a layout.
    pub fn grow(&mut self, new_capacity: usize, fill: T) {
        if new_capacity <= self.capacity {
            return;
        }
        let new_layout = match Self::layout_for(new_capacity) {
            Ok(layout) => layout,
            Err(err) => panic!("{err}"),
        };
        let new_ptr = Self::allocate(&self.alloc, new_layout);
        // SAFETY: both blocks are valid for `self.capacity` elements and come
        // from distinct allocations, so they cannot overlap. The tail range
        // is within the new block.
        unsafe {
            std::ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.capacity);
            fill_raw(new_ptr, self.capacity..new_capacity, fill);
        }
        debug_log!(
            element = std::any::type_name::<T>(),
            old_capacity = self.capacity,
            new_capacity,
            "buffer grown"
        );
        self.free();
        self.ptr = new_ptr;
        self.capacity = new_capacity;
    }

    /// Free the allocation and leave an empty buffer behind.
    ///
    /// Idempotent: releasing an already-empty buffer does nothing. The buffer
    /// remains usable and can be grown again.
    pub fn release(&mut self) {
        self.free();
        self.ptr = NonNull::dangling();
        self.capacity = 0;
    }

    fn free(&mut self) {
        if std::mem::size_of::<T>() == 0 || self.capacity == 0 {
            return;
        }
        // The layout was validated when this capacity was allocated.
        if let Ok(layout) = Layout::array::<T>(self.capacity) {
            // SAFETY: ptr came from `allocate` on this allocator with exactly
            // this layout and is not used again by the caller.
            unsafe { self.alloc.deallocate(self.ptr.cast(), layout) };
        }
    }

    fn layout_for(capacity: usize) -> Result<Layout, ContainerError> {
        Layout::array::<T>(capacity).map_err(|_| ContainerError::CapacityOverflow {
            requested: capacity,
            element_size: std::mem::size_of::<T>(),
        })
    }

    fn allocate(alloc: &A, layout: Layout) -> NonNull<T> {
        if layout.size() == 0 {
            return NonNull::dangling();
        }
        match alloc.allocate(layout) {
            Some(ptr) => ptr.cast(),
            None => handle_alloc_error(layout),
        }
    }
}

/// Write `value` into every slot of `range`.
///
/// # Safety
///
/// `ptr` must be valid for writes of `range.end` elements of T.
unsafe fn fill_raw<T: Copy>(ptr: NonNull<T>, range: Range<usize>, value: T) {
    for i in range {
        // SAFETY: i < range.end, within the caller-guaranteed extent.
        unsafe { ptr.as_ptr().add(i).write(value) };
    }
}

impl<T: Copy, A: Allocator> Drop for RawBuffer<T, A> {
    fn drop(&mut self) {
        self.free();
    }
}

impl<T: Copy + fmt::Debug, A: Allocator> fmt::Debug for RawBuffer<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
