//! The owner-mode stack.
//!
//! [`ConcurrentStack`] is a LIFO buffer whose length counter is an atomic.
//! While the owner holds it, every operation goes through `&mut self` and
//! the counter is accessed plainly. The parallel views in
//! [`parallel`](crate::parallel) share the same counter across workers and
//! reserve slots with fetch-and-add / fetch-and-sub.

use std::alloc::Layout;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use mortar_core::{debug_log, Allocator, ContainerError, DisposeGuard, Global, RawBuffer};

use crate::parallel::{ParallelReader, ParallelWriter};

pub(crate) const CONTAINER: &str = "ConcurrentStack";

/// Growable LIFO stack with lock-free parallel views.
///
/// `T: Copy + Default`: popped slots are reset to `T::default()` so the
/// buffer never keeps a stale payload alive past its pop.
pub struct ConcurrentStack<T: Copy + Default, A: Allocator = Global> {
    slots: RawBuffer<T, A>,
    len: AtomicUsize,
    guard: DisposeGuard,
}

impl<T: Copy + Default> ConcurrentStack<T> {
    /// Create an empty stack on the global heap with room for `capacity`
    /// elements.
    pub fn with_capacity(capacity: usize) -> Result<Self, ContainerError> {
        Self::with_capacity_in(capacity, Global)
    }
}

impl<T: Copy + Default, A: Allocator> ConcurrentStack<T, A> {
    /// Create an empty stack backed by `alloc`.
    ///
    /// Returns [`ContainerError::CapacityOverflow`] if `capacity` elements of
    /// `T` do not form a valid allocation.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self, ContainerError> {
        Ok(Self {
            slots: RawBuffer::filled_in(capacity, T::default(), alloc)?,
            len: AtomicUsize::new(0),
            guard: DisposeGuard::new(CONTAINER),
        })
    }

    /// Number of elements on the stack.
    #[inline]
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Whether the stack is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots allocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// The live elements, bottom first.
    #[track_caller]
    pub fn as_slice(&self) -> &[T] {
        self.guard.check_live();
        &self.slots.as_slice()[..self.len()]
    }

    /// Push `value`, doubling the capacity first if the stack is full.
    #[track_caller]
    pub fn push(&mut self, value: T) {
        self.guard.check_live();
        let len = *self.len.get_mut();
        if len == self.slots.capacity() {
            let new_capacity = len.saturating_mul(2).max(1);
            self.slots.grow(new_capacity, T::default());
        }
        self.slots.as_mut_slice()[len] = value;
        *self.len.get_mut() = len + 1;
    }

    /// Pop the top element, or `None` if the stack is empty.
    ///
    /// The freed slot is reset to `T::default()`.
    #[track_caller]
    pub fn pop(&mut self) -> Option<T> {
        self.guard.check_live();
        let len = self.len.get_mut();
        let top = len.checked_sub(1)?;
        *len = top;
        let slot = &mut self.slots.as_mut_slice()[top];
        Some(std::mem::take(slot))
    }

    /// The top element, without removing it.
    ///
    /// Callers are expected to track emptiness themselves; use
    /// [`is_empty`](ConcurrentStack::is_empty) when unsure.
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty.
    #[track_caller]
    pub fn peek(&self) -> T {
        self.guard.check_live();
        match self.len().checked_sub(1) {
            Some(top) => self.slots.as_slice()[top],
            None => panic!("{CONTAINER}: peek on an empty stack"),
        }
    }

    /// Make room for at least `additional` more elements.
    ///
    /// Grows to the larger of the required size and double the current
    /// capacity. Call this before entering a parallel push phase, since
    /// [`ParallelWriter`] never grows.
    #[track_caller]
    pub fn reserve(&mut self, additional: usize) -> Result<(), ContainerError> {
        self.guard.check_live();
        let len = *self.len.get_mut();
        let overflow = |requested| ContainerError::CapacityOverflow {
            requested,
            element_size: std::mem::size_of::<T>(),
        };
        let required = len
            .checked_add(additional)
            .ok_or_else(|| overflow(additional))?;
        let capacity = self.slots.capacity();
        if required <= capacity {
            return Ok(());
        }
        let doubled = capacity.saturating_mul(2);
        let new_capacity = if doubled > required && Layout::array::<T>(doubled).is_ok() {
            doubled
        } else {
            required
        };
        Layout::array::<T>(new_capacity).map_err(|_| overflow(new_capacity))?;
        self.slots.grow(new_capacity, T::default());
        Ok(())
    }

    /// Free the backing buffer.
    ///
    /// In debug builds any later use, including a second `dispose`, panics
    /// with [`Violation::UseAfterDispose`](mortar_core::Violation::UseAfterDispose).
    #[track_caller]
    pub fn dispose(&mut self) {
        self.guard.dispose();
        self.slots.release();
        *self.len.get_mut() = 0;
        debug_log!(container = CONTAINER, "disposed");
    }

    /// Fixed-capacity view for a concurrent push phase.
    ///
    /// Reserve room with [`reserve`](ConcurrentStack::reserve) first: pushes
    /// beyond the current capacity trap.
    #[track_caller]
    pub fn as_parallel_writer(&mut self) -> ParallelWriter<'_, T> {
        self.guard.check_live();
        let capacity = self.slots.capacity();
        let slots = self.slots.as_mut_ptr();
        ParallelWriter::new(slots, capacity, &self.len)
    }

    /// View for a concurrent pop phase.
    ///
    /// Takes `&mut self` like the writer: a pop phase and a push phase never
    /// overlap, so a pop can never observe a slot that is reserved but not
    /// yet written.
    #[track_caller]
    pub fn as_parallel_reader(&mut self) -> ParallelReader<'_, T> {
        self.guard.check_live();
        let capacity = self.slots.capacity();
        let slots = self.slots.as_mut_ptr();
        ParallelReader::new(slots, capacity, &self.len)
    }
}

impl<T: Copy + Default, A: Allocator> fmt::Debug for ConcurrentStack<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentStack")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
