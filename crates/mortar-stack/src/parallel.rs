//! Lock-free views of a [`ConcurrentStack`](crate::ConcurrentStack).
//!
//! Both views share the stack's atomic length as the only synchronisation
//! point. A push reserves slot `len` with fetch-and-add; a pop claims slot
//! `len - 1` with fetch-and-sub. Each reservation is unique because the
//! counter update is atomic, so no two workers ever touch the same slot.
//!
//! Neither view grows the buffer. Both borrow the stack mutably, so they
//! cannot coexist with each other, with owner-mode calls, or with a resize.

#![allow(unsafe_code)]

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

use mortar_core::{trap, Violation};

use crate::stack::CONTAINER;

/// Concurrent push access with a fixed capacity.
///
/// Obtained from [`ConcurrentStack::as_parallel_writer`](crate::ConcurrentStack::as_parallel_writer).
pub struct ParallelWriter<'a, T> {
    slots: *mut T,
    capacity: usize,
    len: &'a AtomicUsize,
    _borrow: PhantomData<&'a mut [T]>,
}

/// Concurrent pop access.
///
/// Obtained from [`ConcurrentStack::as_parallel_reader`](crate::ConcurrentStack::as_parallel_reader).
pub struct ParallelReader<'a, T> {
    slots: *mut T,
    capacity: usize,
    len: &'a AtomicUsize,
    _borrow: PhantomData<&'a mut [T]>,
}

// SAFETY: the views hold the stack's exclusive borrow. Slot indices are
// handed out by atomic read-modify-write on `len`, so each slot is accessed
// by one worker at a time. Values move between threads, hence `T: Send`.
unsafe impl<T: Send> Send for ParallelWriter<'_, T> {}
// SAFETY: see above.
unsafe impl<T: Send> Sync for ParallelWriter<'_, T> {}
// SAFETY: see above.
unsafe impl<T: Send> Send for ParallelReader<'_, T> {}
// SAFETY: see above.
unsafe impl<T: Send> Sync for ParallelReader<'_, T> {}

// Compile-time assertion: both views can be shared by worker threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ParallelWriter<'static, u64>>();
    assert::<ParallelReader<'static, u64>>();
};

impl<'a, T: Copy> ParallelWriter<'a, T> {
    pub(crate) fn new(slots: *mut T, capacity: usize, len: &'a AtomicUsize) -> Self {
        Self {
            slots,
            capacity,
            len,
            _borrow: PhantomData,
        }
    }

    /// Capacity fixed when the view was created.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current element count. Only a snapshot while pushes are in flight.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Whether the stack was empty at the time of the load.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Push `value` into a freshly reserved slot.
    ///
    /// # Panics
    ///
    /// Panics with [`Violation::CapacityExceeded`] if every slot is taken.
    /// The failed reservation is rolled back first, so the length stays
    /// within capacity.
    #[track_caller]
    pub fn push_no_resize(&self, value: T) {
        let idx = self.len.fetch_add(1, Ordering::AcqRel);
        if idx >= self.capacity {
            self.len.fetch_sub(1, Ordering::AcqRel);
            trap(Violation::CapacityExceeded {
                container: CONTAINER,
                requested: idx + 1,
                capacity: self.capacity,
            });
        }
        // SAFETY: idx < capacity, and the fetch_add gave this slot to this
        // call alone.
        unsafe { self.slots.add(idx).write(value) };
    }
}

impl<'a, T: Copy + Default> ParallelReader<'a, T> {
    pub(crate) fn new(slots: *mut T, capacity: usize, len: &'a AtomicUsize) -> Self {
        Self {
            slots,
            capacity,
            len,
            _borrow: PhantomData,
        }
    }

    /// Capacity of the underlying buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current element count. Only a snapshot while pops are in flight.
    ///
    /// Racing pops on an empty stack may briefly push the raw counter below
    /// zero; that transient reads as empty.
    pub fn len(&self) -> usize {
        match self.len.load(Ordering::Acquire) {
            n if n > self.capacity => 0,
            n => n,
        }
    }

    /// Whether the stack was empty at the time of the load.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pop the top element, or `None` if the stack is empty.
    ///
    /// Racing pops each claim a distinct slot. A pop that finds nothing
    /// undoes its decrement, so the length never settles below zero.
    pub fn pop(&self) -> Option<T> {
        let prev = self.len.fetch_sub(1, Ordering::AcqRel);
        let idx = prev.wrapping_sub(1);
        if idx >= self.capacity {
            self.len.fetch_add(1, Ordering::AcqRel);
            return None;
        }
        // SAFETY: idx < capacity, and the fetch_sub gave this slot to this
        // call alone. No push can run while the reader borrow is alive.
        unsafe {
            let slot = self.slots.add(idx);
            let value = slot.read();
            slot.write(T::default());
            Some(value)
        }
    }
}
