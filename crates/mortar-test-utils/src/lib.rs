//! Test utilities for Mortar development.
//!
//! Provides an instrumented [`CountingAllocator`], an [`Entity`] payload
//! handle like the ones callers store in a spatial index, grid fixtures, and
//! a one-shot [`init_tracing`] for tests run with `RUST_LOG`.

#![deny(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use mortar_core::{Allocator, Global};
use tracing_subscriber::EnvFilter;

pub use fixtures::{grid_keys, grid_points, Entity};

/// Allocator that forwards to [`Global`] and counts what passes through.
///
/// Containers take it by reference (`&CountingAllocator` implements
/// [`Allocator`]), so a test can keep inspecting the counters while the
/// container is alive and after it is dropped.
#[derive(Debug, Default)]
pub struct CountingAllocator {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total `allocate` calls that succeeded.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    /// Total `deallocate` calls.
    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::SeqCst)
    }

    /// Blocks currently outstanding.
    pub fn live_blocks(&self) -> usize {
        self.allocations() - self.deallocations()
    }

    /// Bytes currently outstanding.
    pub fn live_bytes(&self) -> usize {
        self.live_bytes.load(Ordering::SeqCst)
    }

    /// Highest `live_bytes` seen so far.
    pub fn peak_bytes(&self) -> usize {
        self.peak_bytes.load(Ordering::SeqCst)
    }
}

// SAFETY: every block comes from Global and goes back to it unchanged.
#[allow(unsafe_code)]
unsafe impl Allocator for CountingAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        let ptr = Global.allocate(layout)?;
        self.allocations.fetch_add(1, Ordering::SeqCst);
        let live = self.live_bytes.fetch_add(layout.size(), Ordering::SeqCst) + layout.size();
        self.peak_bytes.fetch_max(live, Ordering::SeqCst);
        Some(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.deallocations.fetch_add(1, Ordering::SeqCst);
        self.live_bytes.fetch_sub(layout.size(), Ordering::SeqCst);
        // SAFETY: forwarded contract; the block came from Global.allocate.
        unsafe { Global.deallocate(ptr, layout) }
    }
}

static INIT: Once = Once::new();

/// Install a fmt subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Safe to call from every test; only the first call takes effect. Output
/// goes through the test harness's capture. Containers only emit events when
/// built with the `tracing` feature.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
