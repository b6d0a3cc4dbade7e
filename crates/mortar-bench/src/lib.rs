//! Benchmark workloads for the Mortar containers.
//!
//! - [`reference_index`]: 100x100 grid (10K cells), one payload per cell
//! - [`scattered_points`]: deterministic pseudo-random points via seed
//! - [`filled_stack`]: stack pre-loaded for pop benchmarks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use mortar_core::encode;
use mortar_index::{IndexConfig, SpatialIndex};
use mortar_stack::ConcurrentStack;

/// Side length of the reference grid.
pub const REFERENCE_SIDE: i32 = 100;

/// Build the reference index: every point of a 100x100 grid holds one
/// payload (its row-major cell number).
///
/// Pre-sized so that building it never grows.
pub fn reference_index() -> SpatialIndex<u32> {
    let side = REFERENCE_SIDE;
    let capacity = encode(side - 1, side - 1) as usize + 1;
    let config = IndexConfig::new(capacity).with_max_per_bucket(8);
    let mut index = SpatialIndex::new(config).unwrap();
    for y in 0..side {
        for x in 0..side {
            let _ = index.insert_point(x, y, (y * side + x) as u32);
        }
    }
    index
}

/// Generate `n` deterministic points in `[0, side)²`.
///
/// Same seed, same points. Points may repeat.
pub fn scattered_points(n: usize, side: i32, seed: u64) -> Vec<(i32, i32)> {
    let side = side.max(1) as u64;
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let x = (state >> 33) % side;
            let y = (state >> 13) % side;
            (x as i32, y as i32)
        })
        .collect()
}

/// A stack holding `0..len`, with room for exactly `len` elements.
pub fn filled_stack(len: usize) -> ConcurrentStack<u64> {
    let mut stack = ConcurrentStack::with_capacity(len).unwrap();
    for v in 0..len as u64 {
        stack.push(v);
    }
    stack
}
