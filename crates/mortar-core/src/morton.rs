//! Two-dimensional Morton (Z-order) codes.
//!
//! Bits are interleaved from the low end, `x` on even positions and `y` on
//! odd ones: `... y2 x2 y1 x1 y0 x0`. Nearby points get nearby keys, which is
//! what lets the spatial index use keys directly as array offsets.
//!
//! # Domain
//!
//! Each coordinate contributes 16 bits to the 32-bit key. Coordinates are
//! reinterpreted as `u32`; negative values or values of 2^16 and above are
//! not clamped and wrap into unrelated keys.

const MASKS: [u32; 4] = [0x5555_5555, 0x3333_3333, 0x0F0F_0F0F, 0x00FF_00FF];
const SHIFTS: [u32; 4] = [1, 2, 4, 8];

#[inline]
const fn spread(v: u32) -> u32 {
    let v = (v | (v << SHIFTS[3])) & MASKS[3];
    let v = (v | (v << SHIFTS[2])) & MASKS[2];
    let v = (v | (v << SHIFTS[1])) & MASKS[1];
    (v | (v << SHIFTS[0])) & MASKS[0]
}

#[inline]
const fn compact(v: u32) -> u32 {
    let v = v & MASKS[0];
    let v = (v | (v >> SHIFTS[0])) & MASKS[1];
    let v = (v | (v >> SHIFTS[1])) & MASKS[2];
    let v = (v | (v >> SHIFTS[2])) & MASKS[3];
    (v | (v >> SHIFTS[3])) & 0x0000_FFFF
}

/// Encode a point into its Z-order key.
///
/// ```
/// assert_eq!(mortar_core::encode(3, 5), 39);
/// ```
#[inline]
pub const fn encode(x: i32, y: i32) -> u32 {
    spread(x as u32) | (spread(y as u32) << 1)
}

/// Recover the point encoded by [`encode`].
///
/// Exact for coordinates in `[0, 2^16)`.
#[inline]
pub const fn decode(key: u32) -> (i32, i32) {
    (compact(key) as i32, compact(key >> 1) as i32)
}
