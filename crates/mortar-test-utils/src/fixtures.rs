//! Payloads and coordinate fixtures.

use mortar_core::encode;

/// Opaque entity handle, the typical spatial index payload.
///
/// `Default` is the null entity (index 0, version 0), which is what popped
/// stack slots and unused bucket slots hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub index: u32,
    pub version: u32,
}

impl Entity {
    pub const fn new(index: u32, version: u32) -> Self {
        Self { index, version }
    }
}

/// Every `(x, y)` in a `size x size` grid, row by row.
pub fn grid_points(size: i32) -> impl Iterator<Item = (i32, i32)> {
    (0..size).flat_map(move |y| (0..size).map(move |x| (x, y)))
}

/// Morton keys for [`grid_points`], in the same order.
pub fn grid_keys(size: i32) -> Vec<u32> {
    grid_points(size).map(|(x, y)| encode(x, y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_covers_square() {
        let points: Vec<_> = grid_points(3).collect();
        assert_eq!(points.len(), 9);
        assert_eq!(points[0], (0, 0));
        assert_eq!(points[8], (2, 2));
    }

    #[test]
    fn power_of_two_grid_fills_key_prefix() {
        let mut keys = grid_keys(4);
        keys.sort_unstable();
        assert_eq!(keys, (0..16).collect::<Vec<u32>>());
    }
}
