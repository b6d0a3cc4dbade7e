//! Cell metadata and operation status codes.

use std::fmt;

/// Metadata stored per cell: the cell's identity and how many payloads its
/// bucket holds.
///
/// `index` doubles as the bucket's location: payloads for this node live at
/// `values[index * max_per_bucket ..][.. count]`. A negative `count` marks
/// the cell vacant (never written, or cleared).
///
/// Aligned to 8 bytes so a node can be updated as a single `u64` by the
/// parallel writer.
#[repr(C, align(8))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Node {
    /// Cell identity and bucket base.
    pub index: i32,
    /// Number of payloads in the bucket, or negative when vacant.
    pub count: i32,
}

impl Node {
    /// Returned for out-of-bounds queries; also the state of fresh cells.
    pub const NULL: Node = Node {
        index: -1,
        count: -1,
    };

    /// A zeroed node: cell 0 with an empty bucket.
    pub const EMPTY: Node = Node { index: 0, count: 0 };

    /// Create a node.
    pub const fn new(index: i32, count: i32) -> Self {
        Self { index, count }
    }

    /// Whether the cell holds no bucket (`count < 0`).
    #[inline]
    pub const fn is_vacant(&self) -> bool {
        self.count < 0
    }

    /// Number of payloads, treating a vacant cell as empty.
    #[inline]
    pub const fn len(&self) -> usize {
        if self.count < 0 {
            0
        } else {
            self.count as usize
        }
    }

    /// Whether the bucket holds no payloads.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count <= 0
    }

    /// Pack into the in-memory representation, for atomic updates.
    #[inline]
    pub(crate) fn to_bits(self) -> u64 {
        let mut bytes = [0u8; 8];
        bytes[..4].copy_from_slice(&self.index.to_ne_bytes());
        bytes[4..].copy_from_slice(&self.count.to_ne_bytes());
        u64::from_ne_bytes(bytes)
    }

    /// Inverse of [`to_bits`](Node::to_bits).
    #[inline]
    pub(crate) fn from_bits(bits: u64) -> Self {
        let bytes = bits.to_ne_bytes();
        Self {
            index: i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            count: i32::from_ne_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node(index={}, count={})", self.index, self.count)
    }
}

/// Outcome of a spatial index operation.
///
/// Returned by value on the hot path; never allocated, never an `Err`.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndexStatus {
    /// The operation completed without growing the index.
    Ok,
    /// The index grew to fit the key. Earlier cells are unchanged.
    IncreasedCapacity,
    /// The key is beyond the current capacity. Nothing was read or written.
    OutOfBounds,
    /// Reserved; no operation currently reports it. Inserts overwrite.
    AlreadyExists,
}

impl IndexStatus {
    /// Whether the operation succeeded (with or without growth).
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::IncreasedCapacity)
    }
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::IncreasedCapacity => write!(f, "increased capacity"),
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::AlreadyExists => write!(f, "already exists"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels() {
        assert!(Node::NULL.is_vacant());
        assert_eq!(Node::NULL.len(), 0);
        assert!(!Node::EMPTY.is_vacant());
        assert!(Node::EMPTY.is_empty());
    }

    #[test]
    fn node_is_one_word() {
        assert_eq!(std::mem::size_of::<Node>(), 8);
        assert_eq!(std::mem::align_of::<Node>(), 8);
    }

    #[test]
    fn bits_round_trip() {
        let node = Node::new(12345, -7);
        assert_eq!(Node::from_bits(node.to_bits()), node);
        assert_eq!(Node::NULL.to_bits(), u64::MAX);
        assert_eq!(Node::EMPTY.to_bits(), 0);
    }

    #[test]
    fn status_success() {
        assert!(IndexStatus::Ok.is_ok());
        assert!(IndexStatus::IncreasedCapacity.is_ok());
        assert!(!IndexStatus::OutOfBounds.is_ok());
        assert_eq!(IndexStatus::OutOfBounds.to_string(), "out of bounds");
    }
}
