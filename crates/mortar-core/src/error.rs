//! Error types shared by Mortar containers.
//!
//! Two tiers, kept apart on purpose:
//!
//! - [`ContainerError`] is recoverable and returned from constructors and
//!   sizing calls.
//! - [`Violation`] is a broken programmer contract (bucket overflow, writing
//!   past a fixed-capacity view, use after dispose). It is never returned;
//!   [`trap`] turns it into a panic at the caller's location.
//!
//! Hot-path outcomes that callers are expected to handle (out-of-bounds
//! queries, popping an empty stack) are plain values and live with their
//! containers.

use std::error::Error;
use std::fmt;

/// Recoverable errors from container construction and sizing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerError {
    /// `requested` elements of `element_size` bytes do not form a valid
    /// allocation layout.
    CapacityOverflow {
        /// Number of elements requested.
        requested: usize,
        /// Size of one element in bytes.
        element_size: usize,
    },
    /// A configuration value is outside its valid range.
    InvalidConfig {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow {
                requested,
                element_size,
            } => {
                write!(
                    f,
                    "capacity overflow: {requested} elements of {element_size} bytes"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid config: {reason}"),
        }
    }
}

impl Error for ContainerError {}

/// A fatal breach of a container's usage contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Violation {
    /// A fixed-size region (bucket or no-resize slot range) is full.
    CapacityExceeded {
        /// Container kind, for the diagnostic.
        container: &'static str,
        /// Slot count the operation needed.
        requested: usize,
        /// Slots available.
        capacity: usize,
    },
    /// An index beyond the capacity a write is allowed to reach.
    IndexOutOfRange {
        /// Container kind, for the diagnostic.
        container: &'static str,
        /// The offending index.
        index: usize,
        /// Capacity at the time of the write.
        capacity: usize,
    },
    /// The container was used after `dispose()`.
    UseAfterDispose {
        /// Container kind, for the diagnostic.
        container: &'static str,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                container,
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "{container}: capacity exceeded, needed {requested} slots but capacity is {capacity}"
                )
            }
            Self::IndexOutOfRange {
                container,
                index,
                capacity,
            } => {
                write!(
                    f,
                    "{container}: index {index} out of range for capacity {capacity}"
                )
            }
            Self::UseAfterDispose { container } => {
                write!(f, "{container}: used after dispose")
            }
        }
    }
}

impl Error for Violation {}

/// Abort the current operation with a contract violation.
///
/// Panics with the violation's message, attributed to the caller.
#[cold]
#[inline(never)]
#[track_caller]
pub fn trap(violation: Violation) -> ! {
    panic!("{violation}")
}
