//! Spatial index configuration.

use mortar_core::ContainerError;

/// Sizing parameters for a [`SpatialIndex`](crate::SpatialIndex).
///
/// Validated at construction. `max_per_bucket` is fixed for the index's
/// lifetime; `initial_capacity` only sets the starting cell count, since
/// inserts beyond it grow the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    /// Number of cells (addressable keys) allocated up front.
    ///
    /// Default: 1000.
    pub initial_capacity: usize,

    /// Payload slots reserved per cell.
    ///
    /// Default: 100. Must be at least 1 and fit in the node's `i32` count.
    pub max_per_bucket: usize,
}

impl IndexConfig {
    /// Default starting cell count.
    pub const DEFAULT_CAPACITY: usize = 1000;

    /// Default payload slots per cell.
    pub const DEFAULT_MAX_PER_BUCKET: usize = 100;

    /// Create a config with the given starting capacity and default bucket size.
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            max_per_bucket: Self::DEFAULT_MAX_PER_BUCKET,
        }
    }

    /// Override the bucket size.
    pub fn with_max_per_bucket(mut self, max_per_bucket: usize) -> Self {
        self.max_per_bucket = max_per_bucket;
        self
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<(), ContainerError> {
        if self.max_per_bucket == 0 {
            return Err(ContainerError::InvalidConfig {
                reason: "max_per_bucket must be at least 1".into(),
            });
        }
        if i32::try_from(self.max_per_bucket).is_err() {
            return Err(ContainerError::InvalidConfig {
                reason: format!(
                    "max_per_bucket {} does not fit a node count",
                    self.max_per_bucket
                ),
            });
        }
        if self.value_capacity().is_none() {
            return Err(ContainerError::InvalidConfig {
                reason: format!(
                    "{} cells of {} slots overflow the value array",
                    self.initial_capacity, self.max_per_bucket
                ),
            });
        }
        Ok(())
    }

    /// Length of the flat value array: `initial_capacity * max_per_bucket`.
    ///
    /// `None` if the product overflows.
    pub fn value_capacity(&self) -> Option<usize> {
        self.initial_capacity.checked_mul(self.max_per_bucket)
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
