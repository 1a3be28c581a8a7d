// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tunables for [`SpatialTree`](crate::SpatialTree).

use crate::error::ConfigError;

/// Default edge length of a dynamic grid cell.
pub const DEFAULT_CELL_SIZE: f64 = 4.0;

/// Index tunables.
///
/// ```rust
/// use shapecast_index::{IndexConfig, SpatialTree};
///
/// let config = IndexConfig::default().with_cell_size(16.0);
/// let tree = SpatialTree::with_config(config).unwrap();
/// assert_eq!(tree.config().cell_size, 16.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct IndexConfig {
    /// Edge length of the square cells of the dynamic grid.
    pub cell_size: f64,
    /// Largest number of shapes a static leaf holds before it is split.
    pub static_leaf_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            static_leaf_size: 1,
        }
    }
}

impl IndexConfig {
    /// Set the grid cell size.
    #[must_use]
    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the static leaf size.
    #[must_use]
    pub fn with_static_leaf_size(mut self, static_leaf_size: usize) -> Self {
        self.static_leaf_size = static_leaf_size;
        self
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if self.static_leaf_size == 0 {
            return Err(ConfigError::InvalidLeafSize(self.static_leaf_size));
        }
        Ok(())
    }
}
