// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for index construction.

use thiserror::Error;

/// Rejected [`IndexConfig`](crate::IndexConfig) values.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Grid cells must have a finite, positive size.
    #[error("grid cell size must be finite and positive, got {0}")]
    InvalidCellSize(f64),
    /// Static leaves must hold at least one shape.
    #[error("static leaf size must be at least 1, got {0}")]
    InvalidLeafSize(usize),
}
