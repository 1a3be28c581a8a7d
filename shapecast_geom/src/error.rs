// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for geometry construction.

use thiserror::Error;

/// Errors raised while constructing geometry from caller-supplied data.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GeometryError {
    /// A polygon needs at least three vertices.
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    /// A vertex coordinate was NaN or infinite.
    #[error("polygon vertex {index} is not finite")]
    NonFiniteVertex {
        /// Position of the offending vertex.
        index: usize,
    },
    /// The polygon encloses no area.
    #[error("polygon has zero area")]
    Degenerate,
}
