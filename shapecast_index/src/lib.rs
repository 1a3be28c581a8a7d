// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shapecast Index: a two-partition 2D shape index for collision queries.
//!
//! - Store [`Shape`]s (circle, rectangle or convex polygon) in a caller-owned [`ShapeArena`].
//! - Register them in a [`SpatialTree`] as static (immobile) or dynamic (moving).
//! - Ask for the nearest ray hit, shapes in a rectangle, shapes under a point,
//!   or overlap contacts against a registered shape.
//!
//! Static shapes live in a binary partition tree rebuilt by [`SpatialTree::commit`].
//! Dynamic shapes live in a uniform hash grid that follows
//! [`SpatialTree::transform`] immediately. Queries can target either partition
//! or both through [`PartitionFilter`], and filter shapes by [`ShapeMask`].
//!
//! Results land in fixed-capacity [`ResultBuffer`]s of [`MAX_RESULTS`] entries.
//! A query that finds more matches stops and flags the buffer as
//! [truncated](ResultBuffer::truncated) instead of allocating.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Affine, Rect};
//! use shapecast_index::{PartitionFilter, Shape, ShapeArena, ShapeMask, SpatialTree};
//! use shapecast_geom::Ray;
//!
//! let mut arena = ShapeArena::new();
//! let mut tree = SpatialTree::new();
//!
//! let floor = arena.insert(Shape::from_rect(Rect::new(-10.0, -1.0, 10.0, 0.0)));
//! let crate_ = arena.insert(Shape::from_rect(Rect::new(0.0, 5.0, 1.0, 6.0)));
//! tree.add_static(&mut arena, floor);
//! tree.add_dynamic(&mut arena, crate_);
//! tree.commit(&arena);
//!
//! // Drop the crate onto the floor.
//! tree.transform(&mut arena, crate_, Affine::translate((0.0, -5.5)));
//!
//! let contacts = tree.intersection_query(&arena, crate_, PartitionFilter::ALL);
//! assert_eq!(contacts.len(), 1);
//! let c = contacts.get(0).unwrap();
//! assert_eq!(c.shape_b, floor);
//! assert_eq!(c.normal.y, 1.0);
//!
//! // Look straight down from above.
//! let ray = Ray::new((0.5, 10.0), (0.0, -1.0));
//! let hit = tree.ray_cast(&arena, &ray, ShapeMask::all(), PartitionFilter::ALL).unwrap();
//! assert_eq!(hit.shape, crate_);
//! ```
//!
//! ### Float semantics
//!
//! Geometry is assumed free of NaNs. Grid cell coordinates saturate at the
//! `i32` range.

pub mod backend;
pub mod config;
pub mod error;
pub mod grid;
pub mod index;
pub mod result;
pub mod shape;
pub mod static_tree;

pub use backend::Backend;
pub use config::{DEFAULT_CELL_SIZE, IndexConfig};
pub use error::ConfigError;
pub use grid::DynamicGrid;
pub use index::SpatialTree;
pub use result::{
    Contact, IntersectionQueryResult, MAX_RESULTS, PartitionFilter, RangeQueryResult, RayCastResult,
    RayHit, ResultBuffer,
};
pub use shape::{IndexId, Partition, Registration, Shape, ShapeArena, ShapeId, ShapeMask};
pub use static_tree::StaticTree;
