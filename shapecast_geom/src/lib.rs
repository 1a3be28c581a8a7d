// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shapecast Geom: 2D shape primitives and the intersection algebra behind them.
//!
//! - Rays, infinite lines and segments on top of [`kurbo`] points and vectors.
//! - Circles, axis-aligned rectangles and polygons gathered in [`Geometry`].
//! - Nearest-hit ray tests through the [`RayIntersect`] trait.
//! - Separating-axis overlap tests that return a [`Manifold`] (normal and depth).
//!
//! Coordinates are `f64` in a y-up frame. Rectangle edges and corners are
//! numbered counter-clockwise starting at the right edge; see [`rect`].
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Circle, Point, Rect};
//! use shapecast_geom::{Geometry, Ray, RayIntersect};
//!
//! let wall = Geometry::from(Rect::new(2.0, -1.0, 3.0, 1.0));
//! let ball = Geometry::from(Circle::new((2.8, 0.0), 0.5));
//!
//! // Cast a ray along +x; it stops at the wall's left face.
//! let hit = wall.ray_intersection(&Ray::new((0.0, 0.0), (1.0, 0.0)));
//! assert_eq!(hit, Some(Point::new(2.0, 0.0)));
//!
//! // Pushing the ball 0.7 along +x separates it from the wall.
//! let m = ball.overlap(&wall).unwrap();
//! assert!((m.penetration - 0.7).abs() < 1e-9);
//! assert_eq!(m.normal.x, 1.0);
//! ```
//!
//! ### Float semantics
//!
//! Geometry is assumed free of NaNs. Comparisons that decide snapping and
//! parallelism use [`EPSILON`], absolutely or relative to magnitude.

pub mod error;
pub mod geometry;
pub mod intersect;
pub mod overlap;
pub mod polygon;
pub mod primitives;
pub mod rect;
pub mod tolerance;

pub use error::GeometryError;
pub use geometry::{Geometry, overlap};
pub use intersect::{
    RayIntersect, line_line, ray_circle, ray_line, ray_polygon, ray_ray, ray_rect, ray_segment,
    segment_segment,
};
pub use kurbo;
pub use overlap::Manifold;
pub use polygon::{Orientation, Polygon};
pub use primitives::{Line, Ray, Segment};
pub use rect::RectExt;
pub use tolerance::{EPSILON, approx_eq};
