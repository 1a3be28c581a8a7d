// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query surface shared by the static partition tree and the dynamic grid.

use core::ops::ControlFlow;

use kurbo::{Point, Rect};
use shapecast_geom::Ray;

use crate::result::RayHit;
use crate::shape::ShapeId;

/// A spatial partition over shape handles and their cached bounds.
///
/// Partitions only know bounds. Exact geometry tests are supplied by the
/// caller as closures so that partitions never touch the shape arena.
pub trait Backend {
    /// Number of shapes held.
    fn len(&self) -> usize;

    /// Whether no shapes are held.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bounds enclosing every shape held, if any.
    fn bounds(&self) -> Option<Rect>;

    /// Call `f` once for each shape whose bounds touch `rect` (edges inclusive).
    ///
    /// Stops as soon as `f` breaks, and returns that break.
    fn visit_rect<F>(&self, rect: Rect, f: F) -> ControlFlow<()>
    where
        F: FnMut(ShapeId) -> ControlFlow<()>;

    /// Call `f` once for each shape whose bounds contain `point` (edges inclusive).
    fn visit_point<F>(&self, point: Point, f: F) -> ControlFlow<()>
    where
        F: FnMut(ShapeId) -> ControlFlow<()>;

    /// Nearest hit along `ray` no farther than `max_distance`.
    ///
    /// `hit_test` returns where the ray meets a candidate, or `None` to skip it.
    fn ray_cast<F>(&self, ray: &Ray, max_distance: f64, hit_test: F) -> Option<RayHit>
    where
        F: FnMut(ShapeId) -> Option<Point>;
}

/// Keep the nearer of `best` and a new hit on `shape` at `point`.
pub(crate) fn keep_nearest(
    best: &mut Option<RayHit>,
    ray: &Ray,
    shape: ShapeId,
    point: Point,
    max_distance: f64,
) {
    let parameter = ray.parameter_of(point);
    if parameter > max_distance {
        return;
    }
    if best.is_none_or(|b| parameter < b.parameter) {
        *best = Some(RayHit {
            shape,
            point,
            parameter,
        });
    }
}
