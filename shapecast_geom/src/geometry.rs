// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The closed set of shape geometries.

use kurbo::{Affine, Circle, Point, Rect, Vec2};

use crate::intersect::{RayIntersect, ray_circle, ray_polygon, ray_rect};
use crate::overlap::{
    Manifold, overlap_circle_circle, overlap_polygon_circle, overlap_polygon_polygon,
    overlap_polygon_rect, overlap_rect_circle, overlap_rect_rect,
};
use crate::polygon::Polygon;
use crate::primitives::Ray;
use crate::rect::RectExt;

/// A circle, axis-aligned rectangle or polygon.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    /// A circle.
    Circle(Circle),
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A polygon; convex whenever it takes part in overlap tests.
    Polygon(Polygon),
}

impl Geometry {
    /// Axis-aligned bounding box.
    pub fn bounding_box(&self) -> Rect {
        match self {
            Self::Circle(c) => Rect::from_center_size(c.center, (2.0 * c.radius, 2.0 * c.radius)),
            Self::Rect(r) => r.abs(),
            Self::Polygon(p) => p.bounds(),
        }
    }

    /// Whether `p` lies inside or on the boundary.
    pub fn contains(&self, p: Point) -> bool {
        match self {
            Self::Circle(c) => (p - c.center).hypot2() <= c.radius * c.radius,
            Self::Rect(r) => r.abs().contains_inclusive(p),
            Self::Polygon(poly) => poly.contains(p),
        }
    }

    /// A representative interior point: circle or rectangle center, polygon centroid.
    pub fn center(&self) -> Point {
        match self {
            Self::Circle(c) => c.center,
            Self::Rect(r) => r.center(),
            Self::Polygon(p) => p.centroid(),
        }
    }

    /// Map the geometry through `affine`.
    ///
    /// Circles keep their shape: the radius becomes the mapped length of a
    /// horizontal radius. Rectangles become the bounding box of their mapped
    /// corners. Polygons map vertex by vertex.
    pub fn apply_transform(&mut self, affine: Affine) {
        match self {
            Self::Circle(c) => {
                let center = affine * c.center;
                let rim = affine * (c.center + Vec2::new(c.radius, 0.0));
                *c = Circle::new(center, (rim - center).hypot());
            }
            Self::Rect(r) => *r = affine.transform_rect_bbox(r.abs()),
            Self::Polygon(p) => *p = p.transformed(affine),
        }
    }

    /// [`apply_transform`](Self::apply_transform) on a copy.
    #[must_use]
    pub fn transformed(&self, affine: Affine) -> Self {
        let mut g = self.clone();
        g.apply_transform(affine);
        g
    }

    /// Separating-axis overlap of `self` against `other`.
    ///
    /// The manifold normal points from `other` towards `self`.
    ///
    /// # Panics
    ///
    /// Panics if a polygon operand is not convex.
    pub fn overlap(&self, other: &Self) -> Option<Manifold> {
        overlap(self, other)
    }
}

impl RayIntersect for Geometry {
    fn ray_intersection(&self, ray: &Ray) -> Option<Point> {
        match self {
            Self::Circle(c) => ray_circle(ray, c),
            Self::Rect(r) => ray_rect(ray, r),
            Self::Polygon(p) => ray_polygon(ray, p),
        }
    }
}

/// Overlap of any two geometries; the normal points from `b` towards `a`.
///
/// # Panics
///
/// Panics if a polygon operand is not convex.
pub fn overlap(a: &Geometry, b: &Geometry) -> Option<Manifold> {
    use Geometry::{Circle as C, Polygon as P, Rect as R};
    match (a, b) {
        (C(a), C(b)) => overlap_circle_circle(a, b),
        (C(a), R(b)) => overlap_rect_circle(b, a).map(Manifold::flipped),
        (C(a), P(b)) => overlap_polygon_circle(b, a).map(Manifold::flipped),
        (R(a), C(b)) => overlap_rect_circle(a, b),
        (R(a), R(b)) => overlap_rect_rect(a, b),
        (R(a), P(b)) => overlap_polygon_rect(b, a).map(Manifold::flipped),
        (P(a), C(b)) => overlap_polygon_circle(a, b),
        (P(a), R(b)) => overlap_polygon_rect(a, b),
        (P(a), P(b)) => overlap_polygon_polygon(a, b),
    }
}

impl From<Circle> for Geometry {
    fn from(c: Circle) -> Self {
        Self::Circle(c)
    }
}

impl From<Rect> for Geometry {
    fn from(r: Rect) -> Self {
        Self::Rect(r)
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Self {
        Self::Polygon(p)
    }
}
