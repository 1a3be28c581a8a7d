// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear primitives: rays, infinite lines and finite segments.

use kurbo::{Point, Vec2};

use crate::tolerance::{EPSILON, approx_eq, normalized};

/// A half-line starting at `origin` and extending along a unit `direction`.
///
/// The direction is normalized on construction. A zero direction is kept as
/// zero; such a ray is [degenerate](Self::is_degenerate) and hits nothing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    origin: Point,
    direction: Vec2,
}

impl Ray {
    /// Create a ray, normalizing `direction`.
    pub fn new(origin: impl Into<Point>, direction: impl Into<Vec2>) -> Self {
        Self {
            origin: origin.into(),
            direction: normalized(direction.into()),
        }
    }

    /// Create a ray from `origin` towards `target`.
    pub fn towards(origin: impl Into<Point>, target: impl Into<Point>) -> Self {
        let origin = origin.into();
        Self::new(origin, target.into() - origin)
    }

    /// Start point.
    #[inline]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Unit direction (zero for a degenerate ray).
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Whether the direction is zero.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vec2::ZERO
    }

    /// Point at distance `t` along the ray.
    #[inline]
    pub fn at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }

    /// Signed distance of the projection of `p` onto the ray, measured from the origin.
    ///
    /// Negative values lie behind the origin.
    #[inline]
    pub fn parameter_of(&self, p: Point) -> f64 {
        (p - self.origin).dot(self.direction)
    }

    /// Whether `p` lies on the ray (within tolerance).
    pub fn contains_point(&self, p: Point) -> bool {
        let offset = p - self.origin;
        if self.is_degenerate() {
            return approx_eq(offset.hypot(), 0.0);
        }
        approx_eq(self.direction.cross(offset), 0.0) && self.parameter_of(p) >= -EPSILON
    }
}

/// An infinite line through two distinct points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Line {
    /// First point on the line.
    pub p0: Point,
    /// Second point on the line.
    pub p1: Point,
}

impl Line {
    /// Create a line through `p0` and `p1`.
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    /// Unit direction from `p0` towards `p1`.
    #[inline]
    pub fn direction(&self) -> Vec2 {
        normalized(self.p1 - self.p0)
    }

    /// Perpendicular distance from `p` to the line.
    pub fn distance_to(&self, p: Point) -> f64 {
        let dir = self.direction();
        if dir == Vec2::ZERO {
            return (p - self.p0).hypot();
        }
        dir.cross(p - self.p0).abs()
    }

    /// Whether `p` lies on the line (within tolerance).
    pub fn contains_point(&self, p: Point) -> bool {
        approx_eq(self.distance_to(p), 0.0)
    }
}

/// A finite segment between two endpoints.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    /// Start point.
    pub p0: Point,
    /// End point.
    pub p1: Point,
}

impl Segment {
    /// Create a segment from `p0` to `p1`.
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Self {
        Self {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    /// Euclidean length.
    #[inline]
    pub fn length(&self) -> f64 {
        (self.p1 - self.p0).hypot()
    }

    /// Unit direction from `p0` towards `p1`, zero if the endpoints coincide.
    #[inline]
    pub fn direction(&self) -> Vec2 {
        normalized(self.p1 - self.p0)
    }

    /// Midpoint.
    #[inline]
    pub fn midpoint(&self) -> Point {
        self.p0.midpoint(self.p1)
    }

    /// Closest point on the segment to `p`.
    pub fn closest_point(&self, p: Point) -> Point {
        let d = self.p1 - self.p0;
        let len2 = d.hypot2();
        if len2 == 0.0 {
            return self.p0;
        }
        let t = ((p - self.p0).dot(d) / len2).clamp(0.0, 1.0);
        self.p0 + d * t
    }

    /// Distance from `p` to the closest point on the segment.
    pub fn distance_to(&self, p: Point) -> f64 {
        (p - self.closest_point(p)).hypot()
    }

    /// Whether `p` lies on the segment (within tolerance).
    pub fn contains_point(&self, p: Point) -> bool {
        approx_eq(self.distance_to(p), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ray_direction_is_normalized() {
        let r = Ray::new((1.0, 1.0), (3.0, 4.0));
        assert_relative_eq!(r.direction().hypot(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.at(5.0).x, 4.0, epsilon = 1e-12);
        assert_relative_eq!(r.at(5.0).y, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn ray_parameter_is_signed() {
        let r = Ray::new((0.0, 0.0), (1.0, 0.0));
        assert_relative_eq!(r.parameter_of(Point::new(3.0, 7.0)), 3.0, epsilon = 1e-12);
        assert_relative_eq!(r.parameter_of(Point::new(-2.0, 1.0)), -2.0, epsilon = 1e-12);
        assert!(r.contains_point(Point::new(2.0, 0.0)));
        assert!(!r.contains_point(Point::new(-2.0, 0.0)));
    }

    #[test]
    fn zero_direction_is_degenerate() {
        let r = Ray::new((0.0, 0.0), (0.0, 0.0));
        assert!(r.is_degenerate());
        assert!(r.contains_point(Point::ZERO));
    }

    #[test]
    fn segment_closest_point_clamps() {
        let s = Segment::new((0.0, 0.0), (2.0, 0.0));
        assert_eq!(s.closest_point(Point::new(-1.0, 1.0)), Point::new(0.0, 0.0));
        assert_eq!(s.closest_point(Point::new(1.0, 1.0)), Point::new(1.0, 0.0));
        assert!(s.contains_point(Point::new(1.5, 0.0)));
        assert!(!s.contains_point(Point::new(2.5, 0.0)));
    }

    #[test]
    fn line_distance() {
        let l = Line::new((0.0, 0.0), (1.0, 1.0));
        assert_relative_eq!(l.distance_to(Point::new(1.0, 0.0)), core::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert!(l.contains_point(Point::new(-5.0, -5.0)));
    }
}
