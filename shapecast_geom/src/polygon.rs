// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simple polygons with convex-hull reduction.

use core::cmp::Ordering;

use kurbo::{Affine, Point, Rect, Vec2};

use crate::error::GeometryError;
use crate::primitives::Segment;
use crate::tolerance::{EPSILON, approx_eq_point, normalized, sign};

/// Winding direction of a polygon in a y-up frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Positive signed area.
    CounterClockwise,
    /// Negative signed area.
    Clockwise,
    /// Zero signed area.
    Degenerate,
}

/// A closed polygon given by its vertices; the last vertex connects back to the first.
///
/// Construction only checks that there are at least three finite vertices.
/// Convexity and simplicity are queried separately, and [`Polygon::to_convex`]
/// produces the counter-clockwise convex hull that the overlap tests expect.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    points: Vec<Point>,
    orientation: Orientation,
    convex: bool,
}

impl Polygon {
    /// Create a polygon from its vertices.
    pub fn new(points: impl IntoIterator<Item = Point>) -> Result<Self, GeometryError> {
        let points: Vec<Point> = points.into_iter().collect();
        if points.len() < 3 {
            return Err(GeometryError::TooFewVertices(points.len()));
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(GeometryError::NonFiniteVertex { index });
        }
        Ok(Self::from_vec(points))
    }

    /// The rectangle as a counter-clockwise quad starting at its bottom-right corner.
    pub fn from_rect(rect: Rect) -> Self {
        let r = rect.abs();
        Self::from_vec(vec![
            Point::new(r.x1, r.y0),
            Point::new(r.x1, r.y1),
            Point::new(r.x0, r.y1),
            Point::new(r.x0, r.y0),
        ])
    }

    fn from_vec(points: Vec<Point>) -> Self {
        let area = signed_area(&points);
        let orientation = if area > 0.0 {
            Orientation::CounterClockwise
        } else if area < 0.0 {
            Orientation::Clockwise
        } else {
            Orientation::Degenerate
        };
        let mut polygon = Self {
            points,
            orientation,
            convex: false,
        };
        polygon.convex = polygon.turns_one_way() && polygon.is_simple();
        polygon
    }

    /// Vertices in their stored order.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of vertices (and edges).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    /// Vertex `i`, wrapping around.
    #[inline]
    pub fn vertex(&self, i: usize) -> Point {
        self.points[i % self.points.len()]
    }

    /// Edge `i`, from vertex `i` to vertex `i + 1`, wrapping around.
    pub fn edge(&self, i: usize) -> Segment {
        Segment::new(self.vertex(i), self.vertex(i + 1))
    }

    /// All edges in order.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        (0..self.points.len()).map(|i| self.edge(i))
    }

    /// Outward unit normal of edge `i`, taking the winding into account.
    pub fn normal(&self, i: usize) -> Vec2 {
        let e = self.vertex(i + 1) - self.vertex(i);
        let n = match self.orientation {
            Orientation::Clockwise => Vec2::new(-e.y, e.x),
            _ => Vec2::new(e.y, -e.x),
        };
        normalized(n)
    }

    /// Winding direction.
    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Shoelace area, positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.points)
    }

    /// Unsigned area.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Area centroid, or the vertex average for degenerate polygons.
    pub fn centroid(&self) -> Point {
        let a = self.signed_area();
        if a.abs() <= EPSILON {
            let n = self.points.len() as f64;
            let sum = self
                .points
                .iter()
                .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
            return (sum / n).to_point();
        }
        let mut c = Vec2::ZERO;
        for i in 0..self.points.len() {
            let p = self.vertex(i).to_vec2();
            let q = self.vertex(i + 1).to_vec2();
            c += (p + q) * p.cross(q);
        }
        (c / (6.0 * a)).to_point()
    }

    /// Axis-aligned bounds of the vertices.
    pub fn bounds(&self) -> Rect {
        let first = self.points[0];
        let init = Rect::from_points(first, first);
        self.points[1..]
            .iter()
            .fold(init, |r, p| r.union_pt(*p))
    }

    /// Whether every turn has the same direction and no edges cross.
    #[inline]
    pub fn is_convex(&self) -> bool {
        self.convex
    }

    fn turns_one_way(&self) -> bool {
        let n = self.points.len();
        let mut turn = 0_i8;
        for i in 0..n {
            let e0 = self.vertex(i + 1) - self.vertex(i);
            let e1 = self.vertex(i + 2) - self.vertex(i + 1);
            let c = e0.cross(e1);
            if c.abs() <= EPSILON * e0.hypot().max(e1.hypot()).max(1.0) {
                continue;
            }
            let s = sign(c);
            if turn == 0 {
                turn = s;
            } else if turn != s {
                return false;
            }
        }
        turn != 0
    }

    /// Whether no two non-adjacent edges touch.
    pub fn is_simple(&self) -> bool {
        let n = self.points.len();
        for i in 0..n {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                if segments_touch(&self.edge(i), &self.edge(j)) {
                    return false;
                }
            }
        }
        true
    }

    /// Whether `p` lies inside or on the boundary.
    ///
    /// Convex polygons test `p` against every edge's outward normal; others
    /// fall back to an even-odd crossing count.
    pub fn contains(&self, p: Point) -> bool {
        if self.convex {
            return (0..self.points.len())
                .all(|i| (p - self.vertex(i)).dot(self.normal(i)) <= EPSILON);
        }
        if self.edges().any(|e| e.contains_point(p)) {
            return true;
        }
        // Even-odd crossing count along +x.
        let mut inside = false;
        let n = self.points.len();
        for i in 0..n {
            let a = self.vertex(i);
            let b = self.vertex(i + 1);
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Counter-clockwise convex hull with collinear and duplicate vertices removed.
    pub fn to_convex(&self) -> Result<Self, GeometryError> {
        let mut pts = self.points.clone();
        pts.sort_by(|a, b| match a.x.total_cmp(&b.x) {
            Ordering::Equal => a.y.total_cmp(&b.y),
            o => o,
        });
        pts.dedup_by(|a, b| approx_eq_point(*a, *b));
        if pts.len() < 3 {
            return Err(GeometryError::Degenerate);
        }

        let mut hull: Vec<Point> = Vec::with_capacity(pts.len() + 1);
        // Lower chain, left to right.
        for &p in &pts {
            pop_non_left_turns(&mut hull, p, 2);
            hull.push(p);
        }
        // Upper chain, right to left.
        let lower_len = hull.len() + 1;
        for &p in pts.iter().rev().skip(1) {
            pop_non_left_turns(&mut hull, p, lower_len);
            hull.push(p);
        }
        // The last point repeats the first.
        hull.pop();

        if hull.len() < 3 {
            return Err(GeometryError::Degenerate);
        }
        let convex = Self::from_vec(hull);
        if convex.area() <= EPSILON {
            return Err(GeometryError::Degenerate);
        }
        Ok(convex)
    }

    /// Map every vertex through `affine`, keeping the winding direction.
    pub fn transformed(&self, affine: Affine) -> Self {
        let mut points: Vec<Point> = self.points.iter().map(|p| affine * *p).collect();
        if affine.determinant() < 0.0 {
            points.reverse();
        }
        Self::from_vec(points)
    }
}

fn pop_non_left_turns(hull: &mut Vec<Point>, p: Point, min_len: usize) {
    while hull.len() >= min_len {
        let a = hull[hull.len() - 2];
        let b = hull[hull.len() - 1];
        if (b - a).cross(p - a) > 0.0 {
            break;
        }
        hull.pop();
    }
}

fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    let mut twice = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        twice += p.to_vec2().cross(q.to_vec2());
    }
    twice * 0.5
}

/// Orientation-based segment test; touching endpoints and collinear overlap count.
fn segments_touch(a: &Segment, b: &Segment) -> bool {
    fn orient(p: Point, q: Point, r: Point) -> i8 {
        let c = (q - p).cross(r - p);
        if c.abs() <= EPSILON { 0 } else { sign(c) }
    }
    fn on_segment(p: Point, q: Point, r: Point) -> bool {
        r.x >= p.x.min(q.x) - EPSILON
            && r.x <= p.x.max(q.x) + EPSILON
            && r.y >= p.y.min(q.y) - EPSILON
            && r.y <= p.y.max(q.y) + EPSILON
    }
    let o1 = orient(a.p0, a.p1, b.p0);
    let o2 = orient(a.p0, a.p1, b.p1);
    let o3 = orient(b.p0, b.p1, a.p0);
    let o4 = orient(b.p0, b.p1, a.p1);
    if o1 != o2 && o3 != o4 && o1 != 0 && o2 != 0 && o3 != 0 && o4 != 0 {
        return true;
    }
    (o1 == 0 && on_segment(a.p0, a.p1, b.p0))
        || (o2 == 0 && on_segment(a.p0, a.p1, b.p1))
        || (o3 == 0 && on_segment(b.p0, b.p1, a.p0))
        || (o4 == 0 && on_segment(b.p0, b.p1, a.p1))
}
