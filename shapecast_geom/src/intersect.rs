// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ray and line intersection tests.
//!
//! Every ray test returns the nearest hit point with a non-negative ray
//! parameter, or `None`. Hits within [`EPSILON`](crate::EPSILON) of the ray
//! origin or of a segment endpoint snap exactly onto that point.
//!
//! A ray that only grazes a rectangle or polygon vertex, or runs along one of
//! its edges, does not hit it. A ray starting inside a shape hits the boundary
//! where it exits.

use core::f64::consts::TAU;

use kurbo::{Circle, Point, Rect, Vec2};

use crate::polygon::{Orientation, Polygon};
use crate::primitives::{Line, Ray, Segment};
use crate::rect::RectExt;
use crate::tolerance::{EPSILON, approx_eq, approx_eq_point};

/// Shapes that can be hit by a [`Ray`].
pub trait RayIntersect {
    /// Nearest point where `ray` meets `self`, if any.
    fn ray_intersection(&self, ray: &Ray) -> Option<Point>;
}

/// Solve `p + t·r = q + u·s`, returning `(t, u)`; `None` when parallel.
fn solve(p: Point, r: Vec2, q: Point, s: Vec2) -> Option<(f64, f64)> {
    let denom = r.cross(s);
    if approx_eq(denom, 0.0) {
        return None;
    }
    let d = p - q;
    Some((s.cross(d) / denom, r.cross(d) / denom))
}

/// Snap values within tolerance of zero onto zero.
#[inline]
fn snap_zero(v: f64) -> f64 {
    if approx_eq(v, 0.0) { 0.0 } else { v }
}

/// Intersection of two rays.
pub fn ray_ray(a: &Ray, b: &Ray) -> Option<Point> {
    let (t, u) = solve(a.origin(), a.direction(), b.origin(), b.direction())?;
    let (t, u) = (snap_zero(t), snap_zero(u));
    if t < 0.0 || u < 0.0 {
        return None;
    }
    Some(a.at(t))
}

/// Intersection of a ray with an infinite line.
pub fn ray_line(ray: &Ray, line: &Line) -> Option<Point> {
    let (t, _) = solve(ray.origin(), ray.direction(), line.p0, line.direction())?;
    let t = snap_zero(t);
    if t < 0.0 {
        return None;
    }
    Some(ray.at(t))
}

/// Intersection of two infinite lines.
pub fn line_line(a: &Line, b: &Line) -> Option<Point> {
    let dir = a.direction();
    let (t, _) = solve(a.p0, dir, b.p0, b.direction())?;
    Some(a.p0 + dir * t)
}

/// Intersection of a ray with a segment.
pub fn ray_segment(ray: &Ray, segment: &Segment) -> Option<Point> {
    let len = segment.length();
    let (t, u) = solve(ray.origin(), ray.direction(), segment.p0, segment.direction())?;
    let hit = ray.at(t);
    if approx_eq_point(hit, ray.origin()) {
        return on_segment(ray.origin(), segment).then_some(ray.origin());
    }
    if t < 0.0 {
        return None;
    }
    if approx_eq_point(hit, segment.p0) {
        return Some(segment.p0);
    }
    if approx_eq_point(hit, segment.p1) {
        return Some(segment.p1);
    }
    if u < 0.0 || u > len {
        return None;
    }
    Some(hit)
}

fn on_segment(p: Point, segment: &Segment) -> bool {
    let u = (p - segment.p0).dot(segment.direction());
    approx_eq_point(p, segment.p0)
        || approx_eq_point(p, segment.p1)
        || (u >= 0.0 && u <= segment.length())
}

/// Intersection of two segments.
pub fn segment_segment(a: &Segment, b: &Segment) -> Option<Point> {
    let (t, u) = solve(a.p0, a.direction(), b.p0, b.direction())?;
    let (t, u) = (snap_zero(t), snap_zero(u));
    let inside = |v: f64, len: f64| v >= 0.0 && (v <= len || approx_eq(v, len));
    if !inside(t, a.length()) || !inside(u, b.length()) {
        return None;
    }
    Some(a.p0 + a.direction() * t)
}

/// Whether `dir` points strictly into the interior angle at vertex `v`.
///
/// `prev`, `v` and `next` are consecutive vertices in counter-clockwise order,
/// so the interior is swept counter-clockwise from `next - v` to `prev - v`.
/// Directions along either incident edge are excluded, which covers convex
/// and reflex vertices alike.
fn enters_at_vertex(dir: Vec2, prev: Point, v: Point, next: Point) -> bool {
    let a = next - v;
    let sweep = |x: Vec2| {
        let t = a.cross(x).atan2(a.dot(x));
        if t < 0.0 { t + TAU } else { t }
    };
    let t = sweep(dir);
    t > EPSILON && t < sweep(prev - v) - EPSILON
}

/// Nearest boundary hit of a closed polygonal outline.
///
/// `edge(i)` runs from vertex `i` to vertex `i + 1`; `ccw` gives the winding.
fn ray_outline(
    ray: &Ray,
    edge_count: usize,
    edge: impl Fn(usize) -> Segment,
    ccw: bool,
    origin_inside: bool,
) -> Option<Point> {
    if ray.is_degenerate() {
        return None;
    }
    let dir = ray.direction();
    let enters = |prev: Point, v: Point, next: Point| {
        if ccw {
            enters_at_vertex(dir, prev, v, next)
        } else {
            enters_at_vertex(dir, next, v, prev)
        }
    };
    let mut best: Option<(f64, Point)> = None;
    for i in 0..edge_count {
        let e = edge(i);
        let Some(hit) = ray_segment(ray, &e) else {
            continue;
        };
        if !origin_inside {
            // A vertex hit counts only if the ray goes on into the interior.
            if hit == e.p0 && !enters(edge(i + edge_count - 1).p0, e.p0, e.p1) {
                continue;
            }
            if hit == e.p1 && !enters(e.p0, e.p1, edge(i + 1).p1) {
                continue;
            }
        }
        let t = ray.parameter_of(hit);
        if best.is_none_or(|(bt, _)| t < bt) {
            best = Some((t, hit));
        }
    }
    best.map(|(_, p)| p)
}

/// Nearest intersection of a ray with a rectangle's boundary.
pub fn ray_rect(ray: &Ray, rect: &Rect) -> Option<Point> {
    let rect = rect.abs();
    ray_outline(
        ray,
        4,
        |i| rect.edge(i),
        true,
        rect.contains_inclusive(ray.origin()),
    )
}

/// Nearest intersection of a ray with a polygon's boundary.
pub fn ray_polygon(ray: &Ray, polygon: &Polygon) -> Option<Point> {
    ray_outline(
        ray,
        polygon.vertex_count(),
        |i| polygon.edge(i),
        polygon.orientation() != Orientation::Clockwise,
        polygon.contains(ray.origin()),
    )
}

/// Nearest intersection of a ray with a circle.
pub fn ray_circle(ray: &Ray, circle: &Circle) -> Option<Point> {
    if ray.is_degenerate() {
        return None;
    }
    let dir = ray.direction();
    let f = ray.origin() - circle.center;
    let b = 2.0 * f.dot(dir);
    let c = f.hypot2() - circle.radius * circle.radius;
    // `dir` is a unit vector, so the quadratic coefficient is 1.
    let disc = b * b - 4.0 * c;
    if disc <= 0.0 {
        return None;
    }
    let root = disc.sqrt();
    let t0 = (-b - root) * 0.5;
    let t1 = (-b + root) * 0.5;
    let t = if t0 >= 0.0 {
        t0
    } else if t1 >= 0.0 {
        t1
    } else {
        return None;
    };
    Some(ray.at(t))
}

impl RayIntersect for Ray {
    fn ray_intersection(&self, ray: &Ray) -> Option<Point> {
        ray_ray(ray, self)
    }
}

impl RayIntersect for Line {
    fn ray_intersection(&self, ray: &Ray) -> Option<Point> {
        ray_line(ray, self)
    }
}

impl RayIntersect for Segment {
    fn ray_intersection(&self, ray: &Ray) -> Option<Point> {
        ray_segment(ray, self)
    }
}

impl RayIntersect for Rect {
    fn ray_intersection(&self, ray: &Ray) -> Option<Point> {
        ray_rect(ray, self)
    }
}

impl RayIntersect for Circle {
    fn ray_intersection(&self, ray: &Ray) -> Option<Point> {
        ray_circle(ray, self)
    }
}

impl RayIntersect for Polygon {
    fn ray_intersection(&self, ray: &Ray) -> Option<Point> {
        ray_polygon(ray, self)
    }
}
