// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Separating-axis overlap tests.
//!
//! Each test returns a [`Manifold`] when the two shapes overlap, including
//! when they merely touch (penetration `0`). The normal is a unit vector that
//! points from the second shape towards the first: translating the first shape
//! by `normal * penetration` separates the pair.
//!
//! Swapping the operands yields the same penetration with the normal negated.
//!
//! Polygon operands must be convex. Use [`Polygon::to_convex`] for arbitrary
//! input.

use kurbo::{Circle, Point, Rect, Vec2};

use crate::polygon::Polygon;
use crate::rect::RectExt;
use crate::tolerance::{EPSILON, approx_eq, normalized};

/// Minimum translation that separates two overlapping shapes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Manifold {
    /// Unit direction to move the first shape, pointing away from the second.
    pub normal: Vec2,
    /// Overlap depth along `normal`; `0` for shapes that only touch.
    pub penetration: f64,
}

impl Manifold {
    /// The same contact seen from the other shape.
    #[must_use]
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }

    /// Translation that separates the first shape from the second.
    pub fn separation(&self) -> Vec2 {
        self.normal * self.penetration
    }
}

#[derive(Copy, Clone)]
enum Convex<'a> {
    Hull { vertices: &'a [Point], center: Point },
    Round(Circle),
}

impl Convex<'_> {
    fn center(&self) -> Point {
        match self {
            Self::Hull { center, .. } => *center,
            Self::Round(c) => c.center,
        }
    }

    fn project(&self, axis: Vec2) -> (f64, f64) {
        match self {
            Self::Hull { vertices, .. } => vertices.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), v| {
                    let d = v.to_vec2().dot(axis);
                    (lo.min(d), hi.max(d))
                },
            ),
            Self::Round(c) => {
                let d = c.center.to_vec2().dot(axis);
                (d - c.radius, d + c.radius)
            }
        }
    }
}

/// Flip `axis` into the half-plane `x > 0` (or `x == 0, y > 0`).
fn canonical(axis: Vec2) -> Vec2 {
    if axis.x < 0.0 || (axis.x == 0.0 && axis.y < 0.0) {
        -axis
    } else {
        axis
    }
}

struct AxisSearch {
    offset: Vec2,
    best: Option<(Vec2, Manifold)>,
}

impl AxisSearch {
    fn new(a: &Convex<'_>, b: &Convex<'_>) -> Self {
        Self {
            offset: a.center() - b.center(),
            best: None,
        }
    }

    /// Returns `false` once a separating axis is found.
    fn test(&mut self, axis: Vec2, a: &Convex<'_>, b: &Convex<'_>) -> bool {
        let axis = normalized(axis);
        if axis == Vec2::ZERO {
            return true;
        }
        let axis = canonical(axis);
        let (a_min, a_max) = a.project(axis);
        let (b_min, b_max) = b.project(axis);
        let push_pos = b_max - a_min;
        let push_neg = a_max - b_min;
        if push_pos < 0.0 || push_neg < 0.0 {
            return false;
        }
        let candidate = if push_pos < push_neg {
            Manifold {
                normal: axis,
                penetration: push_pos,
            }
        } else if push_neg < push_pos {
            Manifold {
                normal: -axis,
                penetration: push_neg,
            }
        } else {
            let normal = if self.offset.dot(axis) >= 0.0 {
                axis
            } else {
                -axis
            };
            Manifold {
                normal,
                penetration: push_pos,
            }
        };
        let better = match &self.best {
            None => true,
            Some((best_axis, best)) => {
                if approx_eq(candidate.penetration, best.penetration) {
                    prefer_axis(axis, *best_axis)
                } else {
                    candidate.penetration < best.penetration
                }
            }
        };
        if better {
            self.best = Some((axis, candidate));
        }
        true
    }

    fn finish(self) -> Option<Manifold> {
        self.best.map(|(_, m)| m)
    }
}

/// Deterministic tie-break between equally shallow axes: larger `x`, then larger `y`.
fn prefer_axis(candidate: Vec2, current: Vec2) -> bool {
    if (candidate.x - current.x).abs() > EPSILON {
        candidate.x > current.x
    } else {
        candidate.y > current.y + EPSILON
    }
}

fn face_axes(vertices: &[Point]) -> impl Iterator<Item = Vec2> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| {
        let e = vertices[(i + 1) % n] - vertices[i];
        Vec2::new(e.y, -e.x)
    })
}

fn sat(a: Convex<'_>, b: Convex<'_>) -> Option<Manifold> {
    let mut search = AxisSearch::new(&a, &b);
    let mut axes: Vec<Vec2> = Vec::new();
    match (a, b) {
        (Convex::Hull { vertices: va, .. }, Convex::Hull { vertices: vb, .. }) => {
            axes.extend(face_axes(va));
            axes.extend(face_axes(vb));
        }
        (Convex::Hull { vertices, .. }, Convex::Round(c))
        | (Convex::Round(c), Convex::Hull { vertices, .. }) => {
            axes.extend(face_axes(vertices));
            axes.extend(vertices.iter().map(|v| *v - c.center));
        }
        (Convex::Round(ca), Convex::Round(cb)) => {
            let d = ca.center - cb.center;
            axes.push(if d.hypot2() > 0.0 { d } else { Vec2::new(0.0, 1.0) });
        }
    }
    for axis in axes {
        if !search.test(axis, &a, &b) {
            return None;
        }
    }
    search.finish()
}

fn rect_hull(rect: &Rect, corners: &mut [Point; 4]) -> Point {
    let r = rect.abs();
    *corners = r.vertices();
    r.center()
}

fn assert_convex(polygon: &Polygon) {
    assert!(
        polygon.is_convex(),
        "overlap tests require a convex, simple polygon"
    );
}

/// Overlap of two rectangles.
pub fn overlap_rect_rect(a: &Rect, b: &Rect) -> Option<Manifold> {
    let (mut ca, mut cb) = ([Point::ZERO; 4], [Point::ZERO; 4]);
    let center_a = rect_hull(a, &mut ca);
    let center_b = rect_hull(b, &mut cb);
    sat(
        Convex::Hull {
            vertices: &ca,
            center: center_a,
        },
        Convex::Hull {
            vertices: &cb,
            center: center_b,
        },
    )
}

/// Overlap of a rectangle with a circle.
pub fn overlap_rect_circle(rect: &Rect, circle: &Circle) -> Option<Manifold> {
    let mut corners = [Point::ZERO; 4];
    let center = rect_hull(rect, &mut corners);
    sat(
        Convex::Hull {
            vertices: &corners,
            center,
        },
        Convex::Round(*circle),
    )
}

/// Overlap of two circles.
pub fn overlap_circle_circle(a: &Circle, b: &Circle) -> Option<Manifold> {
    sat(Convex::Round(*a), Convex::Round(*b))
}

/// Overlap of two convex polygons.
///
/// # Panics
///
/// Panics if either polygon is not convex and simple.
pub fn overlap_polygon_polygon(a: &Polygon, b: &Polygon) -> Option<Manifold> {
    assert_convex(a);
    assert_convex(b);
    sat(
        Convex::Hull {
            vertices: a.points(),
            center: a.centroid(),
        },
        Convex::Hull {
            vertices: b.points(),
            center: b.centroid(),
        },
    )
}

/// Overlap of a convex polygon with a rectangle.
///
/// # Panics
///
/// Panics if the polygon is not convex and simple.
pub fn overlap_polygon_rect(polygon: &Polygon, rect: &Rect) -> Option<Manifold> {
    assert_convex(polygon);
    let mut corners = [Point::ZERO; 4];
    let center = rect_hull(rect, &mut corners);
    sat(
        Convex::Hull {
            vertices: polygon.points(),
            center: polygon.centroid(),
        },
        Convex::Hull {
            vertices: &corners,
            center,
        },
    )
}

/// Overlap of a convex polygon with a circle.
///
/// # Panics
///
/// Panics if the polygon is not convex and simple.
pub fn overlap_polygon_circle(polygon: &Polygon, circle: &Circle) -> Option<Manifold> {
    assert_convex(polygon);
    sat(
        Convex::Hull {
            vertices: polygon.points(),
            center: polygon.centroid(),
        },
        Convex::Round(*circle),
    )
}
