// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned rectangle helpers on top of [`kurbo::Rect`].
//!
//! Rectangles are treated in a y-up frame. Vertices and edges are numbered
//! counter-clockwise starting at the right edge:
//!
//! | index | vertex       | edge                      | outward normal |
//! |-------|--------------|---------------------------|----------------|
//! | 0     | bottom-right | bottom-right → top-right  | `+x`           |
//! | 1     | top-right    | top-right → top-left      | `+y`           |
//! | 2     | top-left     | top-left → bottom-left    | `-x`           |
//! | 3     | bottom-left  | bottom-left → bottom-right| `-y`           |
//!
//! All helpers expect a normalized rectangle (`x0 <= x1`, `y0 <= y1`); use
//! [`Rect::abs`] first when that is not guaranteed.

use kurbo::{Point, Rect, Vec2};

use crate::primitives::Segment;

/// Edge-aware queries on axis-aligned rectangles.
pub trait RectExt {
    /// Vertex `i` (taken modulo 4).
    fn vertex(&self, i: usize) -> Point;
    /// Edge `i` (taken modulo 4), from vertex `i` to vertex `i + 1`.
    fn edge(&self, i: usize) -> Segment;
    /// Outward unit normal of edge `i` (taken modulo 4).
    fn normal(&self, i: usize) -> Vec2;
    /// All four vertices in counter-clockwise order.
    fn vertices(&self) -> [Point; 4];
    /// Containment with edges counted as inside.
    fn contains_inclusive(&self, p: Point) -> bool;
    /// Overlap test where touching edges count as overlapping.
    fn touches(&self, other: &Rect) -> bool;
}

impl RectExt for Rect {
    fn vertex(&self, i: usize) -> Point {
        match i % 4 {
            0 => Point::new(self.x1, self.y0),
            1 => Point::new(self.x1, self.y1),
            2 => Point::new(self.x0, self.y1),
            _ => Point::new(self.x0, self.y0),
        }
    }

    fn edge(&self, i: usize) -> Segment {
        Segment::new(self.vertex(i), self.vertex(i + 1))
    }

    fn normal(&self, i: usize) -> Vec2 {
        match i % 4 {
            0 => Vec2::new(1.0, 0.0),
            1 => Vec2::new(0.0, 1.0),
            2 => Vec2::new(-1.0, 0.0),
            _ => Vec2::new(0.0, -1.0),
        }
    }

    fn vertices(&self) -> [Point; 4] {
        [self.vertex(0), self.vertex(1), self.vertex(2), self.vertex(3)]
    }

    fn contains_inclusive(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    fn touches(&self, other: &Rect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }
}
