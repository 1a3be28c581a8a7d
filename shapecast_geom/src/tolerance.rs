// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Floating-point tolerance helpers shared by the intersection code.

use kurbo::{Point, Vec2};

/// Absolute (and relative) tolerance used for snapping and parallelism tests.
pub const EPSILON: f64 = 1e-9;

/// Whether `a` and `b` are equal within [`EPSILON`], absolutely or relative to `b`.
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    let d = (b - a).abs();
    d <= EPSILON || d <= EPSILON * b.abs()
}

/// Component-wise [`approx_eq`] for points.
#[inline]
pub fn approx_eq_point(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

/// Sign of `v` as -1, 0 or 1.
#[inline]
pub(crate) fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Normalize `v`, keeping the zero vector as zero.
#[inline]
pub(crate) fn normalized(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > 0.0 { v / len } else { Vec2::ZERO }
}
