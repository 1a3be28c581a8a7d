// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line-of-sight checks against a static level.
//!
//! A handful of walls and pillars are registered as static shapes, committed
//! once, and then probed with a fan of rays from a viewer position.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p shapecast_demos --example raycast_scene`

use kurbo::{Circle, Point, Rect};
use shapecast_geom::{Polygon, Ray};
use shapecast_index::{PartitionFilter, Shape, ShapeArena, ShapeMask, SpatialTree};

const WALL: ShapeMask = ShapeMask::bit(0);
const GLASS: ShapeMask = ShapeMask::bit(1);

fn main() {
    env_logger::init();

    let mut arena = ShapeArena::new();
    let mut level = SpatialTree::new();

    let mut statics = vec![
        Shape::from_rect(Rect::new(-20.0, -20.0, 20.0, -19.0)).with_type_mask(WALL),
        Shape::from_rect(Rect::new(-20.0, 19.0, 20.0, 20.0)).with_type_mask(WALL),
        Shape::from_rect(Rect::new(-20.0, -20.0, -19.0, 20.0)).with_type_mask(WALL),
        Shape::from_rect(Rect::new(19.0, -20.0, 20.0, 20.0)).with_type_mask(WALL),
        Shape::from_rect(Rect::new(5.0, -4.0, 5.5, 4.0)).with_type_mask(GLASS),
        Shape::from_circle(Circle::new((-6.0, 6.0), 2.0)).with_type_mask(WALL),
    ];
    let ramp = Polygon::new([
        Point::new(8.0, 8.0),
        Point::new(14.0, 8.0),
        Point::new(14.0, 14.0),
    ]);
    match ramp.and_then(|p| Shape::from_polygon(&p)) {
        Ok(shape) => statics.push(shape.with_type_mask(WALL)),
        Err(err) => log::warn!("skipping ramp: {err}"),
    }
    for shape in statics {
        let id = arena.insert(shape);
        level.add_static(&mut arena, id);
    }
    level.commit(&arena);

    let eye = Point::new(0.0, 0.0);
    for step in 0..16 {
        let angle = f64::from(step) * core::f64::consts::TAU / 16.0;
        let ray = Ray::new(eye, (angle.cos(), angle.sin()));
        let solid = level.ray_cast(&arena, &ray, WALL, PartitionFilter::STATIC);
        let any = level.ray_cast(&arena, &ray, ShapeMask::all(), PartitionFilter::STATIC);
        match (solid, any) {
            (Some(s), Some(a)) if a.shape != s.shape => println!(
                "{angle:5.2} rad: sees through glass at {:.2}, blocked at {:.2}",
                a.parameter, s.parameter
            ),
            (Some(s), _) => println!("{angle:5.2} rad: blocked at {:.2}", s.parameter),
            (None, _) => println!("{angle:5.2} rad: open"),
        }
    }

    level.clear(&mut arena);
}
