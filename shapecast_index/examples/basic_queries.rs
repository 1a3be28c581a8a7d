// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Shapecast Index: register, commit, move and query.

use kurbo::{Affine, Circle, Point, Rect};
use shapecast_geom::Ray;
use shapecast_index::{PartitionFilter, Shape, ShapeArena, ShapeMask, SpatialTree};

fn main() {
    let mut arena = ShapeArena::new();
    let mut tree = SpatialTree::new();

    let wall = arena.insert(Shape::from_rect(Rect::new(4.0, -2.0, 5.0, 2.0)));
    let ball = arena.insert(Shape::from_circle(Circle::new((0.0, 0.0), 0.5)));
    tree.add_static(&mut arena, wall);
    tree.add_dynamic(&mut arena, ball);
    tree.commit(&arena);

    // Roll the ball into the wall
    tree.transform(&mut arena, ball, Affine::translate((4.2, 0.0)));
    let contacts = tree.intersection_query(&arena, ball, PartitionFilter::ALL);
    for c in &contacts {
        println!("contact {:?} -> {:?}: {:?}", c.shape_a, c.shape_b, c);
    }

    // Cast a ray and pick a point
    let ray = Ray::new((-10.0, 0.0), (1.0, 0.0));
    let hit = tree.ray_cast(&arena, &ray, ShapeMask::all(), PartitionFilter::ALL);
    println!("ray hit: {hit:?}");
    let picked = tree.pick_query(
        &arena,
        Point::new(4.5, 1.5),
        ShapeMask::all(),
        PartitionFilter::ALL,
    );
    println!("picked at (4.5,1.5): {:?}", picked.iter().collect::<Vec<_>>());

    tree.clear(&mut arena);
}
