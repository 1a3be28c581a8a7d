// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tour of range, pick and intersection queries across both partitions.
//!
//! Run:
//! - `cargo run -p shapecast_demos --example query_tour`

use kurbo::{Circle, Point, Rect};
use shapecast_index::{
    PartitionFilter, RangeQueryResult, Shape, ShapeArena, ShapeMask, SpatialTree,
};

fn main() {
    env_logger::init();

    let mut arena = ShapeArena::new();
    let mut tree = SpatialTree::new();

    for (i, (x, y)) in [(1.5, 1.5), (-1.5, 1.5), (-1.5, -1.5), (1.5, -1.5)]
        .into_iter()
        .enumerate()
    {
        let id = arena.insert(Shape::from_rect(Rect::from_center_size((x, y), (1.0, 1.0))));
        if i % 2 == 0 {
            tree.add_static(&mut arena, id);
        } else {
            tree.add_dynamic(&mut arena, id);
        }
    }
    let probe = arena.insert(Shape::from_circle(Circle::new((1.0, 1.0), 0.8)));
    tree.add_dynamic(&mut arena, probe);
    println!("before commit: {tree:?}");
    tree.commit(&arena);
    println!("after commit:  {tree:?}");

    // One buffer, reused across queries.
    let mut found = RangeQueryResult::new();
    tree.range_query_into(
        &arena,
        Rect::from_center_size((1.0, 1.0), (2.0, 6.0)),
        ShapeMask::all(),
        PartitionFilter::ALL,
        Some(probe),
        &mut found,
    );
    println!("range: {:?}", found.iter().collect::<Vec<_>>());

    found.clear();
    tree.pick_query_into(
        &arena,
        Point::new(-1.5, -1.5),
        ShapeMask::all(),
        PartitionFilter::ALL,
        &mut found,
    );
    println!("pick: {:?}", found.iter().collect::<Vec<_>>());

    for c in &tree.intersection_query(&arena, probe, PartitionFilter::ALL) {
        println!(
            "contact with {:?}: normal {:?}, depth {:.3}",
            c.shape_b, c.normal, c.penetration
        );
    }

    tree.clear(&mut arena);
}
