// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Broad- and narrow-phase collision for bodies moving over a static floor.
//!
//! Each frame moves the dynamic bodies, asks the index for contacts, and
//! pushes every body out along the contact normal.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p shapecast_demos --example moving_bodies`

use kurbo::{Affine, Circle, Rect, Vec2};
use shapecast_index::{
    IndexConfig, PartitionFilter, Shape, ShapeArena, ShapeId, ShapeMask, SpatialTree,
};

const TERRAIN: ShapeMask = ShapeMask::bit(0);
const BODY: ShapeMask = ShapeMask::bit(1);

fn main() {
    env_logger::init();

    let mut arena = ShapeArena::new();
    let config = IndexConfig::default().with_cell_size(2.0);
    let mut world = match SpatialTree::with_config(config) {
        Ok(world) => world,
        Err(err) => {
            log::error!("bad index config: {err}");
            return;
        }
    };

    let floor = arena.insert(
        Shape::from_rect(Rect::new(-10.0, -1.0, 10.0, 0.0))
            .with_type_mask(TERRAIN)
            .with_collision_mask(ShapeMask::empty()),
    );
    world.add_static(&mut arena, floor);
    world.commit(&arena);

    let bodies: Vec<ShapeId> = (0..5)
        .map(|i| {
            let x = f64::from(i) * 1.5 - 3.0;
            let y = 3.0 + f64::from(i);
            let shape = Shape::from_circle(Circle::new((x, y), 0.5))
                .with_type_mask(BODY)
                .with_collision_mask(TERRAIN | BODY);
            let id = arena.insert(shape);
            world.add_dynamic(&mut arena, id);
            id
        })
        .collect();

    let gravity = Vec2::new(0.0, -0.4);
    for frame in 0..20 {
        let mut resting = 0;
        for &body in &bodies {
            world.transform(&mut arena, body, Affine::translate(gravity));
            let contacts = world.intersection_query(&arena, body, PartitionFilter::ALL);
            let mut push = Vec2::ZERO;
            for c in &contacts {
                push += c.normal * c.penetration;
            }
            if push != Vec2::ZERO {
                world.transform(&mut arena, body, Affine::translate(push));
                resting += 1;
            }
            if contacts.truncated() {
                log::warn!("{body:?} has more contacts than fit in one query");
            }
        }
        println!(
            "frame {frame:2}: {resting} bodies in contact, dynamic bounds {:?}",
            world.dynamic_bounds()
        );
    }

    world.clear(&mut arena);
    for body in bodies {
        let _ = arena.remove(body);
    }
}
