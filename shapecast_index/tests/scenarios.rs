// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end query scenarios, run against each partition.

use approx::assert_relative_eq;
use kurbo::{Affine, Circle, Point, Rect};
use shapecast_geom::Ray;
use shapecast_index::{
    MAX_RESULTS, Partition, PartitionFilter, Shape, ShapeArena, ShapeId, ShapeMask, SpatialTree,
};

const PARTITIONS: [Partition; 2] = [Partition::Static, Partition::Dynamic];

fn unit_square(cx: f64, cy: f64) -> Shape {
    Shape::from_rect(Rect::from_center_size((cx, cy), (1.0, 1.0)))
}

fn register(tree: &mut SpatialTree, arena: &mut ShapeArena, id: ShapeId, partition: Partition) {
    match partition {
        Partition::Static => tree.add_static(arena, id),
        Partition::Dynamic => tree.add_dynamic(arena, id),
    }
}

/// Unit squares centred at (±1.5, ±1.5), in quadrant order.
fn four_squares(partition: Partition) -> (ShapeArena, SpatialTree, [ShapeId; 4]) {
    let mut arena = ShapeArena::new();
    let mut tree = SpatialTree::new();
    let ids = [(1.5, 1.5), (-1.5, 1.5), (-1.5, -1.5), (1.5, -1.5)]
        .map(|(x, y)| arena.insert(unit_square(x, y)));
    for id in ids {
        register(&mut tree, &mut arena, id, partition);
    }
    tree.commit(&arena);
    (arena, tree, ids)
}

fn sorted(ids: impl IntoIterator<Item = ShapeId>) -> Vec<ShapeId> {
    let mut v: Vec<_> = ids.into_iter().collect();
    v.sort();
    v
}

fn cast(tree: &SpatialTree, arena: &ShapeArena, dir: (f64, f64)) -> Option<(ShapeId, Point)> {
    tree.ray_cast(
        arena,
        &Ray::new((0.0, 0.0), dir),
        ShapeMask::all(),
        PartitionFilter::ALL,
    )
    .map(|h| (h.shape, h.point))
}

#[test]
fn rays_from_the_origin_hit_diagonal_squares() {
    for partition in PARTITIONS {
        let (arena, tree, [ne, _, sw, _]) = four_squares(partition);

        let (shape, point) = cast(&tree, &arena, (1.0, 1.0)).unwrap();
        assert_eq!(shape, ne, "{partition:?}");
        assert_relative_eq!(point.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(point.y, 1.0, epsilon = 1e-9);

        let (shape, point) = cast(&tree, &arena, (-1.0, -1.0)).unwrap();
        assert_eq!(shape, sw, "{partition:?}");
        assert_relative_eq!(point.x, -1.0, epsilon = 1e-9);
        assert_relative_eq!(point.y, -1.0, epsilon = 1e-9);

        assert!(cast(&tree, &arena, (0.0, 1.0)).is_none(), "{partition:?}");
    }
}

#[test]
fn partition_filter_hides_the_other_half() {
    let (arena, tree, _) = four_squares(Partition::Static);
    let ray = Ray::new((0.0, 0.0), (1.0, 1.0));
    assert!(
        tree.ray_cast(&arena, &ray, ShapeMask::all(), PartitionFilter::DYNAMIC)
            .is_none()
    );
    assert!(
        tree.ray_cast(&arena, &ray, ShapeMask::all(), PartitionFilter::STATIC)
            .is_some()
    );
}

#[test]
fn range_query_includes_boundary_touches_only_on_the_right() {
    for partition in PARTITIONS {
        let (arena, tree, [ne, _, _, se]) = four_squares(partition);
        let found = tree.range_query(
            &arena,
            Rect::from_center_size((1.0, 1.0), (2.0, 6.0)),
            ShapeMask::all(),
            PartitionFilter::ALL,
            None,
        );
        assert_eq!(sorted(found.iter().copied()), sorted([ne, se]), "{partition:?}");
        assert!(!found.truncated());

        let excluded = tree.range_query(
            &arena,
            Rect::from_center_size((1.0, 1.0), (2.0, 6.0)),
            ShapeMask::all(),
            PartitionFilter::ALL,
            Some(ne),
        );
        assert_eq!(excluded.iter().copied().collect::<Vec<_>>(), vec![se]);
    }
}

#[test]
fn pick_finds_the_square_under_the_point() {
    for partition in PARTITIONS {
        let (arena, tree, [_, nw, _, _]) = four_squares(partition);
        let pick = |x: f64, y: f64| {
            tree.pick_query(
                &arena,
                Point::new(x, y),
                ShapeMask::all(),
                PartitionFilter::ALL,
            )
        };
        assert_eq!(pick(-1.5, 1.2).iter().copied().collect::<Vec<_>>(), vec![nw]);
        // Edges count as inside.
        assert!(pick(-1.0, 2.0).contains(&nw));
        assert!(pick(0.0, 0.0).is_empty());
    }
}

#[test]
fn transformed_shape_matches_direct_registration() {
    let mut moved_arena = ShapeArena::new();
    let mut moved = SpatialTree::new();
    let a = moved_arena.insert(unit_square(0.0, 0.0));
    moved.add_dynamic(&mut moved_arena, a);
    moved.transform(&mut moved_arena, a, Affine::translate((6.0, 6.0)));
    moved.transform(&mut moved_arena, a, Affine::translate((-6.0, 0.0)));

    let mut direct_arena = ShapeArena::new();
    let mut direct = SpatialTree::new();
    let b = direct_arena.insert(unit_square(0.0, 6.0));
    direct.add_dynamic(&mut direct_arena, b);

    assert_eq!(
        moved_arena.get(a).unwrap().bounding_box(),
        direct_arena.get(b).unwrap().bounding_box()
    );
    assert_eq!(moved.dynamic_bounds(), direct.dynamic_bounds());

    let up = Ray::new((0.0, 0.0), (0.0, 1.0));
    let hit_moved = moved
        .ray_cast(&moved_arena, &up, ShapeMask::all(), PartitionFilter::ALL)
        .unwrap();
    let hit_direct = direct
        .ray_cast(&direct_arena, &up, ShapeMask::all(), PartitionFilter::ALL)
        .unwrap();
    assert_eq!(hit_moved.point, hit_direct.point);
    assert_relative_eq!(hit_moved.parameter, 5.5, epsilon = 1e-9);

    for rect in [
        Rect::new(-1.0, -1.0, 1.0, 1.0),
        Rect::new(5.0, 5.0, 7.0, 7.0),
        Rect::new(-0.5, 6.5, 0.5, 7.5),
    ] {
        let m = moved.range_query(&moved_arena, rect, ShapeMask::all(), PartitionFilter::ALL, None);
        let d = direct.range_query(&direct_arena, rect, ShapeMask::all(), PartitionFilter::ALL, None);
        assert_eq!(m.len(), d.len(), "{rect:?}");
    }
}

#[test]
fn capacity_stops_at_twelve() {
    for partition in PARTITIONS {
        let mut arena = ShapeArena::new();
        let mut tree = SpatialTree::new();
        let ids: Vec<_> = (0..14_u32)
            .map(|i| {
                let c = Circle::new((f64::from(i) * 0.1, 0.0), 1.0);
                arena.insert(Shape::from_circle(c))
            })
            .collect();
        for &id in &ids[..MAX_RESULTS] {
            register(&mut tree, &mut arena, id, partition);
        }
        tree.commit(&arena);
        let region = Rect::new(-0.5, -0.5, 0.5, 0.5);

        let full = tree.range_query(&arena, region, ShapeMask::all(), PartitionFilter::ALL, None);
        assert_eq!(full.len(), MAX_RESULTS);
        assert!(!full.truncated(), "{partition:?}");

        register(&mut tree, &mut arena, ids[12], partition);
        tree.commit(&arena);
        let over = tree.range_query(&arena, region, ShapeMask::all(), PartitionFilter::ALL, None);
        assert_eq!(over.len(), MAX_RESULTS);
        assert!(over.truncated(), "{partition:?}");

        // Twelve other shapes overlap the first one.
        let contacts = tree.intersection_query(&arena, ids[0], PartitionFilter::ALL);
        assert_eq!(contacts.len(), MAX_RESULTS);
        assert!(!contacts.truncated());
        assert!(contacts.iter().all(|c| c.shape_a == ids[0] && c.shape_b != ids[0]));

        register(&mut tree, &mut arena, ids[13], partition);
        tree.commit(&arena);
        let contacts = tree.intersection_query(&arena, ids[0], PartitionFilter::ALL);
        assert_eq!(contacts.len(), MAX_RESULTS);
        assert!(contacts.truncated(), "{partition:?}");
    }
}

#[test]
fn dynamic_results_come_before_static() {
    let mut arena = ShapeArena::new();
    let mut tree = SpatialTree::new();
    let s = arena.insert(unit_square(0.0, 0.0));
    let d = arena.insert(unit_square(0.2, 0.0));
    tree.add_static(&mut arena, s);
    tree.add_dynamic(&mut arena, d);
    tree.commit(&arena);
    let found = tree.range_query(
        &arena,
        Rect::new(-1.0, -1.0, 1.0, 1.0),
        ShapeMask::all(),
        PartitionFilter::ALL,
        None,
    );
    assert_eq!(found.iter().copied().collect::<Vec<_>>(), vec![d, s]);
}

#[test]
fn remove_then_readd_restores_results() {
    for partition in PARTITIONS {
        let (mut arena, mut tree, ids) = four_squares(partition);
        let region = Rect::new(-3.0, -3.0, 3.0, 0.0);
        let before = sorted(
            tree.range_query(&arena, region, ShapeMask::all(), PartitionFilter::ALL, None)
                .iter()
                .copied(),
        );
        let ray_before = cast(&tree, &arena, (-1.0, -1.0));

        for id in ids {
            tree.remove(&mut arena, id);
        }
        tree.commit(&arena);
        assert!(cast(&tree, &arena, (-1.0, -1.0)).is_none());
        for id in ids {
            register(&mut tree, &mut arena, id, partition);
        }
        tree.commit(&arena);

        let after = sorted(
            tree.range_query(&arena, region, ShapeMask::all(), PartitionFilter::ALL, None)
                .iter()
                .copied(),
        );
        assert_eq!(before, after, "{partition:?}");
        assert_eq!(ray_before, cast(&tree, &arena, (-1.0, -1.0)));
    }
}

#[test]
fn polygons_take_part_in_every_query() {
    let mut arena = ShapeArena::new();
    let mut tree = SpatialTree::new();
    let tri = shapecast_geom::Polygon::new([
        Point::new(0.0, 0.0),
        Point::new(4.0, 0.0),
        Point::new(0.0, 4.0),
    ])
    .unwrap();
    let p = arena.insert(Shape::from_polygon(&tri).unwrap());
    let probe = arena.insert(Shape::from_circle(Circle::new((2.5, 2.5), 1.0)));
    tree.add_static(&mut arena, p);
    tree.add_dynamic(&mut arena, probe);
    tree.commit(&arena);

    let hit = tree
        .ray_cast(
            &arena,
            &Ray::new((-2.0, 1.0), (1.0, 0.0)),
            ShapeMask::all(),
            PartitionFilter::STATIC,
        )
        .unwrap();
    assert_eq!(hit.shape, p);
    assert_relative_eq!(hit.point.x, 0.0, epsilon = 1e-9);
    assert_relative_eq!(hit.point.y, 1.0, epsilon = 1e-9);

    // Inside the bounds but beyond the hypotenuse.
    let miss = tree.pick_query(&arena, Point::new(3.0, 3.0), ShapeMask::all(), PartitionFilter::STATIC);
    assert!(miss.is_empty());

    let contacts = tree.intersection_query(&arena, probe, PartitionFilter::ALL);
    assert_eq!(contacts.len(), 1);
    let c = contacts.get(0).unwrap();
    assert_relative_eq!(c.normal.x, core::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-9);
    assert_relative_eq!(c.normal.y, core::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-9);
    assert_relative_eq!(c.penetration, 1.0 - core::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-9);
}

#[test]
fn polygon_vertex_rays_agree_across_partitions() {
    for partition in PARTITIONS {
        let mut arena = ShapeArena::new();
        let mut tree = SpatialTree::new();
        let tri = shapecast_geom::Polygon::new([
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.3),
            Point::new(0.4, 1.0),
        ])
        .unwrap();
        let t = arena.insert(Shape::from_polygon(&tri).unwrap());
        let far = arena.insert(Shape::from_rect(Rect::new(5.0, 5.0, 6.0, 6.0)));
        for id in [t, far] {
            register(&mut tree, &mut arena, id, partition);
        }
        tree.commit(&arena);

        // Straight up through the acute vertex at the origin, outside the triangle.
        let graze = Ray::new((0.0, -1.0), (0.0, 1.0));
        let hit = tree.ray_cast(&arena, &graze, ShapeMask::all(), PartitionFilter::ALL);
        assert!(hit.is_none(), "{partition:?}: {hit:?}");

        let into = Ray::new((-1.0, -1.0), (1.0, 1.0));
        let hit = tree
            .ray_cast(&arena, &into, ShapeMask::all(), PartitionFilter::ALL)
            .unwrap();
        assert_eq!(hit.shape, t, "{partition:?}");
        assert_eq!(hit.point, Point::ZERO, "{partition:?}");
    }
}
