// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Affine, Circle, Point, Rect};
use shapecast_geom::Ray;
use shapecast_index::{
    IndexConfig, Partition, PartitionFilter, Shape, ShapeArena, ShapeId, ShapeMask, SpatialTree,
};

const PARTITIONS: [(Partition, PartitionFilter, &str); 2] = [
    (Partition::Static, PartitionFilter::STATIC, "static"),
    (Partition::Dynamic, PartitionFilter::DYNAMIC, "dynamic"),
];

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_grid_shapes(n: usize, cell: f64) -> Vec<Shape> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            let r = Rect::new(x0, y0, x0 + cell * 0.8, y0 + cell * 0.8);
            if (x + y) % 2 == 0 {
                out.push(Shape::from_rect(r));
            } else {
                out.push(Shape::from_circle(Circle::new(r.center(), cell * 0.4)));
            }
        }
    }
    out
}

fn gen_random_shapes(count: usize, extent: f64, size: f64) -> Vec<Shape> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let x0 = rng.next_f64() * extent;
            let y0 = rng.next_f64() * extent;
            Shape::from_rect(Rect::new(x0, y0, x0 + size, y0 + size))
        })
        .collect()
}

fn populate(shapes: &[Shape], partition: Partition) -> (ShapeArena, SpatialTree, Vec<ShapeId>) {
    let mut arena = ShapeArena::new();
    let config = IndexConfig::default().with_cell_size(16.0);
    let mut tree = SpatialTree::with_config(config).unwrap();
    let mut ids = Vec::with_capacity(shapes.len());
    for s in shapes {
        let id = arena.insert(s.clone());
        match partition {
            Partition::Static => tree.add_static(&mut arena, id),
            Partition::Dynamic => tree.add_dynamic(&mut arena, id),
        }
        ids.push(id);
    }
    tree.commit(&arena);
    (arena, tree, ids)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[32usize, 64, 128] {
        let shapes = gen_grid_shapes(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        for (partition, _, name) in PARTITIONS {
            group.bench_function(format!("{name}_n{n}"), |b| {
                b.iter_batched(
                    || shapes.clone(),
                    |shapes| black_box(populate(&shapes, partition).1.static_len()),
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

fn bench_ray_cast(c: &mut Criterion) {
    let mut group = c.benchmark_group("ray_cast");
    let shapes = gen_random_shapes(4096, 2000.0, 12.0);
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    let rays: Vec<_> = (0..256)
        .map(|_| {
            let a = rng.next_f64() * core::f64::consts::TAU;
            Ray::new((1000.0, 1000.0), (a.cos(), a.sin()))
        })
        .collect();
    for (partition, filter, name) in PARTITIONS {
        let (arena, tree, _) = populate(&shapes, partition);
        group.bench_function(format!("{name}_random_256_rays"), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for ray in &rays {
                    hits += usize::from(
                        tree.ray_cast(&arena, ray, ShapeMask::all(), filter)
                            .is_some(),
                    );
                }
                black_box(hits)
            })
        });
    }
    group.finish();
}

fn bench_range_and_pick(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_pick");
    let shapes = gen_grid_shapes(128, 8.0);
    for (partition, filter, name) in PARTITIONS {
        let (arena, tree, _) = populate(&shapes, partition);
        group.bench_function(format!("{name}_range_256"), |b| {
            b.iter(|| {
                let mut total = 0usize;
                for q in 0..256 {
                    let x = (q % 64) as f64 * 8.0;
                    let y = (q / 64) as f64 * 8.0;
                    let found = tree.range_query(
                        &arena,
                        Rect::new(x, y, x + 20.0, y + 20.0),
                        ShapeMask::all(),
                        filter,
                        None,
                    );
                    total += found.len();
                }
                black_box(total)
            })
        });
        group.bench_function(format!("{name}_pick_256"), |b| {
            b.iter(|| {
                let mut total = 0usize;
                for q in 0..256 {
                    let p = Point::new((q % 128) as f64 * 8.0 + 3.0, (q / 2) as f64 * 8.0 + 3.0);
                    total += tree
                        .pick_query(&arena, p, ShapeMask::all(), filter)
                        .len();
                }
                black_box(total)
            })
        });
    }
    group.finish();
}

fn bench_intersections(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersection");
    let shapes = gen_random_shapes(2048, 1000.0, 16.0);
    for (partition, filter, name) in PARTITIONS {
        let (arena, tree, ids) = populate(&shapes, partition);
        group.bench_function(format!("{name}_every_shape"), |b| {
            b.iter(|| {
                let mut total = 0usize;
                for &id in &ids {
                    total += tree.intersection_query(&arena, id, filter).len();
                }
                black_box(total)
            })
        });
    }
    group.finish();
}

fn bench_dynamic_motion(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_motion");
    let shapes = gen_random_shapes(4096, 2000.0, 12.0);
    group.bench_function("transform_all_small_steps", |b| {
        b.iter_batched(
            || populate(&shapes, Partition::Dynamic),
            |(mut arena, mut tree, ids)| {
                for (j, id) in ids.into_iter().enumerate() {
                    let dx = (j % 5) as f64 - 2.0;
                    let dy = ((j * 7) % 5) as f64 - 2.0;
                    tree.transform(&mut arena, id, Affine::translate((dx, dy)));
                }
                black_box(tree.dynamic_bounds())
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_ray_cast,
    bench_range_and_pick,
    bench_intersections,
    bench_dynamic_motion
);
criterion_main!(benches);
