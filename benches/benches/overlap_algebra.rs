// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Circle, Point, Rect};
use shapecast_geom::{Geometry, Polygon, Ray, RayIntersect, overlap};

fn hexagon(cx: f64, cy: f64, r: f64) -> Polygon {
    let pts = (0..6).map(|i| {
        let a = f64::from(i) * core::f64::consts::FRAC_PI_3;
        Point::new(cx + r * a.cos(), cy + r * a.sin())
    });
    Polygon::new(pts).unwrap()
}

fn bench_overlap_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlap");
    let shapes = [
        Geometry::from(Rect::new(0.0, 0.0, 2.0, 2.0)),
        Geometry::from(Circle::new((1.5, 1.5), 1.0)),
        Geometry::from(hexagon(2.0, 1.0, 1.2)),
    ];
    for a in &shapes {
        for b in &shapes {
            let name = format!("{}_{}", kind(a), kind(b));
            group.bench_function(name, |bench| bench.iter(|| black_box(overlap(a, b))));
        }
    }
    group.finish();
}

fn bench_ray_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("ray_hit");
    let ray = Ray::new((-5.0, 0.3), (1.0, 0.1));
    let shapes = [
        Geometry::from(Rect::new(0.0, 0.0, 2.0, 2.0)),
        Geometry::from(Circle::new((1.0, 1.0), 1.0)),
        Geometry::from(hexagon(1.0, 1.0, 1.2)),
    ];
    for s in &shapes {
        group.bench_function(kind(s), |b| b.iter(|| black_box(s.ray_intersection(&ray))));
    }
    group.finish();
}

fn kind(g: &Geometry) -> &'static str {
    match g {
        Geometry::Circle(_) => "circle",
        Geometry::Rect(_) => "rect",
        Geometry::Polygon(_) => "polygon",
    }
}

criterion_group!(benches, bench_overlap_pairs, bench_ray_hits);
criterion_main!(benches);
