//! Benchmarks for mesh construction, comparison and warping.

use std::collections::BTreeMap;

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::Point2;
use nucleomesh::prelude::*;

fn circle_outline(cx: f64, cy: f64, r: f64, n: usize) -> Vec<Point2<f64>> {
    (0..n)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / n as f64;
            Point2::new(cx + r * t.sin(), cy + r * t.cos())
        })
        .collect()
}

fn ellipse_outline(cx: f64, cy: f64, a: f64, b: f64, n: usize) -> Vec<Point2<f64>> {
    (0..n)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / n as f64;
            Point2::new(cx + a * t.sin(), cy + b * t.cos())
        })
        .collect()
}

fn landmarks() -> BTreeMap<LandmarkId, usize> {
    let mut l = BTreeMap::new();
    l.insert(LandmarkId::Reference, 0);
    l.insert(LandmarkId::Orientation, 200);
    l
}

fn bench_build(c: &mut Criterion) {
    let outline = circle_outline(100.0, 100.0, 80.0, 400);
    let landmarks = landmarks();

    for factor in [2, 4, 8] {
        c.bench_function(&format!("build_density_{}", factor), |b| {
            let density = MeshDensity::new(factor);
            b.iter(|| Mesh::build(&outline, &landmarks, density).unwrap());
        });
    }
}

fn bench_compare(c: &mut Criterion) {
    let landmarks = landmarks();
    let density = MeshDensity::new(4);
    let circle = Mesh::build(&circle_outline(100.0, 100.0, 80.0, 400), &landmarks, density)
        .unwrap();
    let ellipse = Mesh::build(
        &ellipse_outline(100.0, 120.0, 80.0, 110.0, 400),
        &landmarks,
        density,
    )
    .unwrap();

    c.bench_function("compare_density_4", |b| {
        b.iter(|| ellipse.compare(&circle).unwrap());
    });
}

fn bench_warp(c: &mut Criterion) {
    let landmarks = landmarks();
    let density = MeshDensity::new(4);
    let circle = Mesh::build(&circle_outline(100.0, 100.0, 80.0, 400), &landmarks, density)
        .unwrap();
    let ellipse = Mesh::build(
        &ellipse_outline(100.0, 120.0, 80.0, 110.0, 400),
        &landmarks,
        density,
    )
    .unwrap();

    let mut signal = Raster::new(256, 256);
    for y in 0..256 {
        for x in 0..256 {
            signal.set(x, y, (x as f32 * 0.5 + y as f32 * 0.25).sin().abs());
        }
    }
    let binding = RasterBinding::new(&circle, &signal).unwrap();

    c.bench_function("warp_parallel", |b| {
        b.iter(|| binding.warp(&ellipse).unwrap());
    });

    c.bench_function("warp_sequential", |b| {
        let options = WarpOptions::default().sequential();
        b.iter(|| binding.warp_with_options(&ellipse, &options).unwrap());
    });
}

criterion_group!(benches, bench_build, bench_compare, bench_warp);
criterion_main!(benches);
