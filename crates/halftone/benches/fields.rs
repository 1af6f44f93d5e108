mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::DVec2;
use halftone::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng as RngCore, SeedableRng};

const SAMPLES: usize = 4096;
const SIZES: [usize; 3] = [64, 256, 1024];

fn random_uvs(seed: u64) -> Vec<DVec2> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut next = || rng.next_u32() as f64 / u32::MAX as f64;
    (0..SAMPLES).map(|_| DVec2::new(next(), next())).collect()
}

fn gradient_rgb(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size * size * 3);
    for y in 0..size {
        for x in 0..size {
            data.push((x * 255 / size) as u8);
            data.push((y * 255 / size) as u8);
            data.push(((x + y) * 127 / size) as u8);
        }
    }
    data
}

fn dense_sample_benches(c: &mut Criterion) {
    let uvs = random_uvs(0xF1E1D);
    let mut group = c.benchmark_group("fields/dense/sample");
    group.throughput(common::elements_throughput(SAMPLES));

    for &size in &SIZES {
        let Ok(field) = DensePixelField::from_rgb8(size, size, &gradient_rgb(size)) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                let sum: f64 = uvs.iter().filter_map(|&uv| field.sample(uv).ok()).sum();
                black_box(sum);
            });
        });
    }

    group.finish();
}

fn dense_blur_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("fields/dense/blur");

    for &sigma in &[1.0, 3.0, 8.0] {
        let size = 256;
        let Ok(field) = DensePixelField::from_rgb8(size, size, &gradient_rgb(size)) else {
            continue;
        };
        group.throughput(common::elements_throughput(size * size));
        group.bench_with_input(BenchmarkId::from_parameter(sigma), &sigma, |b, &sigma| {
            b.iter(|| black_box(field.clone().blurred(sigma).pixel(0, 0)));
        });
    }

    group.finish();
}

fn sparse_sample_benches(c: &mut Criterion) {
    let uvs = random_uvs(0x5BA25E);
    let mut group = c.benchmark_group("fields/sparse/sample");
    group.throughput(common::elements_throughput(SAMPLES));

    for &n in &[4usize, 16, 50] {
        let data: Vec<f32> = (0..n * n).map(|i| (i % 7) as f32 / 6.0).collect();
        let Ok(field) = SparseGridField::new(n, n, data) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let sum: f64 = uvs.iter().filter_map(|&uv| field.sample(uv).ok()).sum();
                black_box(sum);
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = dense_sample_benches, dense_blur_benches, sparse_sample_benches
}
criterion_main!(benches);
