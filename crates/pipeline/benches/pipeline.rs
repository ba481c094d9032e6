//! Benchmarks for the hot pipeline stages

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lakescan_core::{Band, BandCode, BandStack, GeoTransform, Raster};
use lakescan_pipeline::indices::{compute_index, IndexKind};
use lakescan_pipeline::threshold::{threshold_mask, Polarity};
use lakescan_pipeline::vectorize::{vectorize_mask, VectorizeParams};

fn synthetic_stack(size: usize) -> BandStack {
    let transform = GeoTransform::new(0.0, size as f64 * 60.0, 60.0, -60.0);

    let mut green: Raster<f64> = Raster::new(size, size);
    let mut nir: Raster<f64> = Raster::new(size, size);
    green.set_transform(transform);
    nir.set_transform(transform);

    for row in 0..size {
        for col in 0..size {
            // A few water patches on a land background
            let water = (row / 16 + col / 16) % 3 == 0;
            green.set(row, col, if water { 0.6 } else { 0.1 }).unwrap();
            nir.set(row, col, if water { 0.1 } else { 0.5 }).unwrap();
        }
    }

    BandStack::new(vec![
        Band::new(BandCode::B03, green),
        Band::new(BandCode::B8A, nir),
    ])
    .unwrap()
}

fn bench_ndwi(c: &mut Criterion) {
    let mut group = c.benchmark_group("ndwi");
    for size in [128, 256] {
        let stack = synthetic_stack(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &stack, |b, stack| {
            b.iter(|| compute_index(black_box(stack), IndexKind::Ndwi));
        });
    }
    group.finish();
}

fn bench_vectorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("vectorize");
    for size in [128, 256] {
        let stack = synthetic_stack(size);
        let index = compute_index(&stack, IndexKind::Ndwi).unwrap();
        let mask = threshold_mask(index.grid(), 0.2, Polarity::Above);
        group.bench_with_input(BenchmarkId::from_parameter(size), &mask, |b, mask| {
            b.iter(|| vectorize_mask(black_box(mask), &VectorizeParams::default()));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ndwi, bench_vectorize);
criterion_main!(benches);
