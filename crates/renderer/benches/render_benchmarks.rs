//! Benchmarks for the renderer crate - painting, statistics and PNG export.
//!
//! Run with: cargo bench --package renderer --bench render_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use renderer::{aggregate, paint, PixelBuffer, ValueRange};
use sahel_common::{DataType, RasterGrid};

/// Land cover grid with random IGBP classes.
fn generate_land_cover_grid(width: usize, height: usize) -> RasterGrid {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let data = (0..width * height)
        .map(|_| rng.gen_range(0..=17) as f32)
        .collect();
    RasterGrid::new(width, height, data).unwrap()
}

/// Smooth precipitation field with a north-south gradient.
fn generate_precipitation_grid(width: usize, height: usize) -> RasterGrid {
    let mut data = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let south = y as f32 / height as f32;
            let wave = ((x as f32 / width as f32) * std::f32::consts::PI * 4.0).sin() * 40.0;
            data[y * width + x] = 100.0 + south * 700.0 + wave;
        }
    }
    RasterGrid::new(width, height, data)
        .unwrap()
        .with_declared_range(Some(0.0), Some(1000.0))
}

// =============================================================================
// PAINT BENCHMARKS
// =============================================================================

fn bench_paint(c: &mut Criterion) {
    let mut group = c.benchmark_group("paint");

    // Sahel extents at typical asset resolutions
    let sizes = [(128, 64, "small"), (512, 256, "medium"), (1024, 512, "large")];

    for (w, h, name) in sizes {
        let land = generate_land_cover_grid(w, h);
        let precip = generate_precipitation_grid(w, h);
        let range = ValueRange::for_grid(DataType::Precipitation, &precip);

        group.throughput(Throughput::Elements((w * h) as u64));

        group.bench_with_input(BenchmarkId::new("land_cover_hard", name), &land, |b, grid| {
            let mut buffer = PixelBuffer::for_grid(grid, DataType::LandCover);
            b.iter(|| paint(&mut buffer, black_box(grid), DataType::LandCover, None, false));
        });

        group.bench_with_input(BenchmarkId::new("precipitation_smooth", name), &precip, |b, grid| {
            let mut buffer = PixelBuffer::for_grid(grid, DataType::Precipitation);
            b.iter(|| paint(&mut buffer, black_box(grid), DataType::Precipitation, range, true));
        });
    }

    group.finish();
}

// =============================================================================
// STATS BENCHMARKS
// =============================================================================

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    let land = generate_land_cover_grid(1024, 512);
    let precip = generate_precipitation_grid(1024, 512);
    let range = ValueRange::for_grid(DataType::Precipitation, &precip);
    group.throughput(Throughput::Elements(land.len() as u64));

    group.bench_function("land_cover", |b| {
        b.iter(|| aggregate(black_box(&land), DataType::LandCover, None, 2015.0))
    });
    group.bench_function("precipitation", |b| {
        b.iter(|| aggregate(black_box(&precip), DataType::Precipitation, range, 2015.0))
    });

    group.finish();
}

// =============================================================================
// PNG BENCHMARKS
// =============================================================================

fn bench_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("png");

    let land = generate_land_cover_grid(512, 256);
    let mut indexed = PixelBuffer::for_grid(&land, DataType::LandCover);
    paint(&mut indexed, &land, DataType::LandCover, None, false).unwrap();

    let precip = generate_precipitation_grid(512, 256);
    let mut smooth = PixelBuffer::for_grid(&precip, DataType::PrecipitationGradient);
    paint(&mut smooth, &precip, DataType::PrecipitationGradient, None, true).unwrap();

    group.bench_function("land_cover_indexed", |b| b.iter(|| black_box(&indexed).to_png()));
    group.bench_function("precipitation_smoothed", |b| b.iter(|| black_box(&smooth).to_png()));

    group.finish();
}

criterion_group!(benches, bench_paint, bench_aggregate, bench_png);
criterion_main!(benches);
