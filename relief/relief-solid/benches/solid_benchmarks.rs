//! Benchmarks for surface sampling and extrusion.
//!
//! Run with: cargo bench -p relief-solid

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use relief_height::{HeightMapper, HeightParams};
use relief_solid::{ExtrusionParams, SolidBuilder, SurfaceGrid, extrude_solid, validate_solid};
use relief_types::{LayerStack, PixelBuffer};

fn photo_like(size: u32) -> PixelBuffer {
    PixelBuffer::from_fn(size, size, |x, y| {
        let v = u8::try_from((x ^ y) & 0xff).unwrap_or(0);
        [v, v / 2, 255 - v, 255]
    })
}

fn bench_extrude(c: &mut Criterion) {
    let mut group = c.benchmark_group("extrude_solid");
    for resolution in [100u32, 200, 400] {
        let grid = SurfaceGrid {
            cols: resolution,
            rows: resolution,
            width_mm: 100.0,
            height_mm: 100.0,
        };
        let surface = grid.build(&|u: f64, v: f64| 1.0 + (u * 12.0).sin() * (v * 9.0).cos());
        group.throughput(Throughput::Elements(grid.vertex_count() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(resolution),
            &surface,
            |b, surface| {
                b.iter(|| extrude_solid(black_box(surface), &ExtrusionParams::default()));
            },
        );
    }
    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let img = photo_like(512);
    let stack = LayerStack::default();
    let mapper = HeightMapper::new(&img, &stack, HeightParams::default());

    c.bench_function("solid_from_image_200", |b| {
        b.iter(|| {
            SolidBuilder::new(black_box(&mapper), img.width(), img.height())
                .resolution(200)
                .build()
        });
    });

    let solid = SolidBuilder::new(&mapper, img.width(), img.height())
        .resolution(200)
        .build();
    if let Ok(solid) = solid {
        c.bench_function("validate_solid_200", |b| {
            b.iter(|| validate_solid(black_box(&solid.mesh)));
        });
    }
}

criterion_group!(benches, bench_extrude, bench_pipeline);
criterion_main!(benches);
