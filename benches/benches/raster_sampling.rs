// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::Size;
use whitebox_extent::BoundingBox;
use whitebox_map::memory::MemoryRaster;
use whitebox_map::{PaletteLibrary, RasterLayer};
use whitebox_view::{GridShape, ViewportTransform};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_f64(&mut self) -> f64 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 11) as f64) / ((1_u64 << 53) as f64)
    }
}

fn noisy_dem(n: usize, seed: u64) -> MemoryRaster {
    let mut rng = Lcg::new(seed);
    let extent = BoundingBox::new(0.0, 0.0, n as f64, n as f64);
    MemoryRaster::from_fn("bench.dep", n, n, extent, |r, c| {
        (r + c) as f64 + rng.next_f64() * 10.0
    })
    .with_display_range(0.0, 2.0 * n as f64)
}

fn bench_sampling(c: &mut Criterion) {
    let palettes = PaletteLibrary::with_builtin();
    let mut group = c.benchmark_group("whitebox_raster_sampling");
    group.sample_size(30);

    for &(n, device) in &[(256_usize, 256.0), (1_024, 512.0), (2_048, 512.0)] {
        let layer = RasterLayer::new(Box::new(noisy_dem(n, 0x5EED_0000_0000_0001)), &palettes);
        let grid = GridShape::new(layer.rows(), layer.columns(), layer.header().full_extent());
        let full = layer.header().full_extent();
        let sampler = layer.sampler();

        let vp = ViewportTransform::new(Size::new(device, device), 0.0, full).unwrap();
        let window = vp.raster_window(&grid).unwrap();
        group.bench_function(format!("full_view(n={n},device={device})"), |b| {
            b.iter(|| black_box(sampler.sample(layer.source(), black_box(&window))));
        });

        // A quarter of the grid, so every device pixel maps to under one cell.
        let zoomed = BoundingBox::new(0.0, 0.0, full.width() / 4.0, full.height() / 4.0);
        let vp = ViewportTransform::new(Size::new(device, device), 0.0, zoomed).unwrap();
        let window = vp.raster_window(&grid).unwrap();
        group.bench_function(format!("zoomed_view(n={n},device={device})"), |b| {
            b.iter(|| black_box(sampler.sample(layer.source(), black_box(&window))));
        });
    }

    group.bench_function("colour_lookup(65536)", |b| {
        let layer = RasterLayer::new(Box::new(noisy_dem(16, 7)), &palettes);
        let sampler = layer.sampler();
        let mut rng = Lcg::new(42);
        let values: Vec<f64> = (0..65_536).map(|_| rng.next_f64() * 40.0).collect();
        b.iter(|| {
            let mut acc = 0_u32;
            for &v in &values {
                acc = acc.wrapping_add(sampler.colour(v).0);
            }
            black_box(acc)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_sampling);
criterion_main!(benches);
