// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use kurbo::{Point, Size};
use whitebox_extent::BoundingBox;
use whitebox_imaging_ref::RefBackend;
use whitebox_map::memory::{MemoryRaster, MemoryVector};
use whitebox_map::{
    AttributeValue, FieldKind, Geometry, MapModel, MapRenderer, PaletteLibrary, RasterLayer,
    RecordQuery, RenderConfig, ShapeType, VectorLayer, colour_records,
};

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

const SIDE: f64 = 10_000.0;

/// Random closed squares of mixed size with a numeric and a text column.
fn parcels(n: usize, seed: u64) -> MemoryVector {
    let mut rng = Lcg::new(seed);
    let mut v = MemoryVector::new("parcels.shp", ShapeType::Polygon);
    let mut areas = Vec::with_capacity(n);
    let mut zones = Vec::with_capacity(n);
    for i in 0..n {
        let x = rng.next_f64() * SIDE;
        let y = rng.next_f64() * SIDE;
        // Mostly small parcels so generalization has something to drop.
        let side = if i % 10 == 0 { 200.0 } else { rng.next_f64() * 20.0 };
        v.push(Geometry::from_parts(
            ShapeType::Polygon,
            [vec![
                Point::new(x, y),
                Point::new(x, y + side),
                Point::new(x + side, y + side),
                Point::new(x + side, y),
                Point::new(x, y),
            ]],
        ));
        areas.push(AttributeValue::Number(side * side));
        zones.push(AttributeValue::Text(format!("Z{}", i % 37)));
    }
    v.with_field("AREA", FieldKind::Numeric, areas)
        .with_field("ZONE", FieldKind::Text, zones)
}

fn bench_vector(c: &mut Criterion) {
    let palettes = PaletteLibrary::with_builtin();
    let mut group = c.benchmark_group("whitebox_vector");
    group.sample_size(30);

    for &n in &[1_000_usize, 10_000] {
        let layer = VectorLayer::new(Box::new(parcels(n, 0xB0B0_0000_0000_0001)), &palettes);
        let full = BoundingBox::new(0.0, 0.0, SIDE, SIDE);
        let quarter = BoundingBox::new(0.0, 0.0, SIDE / 2.0, SIDE / 2.0);

        group.bench_function(format!("query_full(n={n})"), |b| {
            b.iter(|| black_box(RecordQuery::run(layer.source(), black_box(full), 10.0)));
        });
        group.bench_function(format!("query_quarter(n={n})"), |b| {
            b.iter(|| black_box(RecordQuery::run(layer.source(), black_box(quarter), 5.0)));
        });

        for attribute in ["AREA", "ZONE"] {
            let mut style = layer.style().clone();
            style.colouring_attribute = Some(attribute.into());
            group.bench_function(format!("colour_records({attribute},n={n})"), |b| {
                b.iter(|| {
                    black_box(colour_records(
                        layer.source(),
                        &style,
                        layer.palette(),
                        "parcels",
                        255,
                    ))
                });
            });
        }
    }

    group.finish();
}

fn build_map(palettes: &PaletteLibrary) -> MapModel {
    let extent = BoundingBox::new(0.0, 0.0, SIDE, SIDE);
    let dem = MemoryRaster::from_fn("dem.dep", 1_000, 1_000, extent, |r, c| (r * c) as f64)
        .with_display_range(0.0, 1.0e6);
    let mut map = MapModel::new("bench");
    map.add_layer(RasterLayer::new(Box::new(dem), palettes));
    map.add_layer(VectorLayer::new(Box::new(parcels(5_000, 3)), palettes));
    map
}

fn bench_render(c: &mut Criterion) {
    let palettes = PaletteLibrary::with_builtin();
    let mut group = c.benchmark_group("whitebox_render");
    group.sample_size(20);

    let device = Size::new(800.0, 600.0);
    let mut renderer = MapRenderer::new(RenderConfig::default());

    group.bench_function("cached_frame", |b| {
        let mut map = build_map(&palettes);
        let mut backend = RefBackend::default();
        renderer.render(&mut map, device, &mut backend);
        b.iter(|| {
            backend.clear_events();
            black_box(renderer.render(&mut map, device, &mut backend))
        });
    });

    group.bench_function("pan_then_frame", |b| {
        b.iter_batched(
            || {
                let mut map = build_map(&palettes);
                let mut backend = RefBackend::default();
                MapRenderer::new(RenderConfig::default()).render(&mut map, device, &mut backend);
                let moved = map.current_extent().translate(SIDE / 10.0, 0.0);
                map.set_current_extent(moved);
                (map, backend)
            },
            |(mut map, mut backend)| black_box(renderer.render(&mut map, device, &mut backend)),
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_vector, bench_render);
criterion_main!(benches);
