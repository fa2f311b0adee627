// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for drawing maps with `MapRenderer` into the reference backend.

use kurbo::{Point, Size};
use whitebox_extent::BoundingBox;
use whitebox_imaging::DrawOp;
use whitebox_imaging_ref::RefBackend;
use whitebox_map::memory::{MemoryPointCloud, MemoryRaster, MemoryVector};
use whitebox_map::{
    Geometry, HitTester, LasPoint, MapModel, MapRenderer, PaletteLibrary, PointCloudLayer,
    RasterLayer, RenderConfig, ShapeType, VectorLayer,
};

fn no_border() -> MapRenderer {
    MapRenderer::new(RenderConfig {
        border: 0.0,
        draw_neatline: false,
        ..RenderConfig::default()
    })
}

fn image_sizes(backend: &RefBackend) -> Vec<(u32, u32)> {
    backend
        .draws()
        .filter_map(|d| match d {
            DrawOp::DrawImageRect { image, .. } => backend.image(*image),
            _ => None,
        })
        .map(|(desc, _)| (desc.width, desc.height))
        .collect()
}

#[test]
fn large_raster_is_decimated_to_device_pixels() {
    let palettes = PaletteLibrary::with_builtin();
    let full = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
    let source = MemoryRaster::from_fn("big.dep", 100, 100, full, |r, c| (r + c) as f64);
    let mut m = MapModel::new("big");
    m.add_layer(RasterLayer::new(Box::new(source), &palettes));

    let mut backend = RefBackend::default();
    let frame = no_border()
        .render(&mut m, Size::new(50.0, 50.0), &mut backend)
        .unwrap();

    assert_eq!(frame.stats.images, 1);
    assert_eq!(image_sizes(&backend), vec![(50, 50)]);
    let layer = m.layer(0).unwrap().as_raster().unwrap();
    assert!(layer.image().unwrap().window().resolution_factor >= 2);
}

#[test]
fn image_bytes_are_rgba() {
    let palettes = PaletteLibrary::with_builtin();
    let full = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
    let source = MemoryRaster::new("flat.dep", 2, 2, full, 5.0);
    let mut m = MapModel::new("flat");
    m.add_layer(RasterLayer::new(Box::new(source), &palettes));

    let mut backend = RefBackend::default();
    no_border().render(&mut m, Size::new(20.0, 20.0), &mut backend);
    let bytes = backend
        .draws()
        .find_map(|d| match d {
            DrawOp::DrawImageRect { image, .. } => backend.image(*image),
            _ => None,
        })
        .map(|(_, bytes)| bytes.to_vec())
        .unwrap();
    assert_eq!(bytes.len(), 2 * 2 * 4);
    assert!(bytes.chunks(4).all(|px| px[3] == 255));
}

#[test]
fn hit_test_matches_the_drawn_frame() {
    let palettes = PaletteLibrary::with_builtin();
    let full = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    let source = MemoryRaster::from_fn("grid.dep", 10, 10, full, |r, c| (r * 10 + c) as f64);
    let mut m = MapModel::new("grid");
    m.add_layer(RasterLayer::new(Box::new(source), &palettes));

    let mut backend = RefBackend::default();
    let frame = no_border()
        .render(&mut m, Size::new(100.0, 100.0), &mut backend)
        .unwrap();
    let hits = HitTester::new(&m, &frame.viewport);

    let world = hits.world_point(Point::new(0.0, 100.0));
    assert!(world.x.abs() < 1e-9 && world.y.abs() < 1e-9);

    let cell = hits.cell_at(Point::new(55.0, 25.0));
    assert_eq!((cell.row, cell.column), (2, 5));
    assert_eq!(cell.z, 25.0);
    assert_eq!(hits.readout_at(Point::new(55.0, 25.0)).to_string(), "25");
}

#[test]
fn tiny_polygons_are_generalized_away() {
    let palettes = PaletteLibrary::with_builtin();
    let mut source = MemoryVector::new("parcels.shp", ShapeType::Polygon);
    let square = |x0: f64, y0: f64, side: f64| {
        Geometry::from_parts(
            ShapeType::Polygon,
            [vec![
                Point::new(x0, y0),
                Point::new(x0, y0 + side),
                Point::new(x0 + side, y0 + side),
                Point::new(x0 + side, y0),
                Point::new(x0, y0),
            ]],
        )
    };
    source.push(square(0.0, 0.0, 1000.0));
    source.push(square(100.0, 100.0, 1.0));
    source.push(square(500.0, 500.0, 200.0));
    let mut m = MapModel::new("parcels");
    m.add_layer(VectorLayer::new(Box::new(source), &palettes));

    let mut backend = RefBackend::default();
    let frame = no_border()
        .render(&mut m, Size::new(100.0, 100.0), &mut backend)
        .unwrap();

    // 10 world units per pixel; half a pixel is 5 units.
    assert_eq!(frame.stats.records, 2);
    let layer = m.layer(0).unwrap().as_vector().unwrap();
    assert_eq!(layer.last_query().unwrap().records(), &[0, 2]);
}

#[test]
fn off_screen_points_are_not_drawn() {
    let palettes = PaletteLibrary::with_builtin();
    let points = (0..10)
        .map(|i| LasPoint {
            x: f64::from(i),
            y: f64::from(i),
            z: f64::from(i),
            ..LasPoint::default()
        })
        .collect();
    let mut m = MapModel::new("lidar");
    m.add_layer(PointCloudLayer::new(
        Box::new(MemoryPointCloud::new("tile.las", points)),
        &palettes,
    ));
    m.set_current_extent(BoundingBox::new(0.0, 0.0, 4.5, 4.5));

    let mut backend = RefBackend::default();
    let frame = no_border()
        .render(&mut m, Size::new(90.0, 90.0), &mut backend)
        .unwrap();
    assert_eq!(frame.stats.points, 5);
}

#[test]
fn layers_draw_bottom_up_inside_a_clip() {
    let palettes = PaletteLibrary::with_builtin();
    let full = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
    let mut roads = MemoryVector::new("roads.shp", ShapeType::PolyLine);
    roads.push(Geometry::from_parts(
        ShapeType::PolyLine,
        [vec![Point::new(0.0, 0.0), Point::new(4.0, 4.0)]],
    ));
    let mut m = MapModel::new("stack");
    m.add_layer(RasterLayer::new(
        Box::new(MemoryRaster::new("dem.dep", 4, 4, full, 1.0)),
        &palettes,
    ));
    m.add_layer(VectorLayer::new(Box::new(roads), &palettes));

    let mut backend = RefBackend::default();
    MapRenderer::default().render(&mut m, Size::new(80.0, 80.0), &mut backend);

    let draws: Vec<&DrawOp> = backend.draws().collect();
    assert!(matches!(draws[0], DrawOp::FillRect(_)));
    assert!(matches!(draws[1], DrawOp::DrawImageRect { .. }));
    assert!(matches!(draws[2], DrawOp::StrokePath(_)));
    assert!(matches!(draws.last(), Some(DrawOp::StrokeRect(_))));
}
