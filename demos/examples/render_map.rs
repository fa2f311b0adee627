// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Map rendering basics.
//!
//! Build a map with a raster, two vector layers and a point cloud, draw it
//! into the recording backend, zoom, and save the map as a project document.
//!
//! Run:
//! - `cargo run -p whitebox_demos --example render_map`
//! - `cargo run -p whitebox_demos --example render_map -- -v` for debug events

use kurbo::{Point, Size};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use whitebox_extent::BoundingBox;
use whitebox_imaging::DrawOp;
use whitebox_imaging_ref::RefBackend;
use whitebox_map::memory::{MemoryPointCloud, MemoryRaster, MemoryVector};
use whitebox_map::{
    AttributeValue, FieldKind, Geometry, HitTester, LasPoint, MapModel, MapRenderer,
    PaletteLibrary, PointCloudLayer, RasterLayer, RenderConfig, ShapeType, SourceResolver,
    VectorLayer,
};

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn extent() -> BoundingBox {
    BoundingBox::new(0.0, 0.0, 1000.0, 1000.0)
}

/// A smooth hill peaking in the middle of the extent.
fn dem() -> MemoryRaster {
    MemoryRaster::from_fn("hill.dep", 200, 200, extent(), |r, c| {
        let dx = c as f64 - 100.0;
        let dy = r as f64 - 100.0;
        500.0 - (dx * dx + dy * dy).sqrt() * 3.0
    })
    .with_display_range(0.0, 500.0)
}

fn roads() -> MemoryVector {
    let mut v = MemoryVector::new("roads.shp", ShapeType::PolyLine);
    v.push(Geometry::from_parts(
        ShapeType::PolyLine,
        [vec![Point::new(0.0, 100.0), Point::new(1000.0, 900.0)]],
    ));
    v.push(Geometry::from_parts(
        ShapeType::PolyLine,
        [vec![
            Point::new(100.0, 1000.0),
            Point::new(400.0, 500.0),
            Point::new(450.0, 0.0),
        ]],
    ));
    v
}

fn lakes() -> MemoryVector {
    let square = |x: f64, y: f64, side: f64| {
        Geometry::from_parts(
            ShapeType::Polygon,
            [vec![
                Point::new(x, y),
                Point::new(x, y + side),
                Point::new(x + side, y + side),
                Point::new(x + side, y),
                Point::new(x, y),
            ]],
        )
    };
    let mut v = MemoryVector::new("lakes.shp", ShapeType::Polygon);
    v.push(square(100.0, 100.0, 150.0));
    v.push(square(700.0, 200.0, 80.0));
    v.push(square(600.0, 700.0, 0.5));
    v.with_field(
        "NAME",
        FieldKind::Text,
        vec![
            AttributeValue::Text("Long Lake".into()),
            AttributeValue::Text("Mud Pond".into()),
            AttributeValue::Null,
        ],
    )
}

fn lidar() -> MemoryPointCloud {
    let points = (0..400)
        .map(|i| {
            let x = f64::from(i % 20) * 50.0 + 25.0;
            let y = f64::from(i / 20) * 50.0 + 25.0;
            LasPoint {
                x,
                y,
                z: (x + y) / 10.0,
                intensity: (i * 7 % 255) as u16,
                classification: if i % 5 == 0 { 6 } else { 2 },
                withheld: i % 97 == 0,
                ..LasPoint::default()
            }
        })
        .collect();
    MemoryPointCloud::new("tile.las", points)
}

struct DemoFiles;

impl SourceResolver for DemoFiles {
    fn open_raster(
        &self,
        file: &str,
    ) -> whitebox_map::Result<Box<dyn whitebox_map::RasterSource>> {
        match file {
            "hill.dep" => Ok(Box::new(dem())),
            _ => Err(whitebox_map::MapError::SourceNotFound(file.into())),
        }
    }

    fn open_vector(
        &self,
        file: &str,
    ) -> whitebox_map::Result<Box<dyn whitebox_map::VectorSource>> {
        match file {
            "roads.shp" => Ok(Box::new(roads())),
            "lakes.shp" => Ok(Box::new(lakes())),
            _ => Err(whitebox_map::MapError::SourceNotFound(file.into())),
        }
    }

    fn open_point_cloud(
        &self,
        file: &str,
    ) -> whitebox_map::Result<Box<dyn whitebox_map::PointCloudSource>> {
        match file {
            "tile.las" => Ok(Box::new(lidar())),
            _ => Err(whitebox_map::MapError::SourceNotFound(file.into())),
        }
    }
}

fn summarize(backend: &RefBackend) {
    let (mut images, mut fills, mut strokes, mut rects) = (0, 0, 0, 0);
    for op in backend.draws() {
        match op {
            DrawOp::DrawImageRect { .. } => images += 1,
            DrawOp::FillPath(_) => fills += 1,
            DrawOp::StrokePath(_) => strokes += 1,
            DrawOp::FillRect(_) | DrawOp::StrokeRect(_) => rects += 1,
        }
    }
    println!("  images: {images}, filled paths: {fills}, stroked paths: {strokes}, rects: {rects}");
    println!(
        "  live resources: {} paths, {} images, {} paints",
        backend.live_paths(),
        backend.live_images(),
        backend.live_paints()
    );
}

fn main() {
    setup_logging(std::env::args().any(|a| a == "-v"));

    let palettes = PaletteLibrary::with_builtin();
    let mut map = MapModel::new("Hill country");
    map.add_layer(RasterLayer::new(Box::new(dem()), &palettes));
    map.add_layer(VectorLayer::new(Box::new(lakes()), &palettes));
    map.add_layer(VectorLayer::new(Box::new(roads()), &palettes));
    map.add_layer(PointCloudLayer::new(Box::new(lidar()), &palettes));

    if let Some(lakes) = map.layer_mut(1).and_then(|l| l.as_vector_mut()) {
        lakes.update_style(&palettes, |s| s.colouring_attribute = Some("NAME".into()));
        println!("Lake legend:");
        for entry in lakes.legend() {
            println!("  {:<12} #{:08X}", entry.label, entry.colour.0);
        }
    }

    let device = Size::new(400.0, 300.0);
    let mut renderer = MapRenderer::new(RenderConfig::default());
    let mut backend = RefBackend::default();

    let frame = renderer
        .render(&mut map, device, &mut backend)
        .expect("the map has a full extent");
    info!(?frame.stats, "first frame");
    println!("Full extent:");
    summarize(&backend);

    let hits = HitTester::new(&map, &frame.viewport);
    for device_pt in [Point::new(200.0, 150.0), Point::new(5.0, 5.0)] {
        let world = hits.world_point(device_pt);
        let cell = hits.cell_at(device_pt);
        println!(
            "  ({:.0}, {:.0}) -> world ({:.1}, {:.1}) row {} col {} value '{}'",
            device_pt.x,
            device_pt.y,
            world.x,
            world.y,
            cell.row,
            cell.column,
            cell.readout()
        );
    }

    map.zoom_in();
    map.zoom_in();
    backend.clear_events();
    let frame = renderer
        .render(&mut map, device, &mut backend)
        .expect("zooming keeps a valid extent");
    info!(?frame.stats, "zoomed frame");
    println!("Zoomed twice:");
    summarize(&backend);

    let doc = map.to_project();
    let json = serde_json::to_string_pretty(&doc).expect("project documents serialize");
    println!("Project document ({} bytes):", json.len());
    println!("{json}");

    let reloaded = MapModel::from_project(&doc, &DemoFiles, &palettes).expect("all sources exist");
    println!(
        "Reloaded '{}' with {} layers, current extent {:?}",
        reloaded.title(),
        reloaded.layer_count(),
        reloaded.current_extent()
    );
}
