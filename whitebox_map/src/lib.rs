// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whitebox Map: layer stack, colouring and drawing for GIS maps.
//!
//! This crate owns everything between opened data sources and drawing
//! commands:
//! - A [`MapModel`] with an ordered stack of raster, vector and point-cloud
//!   layers, an active layer, a full and a current extent, and a
//!   back/forward [`ExtentHistory`] of visited extents.
//! - [`RasterSampler`]: decimates a raster window and maps values to colours
//!   through a palette, honouring no-data, gamma and the data scale.
//! - Vector colouring by attribute ([`colour_records`]), generalization by
//!   [`is_mappable`], and conversion of records to device paths.
//! - [`MapRenderer`]: draws a model onto any
//!   [`ImagingBackend`](whitebox_imaging::ImagingBackend), bottom layer first.
//! - [`HitTester`]: device position to raster cell and status readout.
//! - [`ProjectDocument`]: a serde model of a saved map project.
//!
//! Reading files from disk is not part of this crate. Layers are built from
//! [`RasterSource`], [`VectorSource`] and [`PointCloudSource`]
//! implementations; the [`memory`] module has in-memory ones.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use whitebox_extent::BoundingBox;
//! use whitebox_imaging_ref::RefBackend;
//! use whitebox_map::memory::MemoryRaster;
//! use whitebox_map::{HitTester, MapModel, MapRenderer, PaletteLibrary, RasterLayer, RenderConfig};
//!
//! let palettes = PaletteLibrary::with_builtin();
//! let dem = MemoryRaster::from_fn("dem.dep", 10, 10, BoundingBox::new(0.0, 0.0, 10.0, 10.0), |r, c| {
//!     (r * 10 + c) as f64
//! });
//!
//! let mut map = MapModel::new("Elevation");
//! map.add_layer(RasterLayer::new(Box::new(dem), &palettes));
//!
//! let mut backend = RefBackend::default();
//! let mut renderer = MapRenderer::new(RenderConfig { border: 0.0, ..RenderConfig::default() });
//! let frame = renderer.render(&mut map, Size::new(100.0, 100.0), &mut backend).unwrap();
//! assert_eq!(frame.stats.images, 1);
//!
//! // The top-left device pixel lies in row 0, column 0.
//! let cell = HitTester::new(&map, &frame.viewport).cell_at(Point::new(1.0, 1.0));
//! assert_eq!((cell.row, cell.column), (0, 0));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cache;
mod error;
mod history;
mod hit;
mod layer;
mod marker;
pub mod memory;
mod model;
mod palette;
mod pointcloud;
mod project;
mod raster;
mod render;
mod source;
mod stats;
mod vector;

pub use cache::LayerCache;
pub use error::{MapError, Result};
pub use history::ExtentHistory;
pub use hit::{CellReadout, GridCell, HitTester, format_grouped};
pub use layer::{Layer, LayerFlags, LayerHeader, LayerId, LayerKind};
pub use marker::{GlyphOp, MarkerGlyph, MarkerStyle, MarkerTable, UnknownMarker};
pub use model::{DEFAULT_NO_DATA, MapModel};
pub use palette::{
    Argb, CATEGORICAL_PALETTE, GREY_PALETTE, Palette, PaletteLibrary, PaletteProvider,
    QUALITATIVE_PALETTE, SPECTRUM_PALETTE,
};
pub use pointcloud::{
    FillCriterion, PointCloudLayer, PointCloudStyle, auto_display_range, point_colour,
};
pub use project::{
    CommonEntry, ExtentEntry, LasEntry, LayerEntry, MapElements, MapInfo, MapLayers,
    ProjectDocument, RasterEntry, SourceResolver, VectorEntry,
};
pub use raster::{
    RasterImage, RasterLayer, RasterSampler, RasterStyle, default_raster_palette,
};
pub use render::{MapRenderer, RenderConfig, RenderStats, RenderedFrame};
pub use source::{
    AttributeValue, DataScale, FieldKind, Geometry, LasPoint, PointCloudSource, RasterSource,
    ShapeRecord, ShapeType, VectorSource,
};
pub use vector::{
    ColourData, DEFAULT_DASH_PATTERN, LegendEntry, RecordQuery, VectorFlags, VectorLayer,
    VectorStyle, colour_records, is_mappable, polygon_path, polyline_paths, ring_paths,
};
