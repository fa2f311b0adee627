// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisted map state.
//!
//! A [`ProjectDocument`] is a plain serde model of a [`MapModel`]: map title
//! and extents plus one entry per layer with every styling field. Data is
//! never embedded; layers refer to their sources by file reference and a
//! [`SourceResolver`] reopens them on load.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use whitebox_extent::BoundingBox;

use crate::layer::Layer;
use crate::marker::MarkerStyle;
use crate::model::MapModel;
use crate::palette::{Argb, PaletteProvider};
use crate::pointcloud::{FillCriterion, PointCloudLayer, PointCloudStyle};
use crate::raster::{RasterLayer, RasterStyle};
use crate::source::{DataScale, PointCloudSource, RasterSource, VectorSource};
use crate::vector::{VectorFlags, VectorLayer, VectorStyle};
use crate::{MapError, Result};

/// Opens data sources named by project entries.
///
/// Every method defaults to [`MapError::SourceNotFound`].
pub trait SourceResolver {
    /// Opens a raster.
    fn open_raster(&self, file: &str) -> Result<Box<dyn RasterSource>> {
        Err(MapError::SourceNotFound(file.into()))
    }

    /// Opens a vector file.
    fn open_vector(&self, file: &str) -> Result<Box<dyn VectorSource>> {
        Err(MapError::SourceNotFound(file.into()))
    }

    /// Opens a point cloud.
    fn open_point_cloud(&self, file: &str) -> Result<Box<dyn PointCloudSource>> {
        Err(MapError::SourceNotFound(file.into()))
    }
}

/// Root of a project document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    /// The single map of the project.
    pub map_info: MapInfo,
}

/// One map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    /// Map-wide state.
    pub map_elements: MapElements,
    /// Layers bottom to top.
    pub map_layers: MapLayers,
}

/// Map-wide state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapElements {
    /// Map title.
    pub title: String,
    /// Union of the layer extents; absent for an empty map.
    pub full_extent: Option<ExtentEntry>,
    /// Viewed extent; absent for an empty map.
    pub current_extent: Option<ExtentEntry>,
    /// Overlay number of the active layer.
    pub active_layer: Option<usize>,
}

/// Layer list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapLayers(pub Vec<LayerEntry>);

/// A world rectangle as stored in documents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtentEntry {
    /// West edge.
    pub min_x: f64,
    /// South edge.
    pub min_y: f64,
    /// East edge.
    pub max_x: f64,
    /// North edge.
    pub max_y: f64,
}

impl ExtentEntry {
    fn from_box(bb: BoundingBox) -> Option<Self> {
        (!bb.is_null()).then(|| Self {
            min_x: bb.min_x(),
            min_y: bb.min_y(),
            max_x: bb.max_x(),
            max_y: bb.max_y(),
        })
    }

    fn to_box(self) -> Result<BoundingBox> {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if !finite {
            return Err(MapError::MalformedProject(String::from(
                "extent has a non-finite edge",
            )));
        }
        Ok(BoundingBox::new(self.min_x, self.min_y, self.max_x, self.max_y))
    }
}

/// State shared by every layer entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommonEntry {
    /// Display title.
    pub title: String,
    /// Source file reference.
    pub file: String,
    /// Position in the draw order.
    pub overlay: usize,
    /// Opacity.
    pub alpha: u8,
    /// Layer is drawn.
    pub visible: bool,
    /// Layer is listed in the legend.
    pub visible_in_legend: bool,
}

impl CommonEntry {
    fn from_layer(layer: &Layer) -> Self {
        Self {
            title: String::from(layer.title()),
            file: String::from(layer.file_reference()),
            overlay: layer.overlay_number(),
            alpha: layer.alpha(),
            visible: layer.is_visible(),
            visible_in_legend: layer.is_visible_in_legend(),
        }
    }

    fn apply(&self, layer: &mut Layer) {
        layer.set_title(self.title.clone());
        layer.set_alpha(self.alpha);
        layer.set_visible(self.visible);
        layer.set_visible_in_legend(self.visible_in_legend);
    }
}

/// A raster layer entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RasterEntry {
    /// Shared state.
    pub common: CommonEntry,
    /// Colouring scale.
    pub data_scale: DataScale,
    /// Lower display bound.
    pub display_min: f64,
    /// Upper display bound.
    pub display_max: f64,
    /// Gamma exponent.
    pub nonlinearity: f64,
    /// Palette file reference.
    pub palette: String,
    /// Palette drawn back to front.
    pub palette_reversed: bool,
}

/// A vector layer entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    /// Shared state.
    pub common: CommonEntry,
    /// Line colour as `0xAARRGGBB`.
    pub line_colour: u32,
    /// Fill colour as `0xAARRGGBB`.
    pub fill_colour: u32,
    /// Line width in device pixels.
    pub line_thickness: f64,
    /// Marker size in device pixels.
    pub marker_size: f64,
    /// Marker symbol.
    pub marker: MarkerStyle,
    /// Dash and gap lengths.
    pub dash_pattern: Vec<f64>,
    /// Interiors are filled.
    pub filled: bool,
    /// Outlines are drawn.
    pub outlined: bool,
    /// Lines are dashed.
    pub dashed: bool,
    /// Fill colour is shared by all records.
    pub filled_with_one_colour: bool,
    /// Line colour is shared by all records.
    pub outlined_with_one_colour: bool,
    /// Attribute colours are stretched over the palette.
    pub palette_scaled: bool,
    /// Attribute column driving colours.
    pub colouring_attribute: Option<String>,
    /// Palette file reference.
    pub palette: String,
    /// Generalization threshold in device pixels.
    pub generalization_level: f64,
}

/// A point cloud layer entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LasEntry {
    /// Shared state.
    pub common: CommonEntry,
    /// Attribute driving point colours.
    pub fill_criterion: FillCriterion,
    /// Colour used for every point, as `0xAARRGGBB`.
    pub single_colour: Option<u32>,
    /// Lower display bound.
    pub display_min: f64,
    /// Upper display bound.
    pub display_max: f64,
    /// Palette file reference.
    pub palette: String,
    /// Point size in device pixels.
    pub marker_size: f64,
}

/// One layer of a project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layer_type", rename_all = "snake_case")]
pub enum LayerEntry {
    /// Raster layer.
    Raster(RasterEntry),
    /// Vector layer.
    Vector(VectorEntry),
    /// LiDAR layer.
    Las(LasEntry),
}

impl LayerEntry {
    /// Shared state of the entry.
    #[must_use]
    pub fn common(&self) -> &CommonEntry {
        match self {
            Self::Raster(e) => &e.common,
            Self::Vector(e) => &e.common,
            Self::Las(e) => &e.common,
        }
    }

    fn from_layer(layer: &Layer) -> Self {
        let common = CommonEntry::from_layer(layer);
        match layer {
            Layer::Raster(r) => {
                let s = r.style();
                Self::Raster(RasterEntry {
                    common,
                    data_scale: s.data_scale,
                    display_min: s.display_min,
                    display_max: s.display_max,
                    nonlinearity: s.gamma,
                    palette: s.palette.clone(),
                    palette_reversed: s.palette_reversed,
                })
            }
            Layer::Vector(v) => {
                let s = v.style();
                Self::Vector(VectorEntry {
                    common,
                    line_colour: s.line_colour.0,
                    fill_colour: s.fill_colour.0,
                    line_thickness: s.line_thickness,
                    marker_size: s.marker_size,
                    marker: s.marker,
                    dash_pattern: s.dash_pattern.to_vec(),
                    filled: s.flags.contains(VectorFlags::FILLED),
                    outlined: s.flags.contains(VectorFlags::OUTLINED),
                    dashed: s.flags.contains(VectorFlags::DASHED),
                    filled_with_one_colour: s.flags.contains(VectorFlags::FILLED_WITH_ONE_COLOUR),
                    outlined_with_one_colour: s
                        .flags
                        .contains(VectorFlags::OUTLINED_WITH_ONE_COLOUR),
                    palette_scaled: s.flags.contains(VectorFlags::PALETTE_SCALED),
                    colouring_attribute: s.colouring_attribute.clone(),
                    palette: s.palette.clone(),
                    generalization_level: s.generalization_level,
                })
            }
            Layer::PointCloud(p) => {
                let s = p.style();
                Self::Las(LasEntry {
                    common,
                    fill_criterion: s.fill_criterion,
                    single_colour: s.single_colour.map(|c| c.0),
                    display_min: s.display_min,
                    display_max: s.display_max,
                    palette: s.palette.clone(),
                    marker_size: s.marker_size,
                })
            }
        }
    }

    fn open(
        &self,
        resolver: &dyn SourceResolver,
        palettes: &dyn PaletteProvider,
    ) -> Result<Layer> {
        let file = self.common().file.as_str();
        let mut layer: Layer = match self {
            Self::Raster(e) => {
                let style = RasterStyle {
                    data_scale: e.data_scale,
                    display_min: e.display_min,
                    display_max: e.display_max,
                    gamma: e.nonlinearity,
                    palette: e.palette.clone(),
                    palette_reversed: e.palette_reversed,
                };
                RasterLayer::with_style(resolver.open_raster(file)?, style, palettes).into()
            }
            Self::Vector(e) => {
                let mut flags = VectorFlags::empty();
                flags.set(VectorFlags::FILLED, e.filled);
                flags.set(VectorFlags::OUTLINED, e.outlined);
                flags.set(VectorFlags::DASHED, e.dashed);
                flags.set(VectorFlags::FILLED_WITH_ONE_COLOUR, e.filled_with_one_colour);
                flags.set(VectorFlags::OUTLINED_WITH_ONE_COLOUR, e.outlined_with_one_colour);
                flags.set(VectorFlags::PALETTE_SCALED, e.palette_scaled);
                let style = VectorStyle {
                    flags,
                    line_colour: Argb(e.line_colour),
                    fill_colour: Argb(e.fill_colour),
                    line_thickness: e.line_thickness,
                    marker_size: e.marker_size,
                    marker: e.marker,
                    dash_pattern: SmallVec::from_slice(&e.dash_pattern),
                    colouring_attribute: e.colouring_attribute.clone(),
                    palette: e.palette.clone(),
                    generalization_level: e.generalization_level,
                };
                VectorLayer::with_style(resolver.open_vector(file)?, style, palettes).into()
            }
            Self::Las(e) => {
                let style = PointCloudStyle {
                    fill_criterion: e.fill_criterion,
                    single_colour: e.single_colour.map(Argb),
                    display_min: e.display_min,
                    display_max: e.display_max,
                    palette: e.palette.clone(),
                    marker_size: e.marker_size,
                };
                PointCloudLayer::with_style(resolver.open_point_cloud(file)?, style, palettes)
                    .into()
            }
        };
        self.common().apply(&mut layer);
        Ok(layer)
    }
}

impl MapModel {
    /// Captures the map as a project document.
    #[must_use]
    pub fn to_project(&self) -> ProjectDocument {
        ProjectDocument {
            map_info: MapInfo {
                map_elements: MapElements {
                    title: String::from(self.title()),
                    full_extent: ExtentEntry::from_box(self.full_extent()),
                    current_extent: ExtentEntry::from_box(self.current_extent()),
                    active_layer: self.active_overlay(),
                },
                map_layers: MapLayers(self.layers().map(LayerEntry::from_layer).collect()),
            },
        }
    }

    /// Builds a map from a project document.
    ///
    /// Every source is opened before the map is assembled; any failure
    /// returns the error and no map.
    pub fn from_project(
        doc: &ProjectDocument,
        resolver: &dyn SourceResolver,
        palettes: &dyn PaletteProvider,
    ) -> Result<Self> {
        let elements = &doc.map_info.map_elements;
        let mut entries: Vec<&LayerEntry> = doc.map_info.map_layers.0.iter().collect();
        entries.sort_by_key(|e| e.common().overlay);
        if entries
            .iter()
            .enumerate()
            .any(|(i, e)| e.common().overlay != i)
        {
            return Err(MapError::MalformedProject(String::from(
                "overlay numbers are not contiguous from zero",
            )));
        }
        if elements.active_layer.is_some_and(|a| a >= entries.len()) {
            return Err(MapError::MalformedProject(String::from(
                "active layer does not exist",
            )));
        }
        let full = elements
            .full_extent
            .map(ExtentEntry::to_box)
            .transpose()?
            .unwrap_or(BoundingBox::NULL);
        let current = elements
            .current_extent
            .map(ExtentEntry::to_box)
            .transpose()?
            .unwrap_or(BoundingBox::NULL);

        let layers = entries
            .iter()
            .map(|e| e.open(resolver, palettes))
            .collect::<Result<Vec<_>>>()?;

        let mut model = Self::new(elements.title.clone());
        model.restore(layers, elements.active_layer, full, current);
        tracing::debug!(
            title = model.title(),
            layers = model.layer_count(),
            "project loaded"
        );
        model.mark_clean();
        Ok(model)
    }

    /// Replaces this map with the one described by `doc`.
    ///
    /// On error the map is left untouched.
    pub fn load_project(
        &mut self,
        doc: &ProjectDocument,
        resolver: &dyn SourceResolver,
        palettes: &dyn PaletteProvider,
    ) -> Result<()> {
        *self = Self::from_project(doc, resolver, palettes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRaster;
    use crate::palette::PaletteLibrary;

    struct Rasters;

    impl SourceResolver for Rasters {
        fn open_raster(&self, file: &str) -> Result<Box<dyn RasterSource>> {
            if file.starts_with("missing") {
                return Err(MapError::SourceNotFound(file.into()));
            }
            Ok(Box::new(MemoryRaster::new(
                file,
                4,
                4,
                BoundingBox::new(0.0, 0.0, 4.0, 4.0),
                1.0,
            )))
        }
    }

    fn model() -> MapModel {
        let lib = PaletteLibrary::with_builtin();
        let mut m = MapModel::new("Hydrology");
        for f in ["dem.dep", "slope.dep"] {
            m.add_layer(RasterLayer::new(Rasters.open_raster(f).unwrap(), &lib));
        }
        m
    }

    #[test]
    fn document_captures_layers_in_order() {
        let mut m = model();
        m.layer_mut(0).unwrap().set_alpha(90);
        let doc = m.to_project();
        assert_eq!(doc.map_info.map_elements.title, "Hydrology");
        assert_eq!(doc.map_info.map_elements.active_layer, Some(1));
        let files: Vec<_> = doc.map_info.map_layers.0.iter().map(|e| e.common().file.as_str()).collect();
        assert_eq!(files, ["dem.dep", "slope.dep"]);
        assert_eq!(doc.map_info.map_layers.0[0].common().alpha, 90);
    }

    #[test]
    fn missing_source_fails_without_touching_the_map() {
        let lib = PaletteLibrary::with_builtin();
        let mut doc = model().to_project();
        if let LayerEntry::Raster(e) = &mut doc.map_info.map_layers.0[1] {
            e.common.file = String::from("missing.dep");
        }
        let mut target = MapModel::new("keep me");
        let err = target.load_project(&doc, &Rasters, &lib).unwrap_err();
        assert!(matches!(err, MapError::SourceNotFound(f) if f == "missing.dep"));
        assert_eq!(target.title(), "keep me");
        assert!(target.is_empty());
    }

    #[test]
    fn gaps_in_overlays_are_rejected() {
        let lib = PaletteLibrary::with_builtin();
        let mut doc = model().to_project();
        if let LayerEntry::Raster(e) = &mut doc.map_info.map_layers.0[1] {
            e.common.overlay = 5;
        }
        assert!(matches!(
            MapModel::from_project(&doc, &Rasters, &lib),
            Err(MapError::MalformedProject(_))
        ));
    }

    #[test]
    fn default_resolver_finds_nothing() {
        struct Nothing;
        impl SourceResolver for Nothing {}
        assert!(matches!(
            Nothing.open_vector("roads.shp"),
            Err(MapError::SourceNotFound(_))
        ));
    }
}
