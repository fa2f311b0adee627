// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

use whitebox_extent::BoundingBox;

use crate::pointcloud::PointCloudLayer;
use crate::raster::RasterLayer;
use crate::vector::VectorLayer;

/// Stable identity of a layer inside a [`MapModel`](crate::MapModel).
///
/// Overlay numbers change as layers are reordered; ids do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u64);

bitflags::bitflags! {
    /// Display flags shared by every layer kind.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct LayerFlags: u8 {
        /// Layer is drawn.
        const VISIBLE = 0b0000_0001;
        /// Layer is listed in the legend.
        const VISIBLE_IN_LEGEND = 0b0000_0010;
    }
}

impl Default for LayerFlags {
    fn default() -> Self {
        Self::VISIBLE | Self::VISIBLE_IN_LEGEND
    }
}

/// Kind of a [`Layer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Gridded data.
    Raster,
    /// Points, lines or polygons.
    Vector,
    /// LiDAR points.
    PointCloud,
}

impl LayerKind {
    /// Lowercase name, as used in messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Raster => "raster",
            Self::Vector => "vector",
            Self::PointCloud => "point cloud",
        }
    }
}

/// State every layer carries regardless of kind.
#[derive(Clone, Debug)]
pub struct LayerHeader {
    pub(crate) id: LayerId,
    pub(crate) title: String,
    pub(crate) alpha: u8,
    pub(crate) flags: LayerFlags,
    pub(crate) overlay: usize,
    pub(crate) full_extent: BoundingBox,
    pub(crate) current_extent: BoundingBox,
}

impl LayerHeader {
    pub(crate) fn new(title: String, full_extent: BoundingBox) -> Self {
        Self {
            id: LayerId(0),
            title,
            alpha: u8::MAX,
            flags: LayerFlags::default(),
            overlay: 0,
            full_extent,
            current_extent: full_extent,
        }
    }

    /// Stable id, assigned when the layer joins a map.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Opacity, 0 (transparent) to 255 (opaque).
    #[must_use]
    pub fn alpha(&self) -> u8 {
        self.alpha
    }

    /// Display flags.
    #[must_use]
    pub fn flags(&self) -> LayerFlags {
        self.flags
    }

    /// Position in the draw order; 0 is drawn first (bottom).
    #[must_use]
    pub fn overlay_number(&self) -> usize {
        self.overlay
    }

    /// Extent of the whole data source.
    #[must_use]
    pub fn full_extent(&self) -> BoundingBox {
        self.full_extent
    }

    /// Extent of the part last prepared for drawing.
    #[must_use]
    pub fn current_extent(&self) -> BoundingBox {
        self.current_extent
    }
}

/// Derives a layer title from a file reference: the file name without
/// directory or extension.
pub(crate) fn title_from_file(file: &str) -> String {
    let name = file.rsplit(['/', '\\']).next().unwrap_or(file);
    let stem = match name.rfind('.') {
        Some(0) | None => name,
        Some(i) => &name[..i],
    };
    String::from(stem)
}

/// A map layer.
///
/// The variants share the surface below; renderer and hit tester match on
/// the variant for everything else.
#[derive(Debug)]
pub enum Layer {
    /// Gridded data.
    Raster(RasterLayer),
    /// Points, lines or polygons.
    Vector(VectorLayer),
    /// LiDAR points.
    PointCloud(PointCloudLayer),
}

impl From<RasterLayer> for Layer {
    fn from(layer: RasterLayer) -> Self {
        Self::Raster(layer)
    }
}

impl From<VectorLayer> for Layer {
    fn from(layer: VectorLayer) -> Self {
        Self::Vector(layer)
    }
}

impl From<PointCloudLayer> for Layer {
    fn from(layer: PointCloudLayer) -> Self {
        Self::PointCloud(layer)
    }
}

impl Layer {
    /// Shared layer state.
    #[must_use]
    pub fn header(&self) -> &LayerHeader {
        match self {
            Self::Raster(l) => &l.header,
            Self::Vector(l) => &l.header,
            Self::PointCloud(l) => &l.header,
        }
    }

    pub(crate) fn header_mut(&mut self) -> &mut LayerHeader {
        match self {
            Self::Raster(l) => &mut l.header,
            Self::Vector(l) => &mut l.header,
            Self::PointCloud(l) => &mut l.header,
        }
    }

    /// Kind of layer.
    #[must_use]
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Raster(_) => LayerKind::Raster,
            Self::Vector(_) => LayerKind::Vector,
            Self::PointCloud(_) => LayerKind::PointCloud,
        }
    }

    /// File reference of the data source.
    #[must_use]
    pub fn file_reference(&self) -> &str {
        match self {
            Self::Raster(l) => l.source().file_reference(),
            Self::Vector(l) => l.source().file_reference(),
            Self::PointCloud(l) => l.source().file_reference(),
        }
    }

    /// Stable id.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.header().id
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.header().title
    }

    /// Replaces the display title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.header_mut().title = title.into();
        if let Self::Vector(v) = self {
            // Single-colour legends are labelled with the title.
            v.invalidate();
        }
    }

    /// Opacity, 0 to 255.
    #[must_use]
    pub fn alpha(&self) -> u8 {
        self.header().alpha
    }

    /// Sets the opacity and invalidates derived colours.
    pub fn set_alpha(&mut self, alpha: u8) {
        if self.header().alpha != alpha {
            self.header_mut().alpha = alpha;
            self.invalidate();
        }
    }

    /// Returns `true` if the layer is drawn.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.header().flags.contains(LayerFlags::VISIBLE)
    }

    /// Shows or hides the layer.
    pub fn set_visible(&mut self, visible: bool) {
        self.header_mut().flags.set(LayerFlags::VISIBLE, visible);
    }

    /// Returns `true` if the layer is listed in the legend.
    #[must_use]
    pub fn is_visible_in_legend(&self) -> bool {
        self.header().flags.contains(LayerFlags::VISIBLE_IN_LEGEND)
    }

    /// Lists or unlists the layer in the legend.
    pub fn set_visible_in_legend(&mut self, visible: bool) {
        self.header_mut()
            .flags
            .set(LayerFlags::VISIBLE_IN_LEGEND, visible);
    }

    /// Position in the draw order.
    #[must_use]
    pub fn overlay_number(&self) -> usize {
        self.header().overlay
    }

    /// Extent of the whole data source.
    #[must_use]
    pub fn full_extent(&self) -> BoundingBox {
        self.header().full_extent
    }

    /// Extent of the part last prepared for drawing.
    #[must_use]
    pub fn current_extent(&self) -> BoundingBox {
        self.header().current_extent
    }

    /// Marks all derived data stale.
    pub fn invalidate(&mut self) {
        match self {
            Self::Raster(l) => l.invalidate(),
            Self::Vector(l) => l.invalidate(),
            Self::PointCloud(l) => l.invalidate(),
        }
    }

    /// Returns the raster layer, if this is one.
    #[must_use]
    pub fn as_raster(&self) -> Option<&RasterLayer> {
        match self {
            Self::Raster(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the raster layer mutably, if this is one.
    pub fn as_raster_mut(&mut self) -> Option<&mut RasterLayer> {
        match self {
            Self::Raster(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the vector layer, if this is one.
    #[must_use]
    pub fn as_vector(&self) -> Option<&VectorLayer> {
        match self {
            Self::Vector(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the vector layer mutably, if this is one.
    pub fn as_vector_mut(&mut self) -> Option<&mut VectorLayer> {
        match self {
            Self::Vector(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the point cloud layer, if this is one.
    #[must_use]
    pub fn as_point_cloud(&self) -> Option<&PointCloudLayer> {
        match self {
            Self::PointCloud(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the point cloud layer mutably, if this is one.
    pub fn as_point_cloud_mut(&mut self) -> Option<&mut PointCloudLayer> {
        match self {
            Self::PointCloud(l) => Some(l),
            _ => None,
        }
    }
}
