// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;
use whitebox_extent::BoundingBox;

use crate::hit::GridCell;
use crate::history::ExtentHistory;
use crate::layer::{Layer, LayerId, LayerKind};
use crate::raster::RasterLayer;
use crate::source::DataScale;
use crate::stats::truncate_signed;
use crate::{MapError, Result};

/// No-data value reported when the active layer is not a raster.
pub const DEFAULT_NO_DATA: f64 = -32768.0;

/// Fraction of the extent range moved by one zoom or pan step.
const STEP: f64 = 0.1;

/// The layers of one map, their draw order and the viewed extent.
///
/// Layers are stored bottom to top; a layer's overlay number is its index,
/// so overlay numbers always form `0..N`. The active layer is tracked by
/// [`LayerId`] and survives reordering.
#[derive(Debug)]
pub struct MapModel {
    title: String,
    layers: Vec<Layer>,
    active: Option<LayerId>,
    next_id: u64,
    full_extent: BoundingBox,
    current_extent: BoundingBox,
    history: ExtentHistory,
    revision: u64,
    clean_revision: u64,
}

impl Default for MapModel {
    fn default() -> Self {
        Self::new("")
    }
}

impl MapModel {
    /// Creates an empty map.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            layers: Vec::new(),
            active: None,
            next_id: 1,
            full_extent: BoundingBox::NULL,
            current_extent: BoundingBox::NULL,
            history: ExtentHistory::new(),
            revision: 0,
            clean_revision: 0,
        }
    }

    /// Map title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replaces the map title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    /// Number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the map has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers bottom to top.
    pub fn layers(&self) -> impl DoubleEndedIterator<Item = &Layer> + ExactSizeIterator {
        self.layers.iter()
    }

    /// Layers bottom to top, mutably.
    pub fn layers_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut Layer> + ExactSizeIterator {
        self.layers.iter_mut()
    }

    /// Layer with overlay number `overlay`.
    #[must_use]
    pub fn layer(&self, overlay: usize) -> Option<&Layer> {
        self.layers.get(overlay)
    }

    /// Layer with overlay number `overlay`, mutably.
    pub fn layer_mut(&mut self, overlay: usize) -> Option<&mut Layer> {
        self.layers.get_mut(overlay)
    }

    /// Overlay number of the layer with `id`.
    #[must_use]
    pub fn find_layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == id)
    }

    fn layer_or_err(&mut self, overlay: usize) -> Result<&mut Layer> {
        self.layers
            .get_mut(overlay)
            .ok_or(MapError::UnknownLayer(overlay))
    }

    /// Adds a layer on top, makes it active and shows the full extent.
    pub fn add_layer(&mut self, layer: impl Into<Layer>) -> LayerId {
        let mut layer = layer.into();
        let id = LayerId(self.next_id);
        self.next_id += 1;
        {
            let header = layer.header_mut();
            header.id = id;
            header.overlay = self.layers.len();
        }
        tracing::debug!(
            title = layer.title(),
            kind = layer.kind().name(),
            overlay = self.layers.len(),
            "layer added"
        );
        self.layers.push(layer);
        self.active = Some(id);
        self.show_full_extent();
        id
    }

    /// Removes the layer with overlay number `overlay` and returns it.
    ///
    /// If it was active, the layer below it becomes active, or the one above
    /// when it was the bottom layer.
    pub fn remove_layer(&mut self, overlay: usize) -> Result<Layer> {
        if overlay >= self.layers.len() {
            return Err(MapError::UnknownLayer(overlay));
        }
        let layer = self.layers.remove(overlay);
        if self.active == Some(layer.id()) {
            let next = if overlay > 0 { overlay - 1 } else { 0 };
            self.active = self.layers.get(next).map(Layer::id);
        }
        self.renumber();
        tracing::debug!(title = layer.title(), overlay, "layer removed");
        self.show_full_extent();
        Ok(layer)
    }

    fn renumber(&mut self) {
        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.header_mut().overlay = i;
        }
        self.touch();
    }

    fn move_layer(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.layers.len() {
            return Err(MapError::UnknownLayer(from));
        }
        if from != to {
            let layer = self.layers.remove(from);
            self.layers.insert(to, layer);
            self.renumber();
        }
        Ok(())
    }

    /// Swaps a layer with the one above it. No-op for the top layer.
    pub fn promote_layer(&mut self, overlay: usize) -> Result<()> {
        let top = self.layers.len().saturating_sub(1);
        self.move_layer(overlay, (overlay + 1).min(top))
    }

    /// Swaps a layer with the one below it. No-op for the bottom layer.
    pub fn demote_layer(&mut self, overlay: usize) -> Result<()> {
        self.move_layer(overlay, overlay.saturating_sub(1))
    }

    /// Moves a layer to the top of the draw order.
    pub fn promote_layer_to_top(&mut self, overlay: usize) -> Result<()> {
        let top = self.layers.len().saturating_sub(1);
        self.move_layer(overlay, top)
    }

    /// Moves a layer to the bottom of the draw order.
    pub fn demote_layer_to_bottom(&mut self, overlay: usize) -> Result<()> {
        self.move_layer(overlay, 0)
    }

    /// Makes the layer with overlay number `overlay` active.
    pub fn set_active_layer(&mut self, overlay: usize) -> Result<()> {
        let id = self.layer_or_err(overlay)?.id();
        self.active = Some(id);
        self.touch();
        Ok(())
    }

    /// Overlay number of the active layer.
    #[must_use]
    pub fn active_overlay(&self) -> Option<usize> {
        self.find_layer_index(self.active?)
    }

    /// The active layer.
    #[must_use]
    pub fn active_layer(&self) -> Option<&Layer> {
        self.layers.get(self.active_overlay()?)
    }

    /// The active layer, mutably.
    pub fn active_layer_mut(&mut self) -> Option<&mut Layer> {
        let overlay = self.active_overlay()?;
        self.layers.get_mut(overlay)
    }

    /// No-data value of the active raster, or [`DEFAULT_NO_DATA`].
    #[must_use]
    pub fn active_layer_no_data_value(&self) -> f64 {
        self.active_layer()
            .and_then(Layer::as_raster)
            .map_or(DEFAULT_NO_DATA, RasterLayer::no_data)
    }

    /// Shows or hides a layer and returns its new visibility.
    pub fn toggle_layer_visibility(&mut self, overlay: usize) -> Result<bool> {
        let layer = self.layer_or_err(overlay)?;
        let visible = !layer.is_visible();
        layer.set_visible(visible);
        self.touch();
        Ok(visible)
    }

    /// Flips the palette direction of a raster layer.
    pub fn reverse_palette_of_layer(&mut self, overlay: usize) -> Result<()> {
        self.raster_mut(overlay)?.reverse_palette();
        self.touch();
        Ok(())
    }

    /// Writes one cell of a raster layer and marks its image stale.
    pub fn set_cell_value(&mut self, overlay: usize, row: isize, column: isize, z: f64) -> Result<()> {
        let out_of_range = MapError::CellOutOfRange { row, column };
        let (Ok(r), Ok(c)) = (usize::try_from(row), usize::try_from(column)) else {
            return Err(out_of_range);
        };
        let raster = self.raster_mut(overlay)?;
        if r >= raster.rows() || c >= raster.columns() {
            return Err(out_of_range);
        }
        raster.set_value(r, c, z)?;
        tracing::debug!(overlay, row, column, z, "cell edited");
        self.touch();
        Ok(())
    }

    fn raster_mut(&mut self, overlay: usize) -> Result<&mut RasterLayer> {
        match self.layer_or_err(overlay)? {
            Layer::Raster(r) => Ok(r),
            _ => Err(MapError::UnsupportedLayerType {
                overlay,
                expected: LayerKind::Raster.name(),
            }),
        }
    }

    /// Union of every layer's full extent. Null when there are no layers.
    pub fn calculate_full_extent(&mut self) -> BoundingBox {
        self.full_extent = self
            .layers
            .iter()
            .fold(BoundingBox::NULL, |acc, l| acc.union(&l.full_extent()));
        self.full_extent
    }

    /// Extent of all layers, as last calculated.
    #[must_use]
    pub fn full_extent(&self) -> BoundingBox {
        self.full_extent
    }

    /// Extent being viewed.
    #[must_use]
    pub fn current_extent(&self) -> BoundingBox {
        self.current_extent
    }

    /// Visited extents.
    #[must_use]
    pub fn history(&self) -> &ExtentHistory {
        &self.history
    }

    /// Views `extent` and records it in the history.
    pub fn set_current_extent(&mut self, extent: BoundingBox) {
        self.current_extent = extent;
        self.history.push(extent);
        tracing::debug!(
            min_x = extent.min_x(),
            min_y = extent.min_y(),
            max_x = extent.max_x(),
            max_y = extent.max_y(),
            "extent pushed"
        );
        self.touch();
    }

    /// Recalculates and views the full extent.
    pub fn show_full_extent(&mut self) {
        let full = self.calculate_full_extent();
        if full.is_null() {
            self.current_extent = full;
            self.touch();
        } else {
            self.set_current_extent(full);
        }
    }

    /// Steps back in the history. Returns `false` at the oldest extent.
    pub fn previous_extent(&mut self) -> bool {
        self.step_history(ExtentHistory::back)
    }

    /// Steps forward in the history. Returns `false` at the newest extent.
    pub fn next_extent(&mut self) -> bool {
        self.step_history(ExtentHistory::forward)
    }

    fn step_history(&mut self, step: fn(&mut ExtentHistory) -> bool) -> bool {
        if !step(&mut self.history) {
            return false;
        }
        if let Some(extent) = self.history.current() {
            self.current_extent = extent;
        }
        self.touch();
        true
    }

    /// Shrinks the view by a tenth of its range on every side.
    pub fn zoom_in(&mut self) {
        let e = self.current_extent;
        self.set_current_extent(e.inflate(-e.width() * STEP, -e.height() * STEP));
    }

    /// Grows the view by a tenth of its range on every side.
    pub fn zoom_out(&mut self) {
        let e = self.current_extent;
        self.set_current_extent(e.inflate(e.width() * STEP, e.height() * STEP));
    }

    /// Centres the view on `center`, then zooms in one step.
    ///
    /// Records a single history entry.
    pub fn zoom_in_at(&mut self, center: Point) {
        let e = self.current_extent.centered_on(center);
        self.set_current_extent(e.inflate(-e.width() * STEP, -e.height() * STEP));
    }

    /// Centres the view on `center`, then zooms out one step.
    pub fn zoom_out_at(&mut self, center: Point) {
        let e = self.current_extent.centered_on(center);
        self.set_current_extent(e.inflate(e.width() * STEP, e.height() * STEP));
    }

    /// Moves the view north by a tenth of its height.
    pub fn pan_up(&mut self) {
        let e = self.current_extent;
        self.set_current_extent(e.translate(0.0, e.height() * STEP));
    }

    /// Moves the view south by a tenth of its height.
    pub fn pan_down(&mut self) {
        let e = self.current_extent;
        self.set_current_extent(e.translate(0.0, -e.height() * STEP));
    }

    /// Moves the view west by a tenth of its width.
    pub fn pan_left(&mut self) {
        let e = self.current_extent;
        self.set_current_extent(e.translate(-e.width() * STEP, 0.0));
    }

    /// Moves the view east by a tenth of its width.
    pub fn pan_right(&mut self) {
        let e = self.current_extent;
        self.set_current_extent(e.translate(e.width() * STEP, 0.0));
    }

    /// Raster cell under a world position.
    ///
    /// The active layer is tried first when it is a raster; otherwise
    /// rasters are searched from the top overlay down. Returns
    /// [`GridCell::NONE`] when no raster contains the point.
    #[must_use]
    pub fn row_and_column(&self, easting: f64, northing: f64) -> GridCell {
        let active = self
            .active_layer()
            .and_then(Layer::as_raster)
            .and_then(|r| raster_cell(r, easting, northing));
        active
            .or_else(|| {
                self.layers
                    .iter()
                    .rev()
                    .filter_map(Layer::as_raster)
                    .find_map(|r| raster_cell(r, easting, northing))
            })
            .unwrap_or(GridCell::NONE)
    }

    /// Counter bumped by every change to the model.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns `true` if the model changed since [`MapModel::mark_clean`].
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.revision != self.clean_revision
    }

    /// Records the current revision as saved or drawn.
    pub fn mark_clean(&mut self) {
        self.clean_revision = self.revision;
    }

    /// Bumps the revision.
    pub fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub(crate) fn restore(
        &mut self,
        layers: Vec<Layer>,
        active: Option<usize>,
        full_extent: BoundingBox,
        current_extent: BoundingBox,
    ) {
        self.layers.clear();
        self.active = None;
        for layer in layers {
            self.add_layer(layer);
        }
        if let Some(id) = active.and_then(|a| self.layers.get(a)).map(Layer::id) {
            self.active = Some(id);
        }
        if !full_extent.is_null() {
            self.full_extent = full_extent;
        }
        self.history.clear();
        if !current_extent.is_null() {
            self.set_current_extent(current_extent);
        }
    }
}

/// Cell of `raster` containing the point, using the biased grid mapping
/// `trunc(fraction * (count - 0.5))`.
fn raster_cell(raster: &RasterLayer, easting: f64, northing: f64) -> Option<GridCell> {
    let db = raster.header().full_extent();
    let (top, bottom, left, right) = (db.max_y(), db.min_y(), db.min_x(), db.max_x());
    if !(bottom..=top).contains(&northing) || !(left..=right).contains(&easting) {
        return None;
    }
    let rows = raster.rows() as f64;
    let columns = raster.columns() as f64;
    let row = truncate_signed((top - northing) / (top - bottom) * (rows - 0.5));
    let column = truncate_signed((easting - left) / (right - left) * (columns - 0.5));
    let row = isize::try_from(row).unwrap_or(-1);
    let column = isize::try_from(column).unwrap_or(-1);
    let z = usize::try_from(row)
        .ok()
        .zip(usize::try_from(column).ok())
        .and_then(|(r, c)| raster.cell_value_at_image(r, c))
        .unwrap_or(f64::NAN);
    Some(GridCell {
        row,
        column,
        z,
        no_data: raster.no_data(),
        overlay: Some(raster.header().overlay_number()),
        is_rgb: raster.style().data_scale == DataScale::Rgb,
    })
}
