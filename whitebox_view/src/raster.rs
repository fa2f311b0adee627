// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::ops::Range;

use kurbo::Rect;
use whitebox_extent::BoundingBox;

use crate::ViewportTransform;

/// Row/column shape of a raster grid over its full extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridShape {
    /// Number of rows (north to south).
    pub rows: usize,
    /// Number of columns (west to east).
    pub columns: usize,
    /// Full world extent covered by the grid.
    pub extent: BoundingBox,
}

impl GridShape {
    /// Creates a grid shape.
    #[must_use]
    pub fn new(rows: usize, columns: usize, extent: BoundingBox) -> Self {
        Self {
            rows,
            columns,
            extent,
        }
    }

    /// Returns the width of one cell in world units.
    #[must_use]
    pub fn cell_size_x(&self) -> f64 {
        self.extent.width() / self.columns as f64
    }

    /// Returns the height of one cell in world units.
    #[must_use]
    pub fn cell_size_y(&self) -> f64 {
        self.extent.height() / self.rows as f64
    }

    /// Projects a sub-extent of the grid onto row and column index ranges.
    ///
    /// Each edge offset from the full extent is converted to whole cells and
    /// truncated, so a partially covered edge cell stays in the window. The
    /// ranges are clamped to the grid.
    #[must_use]
    pub fn window_for(&self, visible: &BoundingBox) -> (Range<usize>, Range<usize>) {
        let cs_x = self.cell_size_x();
        let cs_y = self.cell_size_y();
        let full = &self.extent;

        let start_row = cells(full.max_y() - visible.max_y(), cs_y);
        let end_row = self
            .rows
            .saturating_sub(cells(full.min_y() - visible.min_y(), cs_y));
        let start_col = cells(full.min_x() - visible.min_x(), cs_x);
        let end_col = self
            .columns
            .saturating_sub(cells(full.max_x() - visible.max_x(), cs_x));

        (
            start_row.min(self.rows)..end_row,
            start_col.min(self.columns)..end_col,
        )
    }
}

/// Truncated whole number of cells covering `offset`.
#[allow(
    clippy::cast_possible_truncation,
    reason = "the quotient is non-negative and the cast truncates toward zero"
)]
fn cells(offset: f64, cell_size: f64) -> usize {
    let n = offset.abs() / cell_size;
    if n.is_finite() { n as usize } else { 0 }
}

/// The part of a raster that is visible in a viewport, and how to sample it.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterWindow {
    /// Full extent intersected with the viewport's map extent.
    pub visible_extent: BoundingBox,
    /// Device rectangle the visible extent occupies.
    pub device_rect: Rect,
    /// Visible source rows.
    pub rows: Range<usize>,
    /// Visible source columns.
    pub columns: Range<usize>,
    /// Sampling stride: every `resolution_factor`-th row and column is kept.
    ///
    /// Always at least `1`.
    pub resolution_factor: usize,
}

impl ViewportTransform {
    /// Computes the visible window of a raster grid and its decimation stride.
    ///
    /// Returns `None` when the grid does not intersect the map extent or when
    /// the visible part covers less than one device pixel on either axis.
    #[must_use]
    pub fn raster_window(&self, grid: &GridShape) -> Option<RasterWindow> {
        let map = self.map_extent();
        if !grid.extent.does_intersect(&map) {
            return None;
        }
        let visible_extent = grid.extent.intersect(&map);
        let device_rect = self.world_to_device_rect(&visible_extent);
        if device_rect.width() < 1.0 || device_rect.height() < 1.0 {
            return None;
        }

        let (rows, columns) = grid.window_for(&visible_extent);
        if rows.is_empty() || columns.is_empty() {
            return None;
        }

        let row_ratio = rows.len() as f64 / device_rect.height();
        let col_ratio = columns.len() as f64 / device_rect.width();
        let resolution_factor = stride(row_ratio.min(col_ratio));

        Some(RasterWindow {
            visible_extent,
            device_rect,
            rows,
            columns,
            resolution_factor,
        })
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "the cast floors a ratio already known to be at least one"
)]
fn stride(ratio: f64) -> usize {
    if ratio.is_finite() && ratio >= 1.0 {
        ratio as usize
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Size;
    use whitebox_extent::BoundingBox;

    use super::GridShape;
    use crate::ViewportTransform;

    #[test]
    fn hundred_cells_into_fifty_pixels_strides_by_two() {
        let full = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let vp = ViewportTransform::new(Size::new(50.0, 50.0), 0.0, full).unwrap();
        let grid = GridShape::new(100, 100, full);
        let w = vp.raster_window(&grid).unwrap();
        assert_eq!(w.resolution_factor, 2);
        assert_eq!(w.rows, 0..100);
        assert_eq!(w.columns, 0..100);
        assert_eq!(w.visible_extent, full);
        assert!((w.device_rect.width() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn upsampled_grid_keeps_full_resolution() {
        let full = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let vp = ViewportTransform::new(Size::new(500.0, 500.0), 0.0, full).unwrap();
        let grid = GridShape::new(10, 10, full);
        let w = vp.raster_window(&grid).unwrap();
        assert_eq!(w.resolution_factor, 1);
    }

    #[test]
    fn zoomed_view_selects_sub_window() {
        let full = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let view = BoundingBox::new(25.0, 50.0, 75.0, 100.0);
        let vp = ViewportTransform::new(Size::new(50.0, 50.0), 0.0, view).unwrap();
        let grid = GridShape::new(100, 100, full);
        let w = vp.raster_window(&grid).unwrap();
        assert_eq!(w.rows, 0..50);
        assert_eq!(w.columns, 25..75);
        assert_eq!(w.resolution_factor, 1);
    }

    #[test]
    fn grid_outside_view_has_no_window() {
        let full = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let view = BoundingBox::new(500.0, 500.0, 600.0, 600.0);
        let vp = ViewportTransform::new(Size::new(50.0, 50.0), 0.0, view).unwrap();
        assert!(vp.raster_window(&GridShape::new(100, 100, full)).is_none());
    }

    #[test]
    fn cell_sizes_follow_extent() {
        let grid = GridShape::new(50, 200, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        assert!((grid.cell_size_x() - 0.5).abs() < 1e-12);
        assert!((grid.cell_size_y() - 2.0).abs() < 1e-12);
    }
}
