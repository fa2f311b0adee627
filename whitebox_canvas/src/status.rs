// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use kurbo::Point;
use whitebox_map::{CellReadout, GridCell, MapModel, format_grouped};
use whitebox_view::ViewportTransform;

/// What the status bar shows for the pointer position.
///
/// Displays as `E: 1,234.5  N: 678.0  Row: 3  Col: 4  Z: 12.25`. Row,
/// column and value are left out when no raster lies under the pointer;
/// packed colour rasters show `R: .. G: .. B: ..` in place of `Z:`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusReadout {
    /// World position under the pointer.
    pub world: Point,
    /// Raster cell under the pointer.
    pub cell: GridCell,
}

impl StatusReadout {
    /// Resolves a device position against a drawn frame.
    #[must_use]
    pub fn at(model: &MapModel, viewport: &ViewportTransform, device: Point) -> Self {
        let world = viewport.device_to_world_point(device);
        Self {
            world,
            cell: model.row_and_column(world.x, world.y),
        }
    }
}

impl fmt::Display for StatusReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "E: {}  N: {}",
            format_grouped(self.world.x, 1, false),
            format_grouped(self.world.y, 1, false)
        )?;
        if self.cell.is_none() {
            return Ok(());
        }
        write!(f, "  Row: {}  Col: {}", self.cell.row, self.cell.column)?;
        match self.cell.readout() {
            rgba @ CellReadout::Rgba { .. } => write!(f, "  {rgba}"),
            CellReadout::OutsideRasters => Ok(()),
            other => write!(f, "  Z: {other}"),
        }
    }
}
