// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect, Vec2};
use whitebox_extent::BoundingBox;
use whitebox_map::{GridCell, MapError, MapModel, Result};
use whitebox_view::ViewportTransform;

use crate::drag::{DragState, MouseButton, Release};
use crate::status::StatusReadout;

/// What a primary-button gesture does on the map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MouseMode {
    /// Drag a rectangle to zoom to it; click to zoom in or out.
    #[default]
    Zoom,
    /// Drag to move the view.
    Pan,
    /// Click to pick the raster cell under the pointer.
    Info,
    /// Clicks and drags leave the view alone.
    Select,
}

/// A finished gesture and what it did to the model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// The current extent became the dragged rectangle.
    ZoomToRect(BoundingBox),
    /// The current extent moved by a world offset.
    Pan(Vec2),
    /// The view was centred on a world point and zoomed in.
    ZoomInAt(Point),
    /// The view was centred on a world point and zoomed out.
    ZoomOutAt(Point),
    /// The view was reset to the full extent.
    FullExtent,
    /// A raster cell was picked for display or editing.
    PickCell(GridCell),
}

/// Mouse-mode state machine for one map canvas.
///
/// The host forwards pointer events with the viewport of the frame on
/// screen; finished gestures are applied to the model and returned so the
/// host knows to redraw.
#[derive(Clone, Copy, Debug, Default)]
pub struct MapCanvas {
    mode: MouseMode,
    drag: DragState,
    modifying_pixels: bool,
}

impl MapCanvas {
    /// Creates a canvas in `mode`.
    #[must_use]
    pub fn new(mode: MouseMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Sets the distance in device pixels a press must travel to count as a
    /// drag.
    #[must_use]
    pub fn with_drag_threshold(mut self, threshold: f64) -> Self {
        self.drag = DragState::new(threshold);
        self
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> MouseMode {
        self.mode
    }

    /// Switches mode, dropping any gesture in progress.
    pub fn set_mode(&mut self, mode: MouseMode) {
        if self.mode != mode {
            tracing::debug!(?mode, "mouse mode changed");
            self.mode = mode;
            self.drag.cancel();
        }
    }

    /// Returns `true` if single clicks pick cells for editing.
    #[must_use]
    pub fn is_modifying_pixels(&self) -> bool {
        self.modifying_pixels
    }

    /// Turns pixel editing on or off. While on, single clicks pick cells in
    /// every mode.
    pub fn set_modifying_pixels(&mut self, on: bool) {
        self.modifying_pixels = on;
    }

    /// Tracked press state.
    #[must_use]
    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    /// A button went down.
    pub fn pointer_down(&mut self, pos: Point, button: MouseButton) {
        self.drag.press(pos, button);
    }

    /// The pointer moved; returns the status readout for its position.
    pub fn pointer_move(
        &mut self,
        model: &MapModel,
        viewport: &ViewportTransform,
        pos: Point,
    ) -> StatusReadout {
        self.drag.update(pos);
        StatusReadout::at(model, viewport, pos)
    }

    /// Device rectangle to outline while a zoom drag is in progress.
    #[must_use]
    pub fn rubber_band(&self) -> Option<Rect> {
        if self.mode == MouseMode::Zoom {
            self.drag.rect()
        } else {
            None
        }
    }

    /// A button came up. `click_count` is the host's multi-click counter
    /// (1 for a single click, 2 for a double click).
    pub fn pointer_up(
        &mut self,
        model: &mut MapModel,
        viewport: &ViewportTransform,
        pos: Point,
        click_count: u32,
    ) -> Option<Gesture> {
        let gesture = match self.drag.release(pos)? {
            Release::Drag { start, end, .. } => self.drag_gesture(model, viewport, start, end),
            Release::Click { at, button } => {
                self.click_gesture(model, viewport, at, button, click_count)
            }
        };
        if let Some(g) = &gesture {
            tracing::debug!(mode = ?self.mode, gesture = ?g, "gesture applied");
        }
        gesture
    }

    fn drag_gesture(
        &self,
        model: &mut MapModel,
        viewport: &ViewportTransform,
        start: Point,
        end: Point,
    ) -> Option<Gesture> {
        let a = viewport.device_to_world_point(start);
        let b = viewport.device_to_world_point(end);
        match self.mode {
            MouseMode::Zoom => {
                let rect = BoundingBox::from_corners(a, b);
                if rect.width() <= 0.0 || rect.height() <= 0.0 {
                    return None;
                }
                model.set_current_extent(rect);
                Some(Gesture::ZoomToRect(rect))
            }
            MouseMode::Pan => {
                let delta = a - b;
                let moved = model.current_extent().translate(delta.x, delta.y);
                model.set_current_extent(moved);
                Some(Gesture::Pan(delta))
            }
            MouseMode::Info | MouseMode::Select => None,
        }
    }

    fn click_gesture(
        &self,
        model: &mut MapModel,
        viewport: &ViewportTransform,
        at: Point,
        button: MouseButton,
        click_count: u32,
    ) -> Option<Gesture> {
        let world = viewport.device_to_world_point(at);
        match click_count {
            1 if self.modifying_pixels || self.mode == MouseMode::Info => {
                let cell = model.row_and_column(world.x, world.y);
                (!cell.is_none()).then_some(Gesture::PickCell(cell))
            }
            1 if self.mode == MouseMode::Zoom => match button {
                MouseButton::Primary => {
                    model.zoom_in_at(world);
                    Some(Gesture::ZoomInAt(world))
                }
                MouseButton::Secondary => {
                    model.zoom_out_at(world);
                    Some(Gesture::ZoomOutAt(world))
                }
                MouseButton::Middle => None,
            },
            2 if button == MouseButton::Secondary => {
                model.show_full_extent();
                Some(Gesture::FullExtent)
            }
            _ => None,
        }
    }

    /// Writes a new value into a picked cell.
    pub fn edit_cell(&self, model: &mut MapModel, cell: &GridCell, z: f64) -> Result<()> {
        let overlay = cell.overlay.ok_or(MapError::CellOutOfRange {
            row: cell.row,
            column: cell.column,
        })?;
        model.set_cell_value(overlay, cell.row, cell.column, z)
    }
}
