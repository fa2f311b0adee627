// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whitebox Canvas: pointer interaction for a map view.
//!
//! This crate turns raw pointer events into map navigation:
//!
//! - [`DragState`]: tracks one pressed button and tells clicks from drags.
//! - [`MapCanvas`]: the mouse-mode state machine. In [`MouseMode::Zoom`] a
//!   drag zooms to the dragged rectangle and a click zooms in (primary
//!   button) or out (secondary button) around the pointer; in
//!   [`MouseMode::Pan`] a drag moves the view. A secondary double click
//!   resets to the full extent in every mode.
//! - [`StatusReadout`]: easting, northing, row, column and value under the
//!   pointer for a status bar.
//!
//! The canvas never draws. Hosts render with
//! [`whitebox_map::MapRenderer`], keep the returned viewport, and pass it
//! back with each pointer event.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use whitebox_canvas::{Gesture, MapCanvas, MouseButton, MouseMode};
//! use whitebox_extent::BoundingBox;
//! use whitebox_map::memory::MemoryRaster;
//! use whitebox_map::{MapModel, PaletteLibrary, RasterLayer};
//! use whitebox_view::ViewportTransform;
//!
//! let palettes = PaletteLibrary::with_builtin();
//! let full = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
//! let mut map = MapModel::new("demo");
//! map.add_layer(RasterLayer::new(
//!     Box::new(MemoryRaster::new("flat.dep", 10, 10, full, 1.0)),
//!     &palettes,
//! ));
//! let vp = ViewportTransform::new(Size::new(100.0, 100.0), 0.0, map.current_extent()).unwrap();
//!
//! let mut canvas = MapCanvas::new(MouseMode::Zoom);
//! canvas.pointer_down(Point::new(0.0, 0.0), MouseButton::Primary);
//! canvas.pointer_move(&map, &vp, Point::new(50.0, 50.0));
//! let gesture = canvas.pointer_up(&mut map, &vp, Point::new(50.0, 50.0), 1);
//!
//! // The top-left quarter of the map is now the view.
//! assert_eq!(gesture, Some(Gesture::ZoomToRect(BoundingBox::new(0.0, 50.0, 50.0, 100.0))));
//! assert_eq!(map.current_extent(), BoundingBox::new(0.0, 50.0, 50.0, 100.0));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

mod canvas;
mod drag;
mod status;

pub use canvas::{Gesture, MapCanvas, MouseMode};
pub use drag::{DragState, MouseButton, Release};
pub use status::StatusReadout;
