// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whitebox View: the map viewport.
//!
//! This crate provides a small, headless model of how a world-space map
//! extent lands on a device surface. It focuses on:
//! - Uniform scaling of the requested extent into a border-inset device
//!   rectangle, letterboxed so the aspect ratio is preserved.
//! - The *map extent*: the world rectangle that is actually visible once the
//!   letterbox margins are accounted for.
//! - Coordinate conversion between world and device (pixel) space. Y grows
//!   upward in the world and downward on the device.
//! - Raster decimation: which source rows and columns of a grid are visible
//!   and which stride keeps the sample count close to the device pixel count.
//!
//! It does **not** own layers, caches, or a rendering backend. Callers build a
//! [`ViewportTransform`] per repaint from the current extent and the device
//! size, then use it for drawing and for hit testing.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size};
//! use whitebox_extent::BoundingBox;
//! use whitebox_view::ViewportTransform;
//!
//! // A 2:1 extent on a square 200x200 surface with a 10 px border.
//! let extent = BoundingBox::new(0.0, 0.0, 200.0, 100.0);
//! let vp = ViewportTransform::new(Size::new(200.0, 200.0), 10.0, extent).unwrap();
//!
//! // The extent is letterboxed vertically, so more world is visible than asked for.
//! assert!(vp.map_extent().height() > extent.height());
//!
//! // Device to world and back.
//! let world = vp.device_to_world_point(Point::new(100.0, 100.0));
//! assert!((world.x - 100.0).abs() < 1e-9);
//! assert!((world.y - 50.0).abs() < 1e-9);
//! ```
//!
//! ## Raster decimation example
//!
//! ```rust
//! use kurbo::Size;
//! use whitebox_extent::BoundingBox;
//! use whitebox_view::{GridShape, ViewportTransform};
//!
//! let full = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
//! let vp = ViewportTransform::new(Size::new(50.0, 50.0), 0.0, full).unwrap();
//! let grid = GridShape::new(100, 100, full);
//!
//! let window = vp.raster_window(&grid).unwrap();
//! assert_eq!(window.resolution_factor, 2);
//! assert_eq!(window.rows, 0..100);
//! ```
//!
//! This crate is `no_std`.

#![no_std]

mod raster;
mod viewport;

pub use raster::{GridShape, RasterWindow};
pub use viewport::ViewportTransform;
