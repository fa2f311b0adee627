// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whitebox Imaging: the drawing surface the map renderer talks to.
//!
//! The map core never draws pixels itself. It issues a short list of
//! plain-data commands against an [`ImagingBackend`], which a host turns into
//! pixels with whatever toolkit it has (a CPU rasterizer, a GPU renderer, an
//! SVG writer, or a recorder in tests).
//!
//! # Core concepts
//!
//! - **Resources**: opaque handles ([`PathId`], [`ImageId`], [`PaintId`])
//!   created and released through [`ResourceBackend`]. A handle stays valid
//!   until it is destroyed.
//! - **State**: [`StateOp`] sets the transform, paint, stroke, fill rule,
//!   and pushes or pops clip/opacity layers.
//! - **Drawing**: [`DrawOp`] fills or strokes paths and rectangles, and
//!   places raster images into device rectangles.
//!
//! Geometry is stored as `f32`, which is ample for device coordinates.
//! World coordinates are transformed into device space before they reach
//! this crate.
//!
//! # Example
//!
//! ```ignore
//! # use whitebox_imaging::*;
//! # use peniko::{Brush, Color};
//! # struct MyBackend { /* implements ResourceBackend + ImagingBackend */ }
//! # impl ResourceBackend for MyBackend { /* ... */ }
//! # impl ImagingBackend for MyBackend { /* ... */ }
//! let mut backend = MyBackend { /* ... */ };
//!
//! let red = backend.create_paint(PaintDesc {
//!     brush: Brush::Solid(Color::from_rgba8(255, 0, 0, 255)),
//! });
//! let mut line = kurbo::BezPath::new();
//! line.move_to((0.0, 0.0));
//! line.line_to((40.0, 25.0));
//! let road = backend.create_path(PathDesc::from_bez_path(&line));
//!
//! backend.state(StateOp::SetPaint(red));
//! backend.state(StateOp::SetStroke(StrokeStyle::new(2.0)));
//! backend.draw(DrawOp::StrokePath(road));
//! ```

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::{BezPath, PathEl};
use peniko::Brush;
pub use peniko::{Fill as FillRule, ImageAlphaType, ImageFormat, ImageSampler};

/// Identifier for a path resource.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathId(pub u32);

/// Identifier for an image resource.
///
/// Images hold decoded RGBA pixels, typically one per visible raster layer
/// per frame.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// Identifier for a paint resource.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PaintId(pub u32);

/// Affine transform type used by the imaging commands.
pub type Affine = kurbo::Affine;

/// Stroke style (width, joins, caps, dashes).
pub type StrokeStyle = kurbo::Stroke;

/// An axis-aligned rectangle in f32 device coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RectF {
    /// Minimum X coordinate.
    pub x0: f32,
    /// Minimum Y coordinate.
    pub y0: f32,
    /// Maximum X coordinate.
    pub x1: f32,
    /// Maximum Y coordinate.
    pub y1: f32,
}

impl RectF {
    /// Create a new rectangle from min/max corners.
    #[inline]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Convert from kurbo's rectangle type.
    #[inline]
    pub fn from_kurbo(rect: kurbo::Rect) -> Self {
        let r = rect.abs();
        Self::new(to_f32(r.x0), to_f32(r.y0), to_f32(r.x1), to_f32(r.y1))
    }
}

/// Compositing layer pushed by [`StateOp::PushLayer`].
///
/// Everything drawn until the matching [`StateOp::PopLayer`] is clipped to
/// `clip` (if any) and composited with `opacity` (if any).
#[derive(Clone, Debug, PartialEq)]
pub struct LayerOp {
    /// Clip rectangle in device coordinates.
    pub clip: Option<RectF>,
    /// Group opacity in `0.0..=1.0`.
    pub opacity: Option<f32>,
}

/// State-changing operations.
#[derive(Clone, Debug, PartialEq)]
pub enum StateOp {
    /// Replace the current transform applied to subsequent geometry.
    SetTransform(Affine),
    /// Push a clip/opacity layer.
    PushLayer(LayerOp),
    /// Pop the most recently pushed layer.
    PopLayer,
    /// Select the paint used for fills and strokes.
    SetPaint(PaintId),
    /// Select the stroke style used by stroke operations.
    SetStroke(StrokeStyle),
    /// Select the fill rule used by path fills.
    SetFillRule(FillRule),
}

/// Drawing operations.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Fill a path with the current paint and fill rule.
    FillPath(PathId),
    /// Stroke a path with the current paint and stroke style.
    StrokePath(PathId),
    /// Fill an axis-aligned rectangle with the current paint.
    FillRect(RectF),
    /// Stroke an axis-aligned rectangle with the current paint and stroke.
    StrokeRect(RectF),
    /// Draw a whole image scaled into `dst`.
    DrawImageRect {
        /// Image to draw.
        image: ImageId,
        /// Destination rectangle in device coordinates.
        dst: RectF,
        /// Sampling parameters used when scaling.
        sampler: ImageSampler,
    },
}

/// A single path command in f32 device coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PathCmd {
    /// Begin a new subpath.
    MoveTo {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },
    /// Straight line to a point.
    LineTo {
        /// X coordinate.
        x: f32,
        /// Y coordinate.
        y: f32,
    },
    /// Quadratic Bézier to `(x, y)` with control point `(x1, y1)`.
    QuadTo {
        /// Control point X.
        x1: f32,
        /// Control point Y.
        y1: f32,
        /// End point X.
        x: f32,
        /// End point Y.
        y: f32,
    },
    /// Cubic Bézier to `(x, y)` with control points `(x1, y1)` and `(x2, y2)`.
    CurveTo {
        /// First control point X.
        x1: f32,
        /// First control point Y.
        y1: f32,
        /// Second control point X.
        x2: f32,
        /// Second control point Y.
        y2: f32,
        /// End point X.
        x: f32,
        /// End point Y.
        y: f32,
    },
    /// Close the current subpath.
    Close,
}

/// Description of a path resource.
#[derive(Clone, Debug, PartialEq)]
pub struct PathDesc {
    /// Path commands.
    pub commands: Box<[PathCmd]>,
}

impl PathDesc {
    /// Converts a `kurbo` path.
    pub fn from_bez_path(path: &BezPath) -> Self {
        let commands: Vec<PathCmd> = path
            .elements()
            .iter()
            .map(|el| match *el {
                PathEl::MoveTo(p) => PathCmd::MoveTo {
                    x: to_f32(p.x),
                    y: to_f32(p.y),
                },
                PathEl::LineTo(p) => PathCmd::LineTo {
                    x: to_f32(p.x),
                    y: to_f32(p.y),
                },
                PathEl::QuadTo(p1, p) => PathCmd::QuadTo {
                    x1: to_f32(p1.x),
                    y1: to_f32(p1.y),
                    x: to_f32(p.x),
                    y: to_f32(p.y),
                },
                PathEl::CurveTo(p1, p2, p) => PathCmd::CurveTo {
                    x1: to_f32(p1.x),
                    y1: to_f32(p1.y),
                    x2: to_f32(p2.x),
                    y2: to_f32(p2.y),
                    x: to_f32(p.x),
                    y: to_f32(p.y),
                },
                PathEl::ClosePath => PathCmd::Close,
            })
            .collect();
        Self {
            commands: commands.into_boxed_slice(),
        }
    }
}

/// Description of an image resource.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageDesc {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format of the data passed to [`ResourceBackend::create_image`].
    pub format: ImageFormat,
    /// Whether the pixel data is premultiplied.
    pub alpha_type: ImageAlphaType,
}

/// Description of a paint resource.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintDesc {
    /// Brush used for fills and strokes.
    pub brush: Brush,
}

/// Resource management for imaging backends.
pub trait ResourceBackend {
    /// Create a path resource.
    fn create_path(&mut self, desc: PathDesc) -> PathId;
    /// Destroy a path resource. Unknown or already destroyed ids are ignored.
    fn destroy_path(&mut self, id: PathId);

    /// Create an image resource from pixel data laid out per `desc`.
    fn create_image(&mut self, desc: ImageDesc, pixels: &[u8]) -> ImageId;
    /// Destroy an image resource. Unknown or already destroyed ids are ignored.
    fn destroy_image(&mut self, id: ImageId);

    /// Create a paint resource.
    fn create_paint(&mut self, desc: PaintDesc) -> PaintId;
    /// Destroy a paint resource. Unknown or already destroyed ids are ignored.
    fn destroy_paint(&mut self, id: PaintId);
}

/// A single state or draw operation, as stored by recorders.
#[derive(Clone, Debug, PartialEq)]
pub enum ImagingOp {
    /// State operation.
    State(StateOp),
    /// Draw operation.
    Draw(DrawOp),
}

/// Backend that accepts imaging operations.
pub trait ImagingBackend: ResourceBackend {
    /// Apply a state operation.
    fn state(&mut self, op: StateOp);

    /// Apply a draw operation.
    fn draw(&mut self, op: DrawOp);
}

/// Scoped helpers for [`ImagingBackend`].
pub trait ImagingBackendExt: ImagingBackend {
    /// Run `f` inside a clip layer, popping it afterwards.
    #[inline]
    fn with_clip_rect<R>(&mut self, rect: RectF, f: impl FnOnce(&mut Self) -> R) -> R {
        self.state(StateOp::PushLayer(LayerOp {
            clip: Some(rect),
            opacity: None,
        }));
        let out = f(self);
        self.state(StateOp::PopLayer);
        out
    }
}

impl<B: ImagingBackend + ?Sized> ImagingBackendExt for B {}

#[allow(
    clippy::cast_possible_truncation,
    reason = "device coordinates comfortably fit f32"
)]
#[inline]
fn to_f32(v: f64) -> f32 {
    v as f32
}
