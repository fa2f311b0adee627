// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing a [`MapModel`] onto an imaging backend.

use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{BezPath, Point, Rect, Size, Stroke};
use peniko::{Brush, ImageQuality};
use whitebox_imaging::{
    Affine, DrawOp, FillRule, ImageAlphaType, ImageDesc, ImageFormat, ImageId, ImageSampler,
    ImagingBackend, ImagingBackendExt, PaintDesc, PaintId, PathDesc, PathId, RectF,
    ResourceBackend, StateOp,
};
use whitebox_view::ViewportTransform;

use crate::layer::Layer;
use crate::marker::MarkerTable;
use crate::model::MapModel;
use crate::palette::Argb;
use crate::pointcloud::PointCloudLayer;
use crate::raster::RasterLayer;
use crate::source::ShapeType;
use crate::vector::{VectorFlags, VectorLayer, polygon_path, polyline_paths, ring_paths};

/// Frame decoration settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    /// Margin around the map area in device pixels.
    pub border: f64,
    /// Colour of the whole surface behind the map.
    pub background: Argb,
    /// Colour of the frame around the map area.
    pub neatline_colour: Argb,
    /// Width of the frame in device pixels.
    pub neatline_width: f64,
    /// Draw the frame.
    pub draw_neatline: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            border: 10.0,
            background: Argb::WHITE,
            neatline_colour: Argb::BLACK,
            neatline_width: 1.0,
            draw_neatline: true,
        }
    }
}

/// Counters for one rendered frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Layers that produced drawing commands.
    pub layers_drawn: usize,
    /// Layers skipped as hidden, off-screen or too small.
    pub layers_skipped: usize,
    /// Raster images placed.
    pub images: usize,
    /// Vector records drawn.
    pub records: usize,
    /// Point markers and LiDAR points drawn.
    pub points: usize,
}

/// Result of a successful render.
#[derive(Clone, Copy, Debug)]
pub struct RenderedFrame {
    /// Transform the frame was drawn with; hit tests should use it.
    pub viewport: ViewportTransform,
    /// Frame counters.
    pub stats: RenderStats,
}

/// Resources created for one frame.
#[derive(Debug, Default)]
struct FrameResources {
    paths: Vec<PathId>,
    images: Vec<ImageId>,
    paints: HashMap<Argb, PaintId>,
}

/// Draws maps bottom layer first.
///
/// Paths, images and paints created for a frame stay alive until the next
/// call to [`MapRenderer::render`] or [`MapRenderer::release`], so a backend
/// may draw lazily.
#[derive(Debug, Default)]
pub struct MapRenderer {
    config: RenderConfig,
    frame: FrameResources,
}

impl MapRenderer {
    /// Creates a renderer.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            frame: FrameResources::default(),
        }
    }

    /// Frame decoration settings.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Frame decoration settings, mutably.
    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    /// Viewport the next frame of `model` would use on a `device` surface.
    #[must_use]
    pub fn viewport(&self, model: &MapModel, device: Size) -> Option<ViewportTransform> {
        ViewportTransform::new(device, self.config.border, model.current_extent())
    }

    /// Releases the resources of the last frame.
    pub fn release<B: ResourceBackend + ?Sized>(&mut self, backend: &mut B) {
        for id in self.frame.paths.drain(..) {
            backend.destroy_path(id);
        }
        for id in self.frame.images.drain(..) {
            backend.destroy_image(id);
        }
        for (_, id) in self.frame.paints.drain() {
            backend.destroy_paint(id);
        }
    }

    /// Draws `model` on a `device` surface.
    ///
    /// Returns `None` when the current extent cannot be mapped onto the
    /// surface; only the background is drawn then.
    pub fn render<B: ImagingBackend + ?Sized>(
        &mut self,
        model: &mut MapModel,
        device: Size,
        backend: &mut B,
    ) -> Option<RenderedFrame> {
        self.release(backend);
        backend.state(StateOp::SetTransform(Affine::IDENTITY));
        backend.state(StateOp::SetFillRule(FillRule::NonZero));
        let background = self.paint(backend, self.config.background);
        backend.state(StateOp::SetPaint(background));
        backend.draw(DrawOp::FillRect(RectF::from_kurbo(device.to_rect())));

        let Some(vp) = self.viewport(model, device) else {
            tracing::warn!(
                width = device.width,
                height = device.height,
                border = self.config.border,
                "no usable viewport for the current extent"
            );
            return None;
        };

        let mut stats = RenderStats::default();
        backend.with_clip_rect(RectF::from_kurbo(vp.usable_rect()), |b| {
            for layer in model.layers_mut() {
                if self.draw_layer(layer, &vp, b, &mut stats) {
                    stats.layers_drawn += 1;
                } else {
                    stats.layers_skipped += 1;
                }
            }
        });

        if self.config.draw_neatline {
            let paint = self.paint(backend, self.config.neatline_colour);
            backend.state(StateOp::SetPaint(paint));
            backend.state(StateOp::SetStroke(Stroke::new(self.config.neatline_width)));
            backend.draw(DrawOp::StrokeRect(RectF::from_kurbo(vp.usable_rect())));
        }
        tracing::trace!(?stats, "frame rendered");
        Some(RenderedFrame {
            viewport: vp,
            stats,
        })
    }

    fn draw_layer<B: ImagingBackend + ?Sized>(
        &mut self,
        layer: &mut Layer,
        vp: &ViewportTransform,
        backend: &mut B,
        stats: &mut RenderStats,
    ) -> bool {
        let header = layer.header_mut();
        header.current_extent = header.full_extent.intersect(&vp.map_extent());
        if !layer.is_visible() {
            tracing::trace!(layer = layer.title(), "hidden, skipped");
            return false;
        }
        if !layer.full_extent().does_intersect(&vp.map_extent()) {
            tracing::trace!(layer = layer.title(), "outside the view, skipped");
            return false;
        }
        match layer {
            Layer::Raster(r) => self.draw_raster(r, vp, backend, stats),
            Layer::Vector(v) => self.draw_vector(v, vp, backend, stats),
            Layer::PointCloud(p) => self.draw_point_cloud(p, vp, backend, stats),
        }
    }

    fn draw_raster<B: ImagingBackend + ?Sized>(
        &mut self,
        layer: &mut RasterLayer,
        vp: &ViewportTransform,
        backend: &mut B,
        stats: &mut RenderStats,
    ) -> bool {
        let grid = layer.source().grid_shape();
        let Some(window) = vp.raster_window(&grid) else {
            tracing::trace!(
                layer = %layer.header().title(),
                "raster window below one pixel, skipped"
            );
            return false;
        };
        let image = layer.update_image(&window);
        let (Ok(width), Ok(height)) = (u32::try_from(image.width()), u32::try_from(image.height()))
        else {
            return false;
        };
        if width == 0 || height == 0 {
            return false;
        }
        let id = backend.create_image(
            ImageDesc {
                width,
                height,
                format: ImageFormat::Rgba8,
                alpha_type: ImageAlphaType::Alpha,
            },
            &image.to_rgba8(),
        );
        self.frame.images.push(id);
        backend.draw(DrawOp::DrawImageRect {
            image: id,
            dst: RectF::from_kurbo(window.device_rect),
            sampler: ImageSampler {
                quality: ImageQuality::Low,
                ..ImageSampler::default()
            },
        });
        tracing::trace!(
            layer = %layer.header().title(),
            width,
            height,
            resolution_factor = window.resolution_factor,
            "raster drawn"
        );
        stats.images += 1;
        true
    }

    fn draw_vector<B: ImagingBackend + ?Sized>(
        &mut self,
        layer: &mut VectorLayer,
        vp: &ViewportTransform,
        backend: &mut B,
        stats: &mut RenderStats,
    ) -> bool {
        let min_length = vp.min_distinguishable_length(layer.style().generalization_level);
        layer.prepare(vp.map_extent(), min_length);
        let (Some(query), Some(colours)) = (layer.last_query(), layer.last_colours()) else {
            return false;
        };
        let style = layer.style();
        let alpha = layer.header().alpha();
        let records = layer.source().records();
        let line_colour = style.line_colour.with_alpha(alpha);
        let outline_colour = |record: usize| {
            if style.colouring_attribute.is_none()
                || style.flags.contains(VectorFlags::OUTLINED_WITH_ONE_COLOUR)
            {
                line_colour
            } else {
                colours.colour(record)
            }
        };
        let filled = style.flags.contains(VectorFlags::FILLED);
        let outlined = style.flags.contains(VectorFlags::OUTLINED);
        backend.state(StateOp::SetStroke(style.stroke()));

        match layer.shape_type().base() {
            ShapeType::Point | ShapeType::MultiPoint => {
                let table = MarkerTable::new(style.marker_size);
                let glyph = table.glyph(style.marker);
                for &r in query.records() {
                    for p in &records[r].geometry.points {
                        let center = vp.world_to_device_point(*p);
                        if filled && glyph.is_fillable() {
                            let path = glyph.fill_path(center);
                            self.fill(backend, colours.colour(r), &path, FillRule::NonZero);
                        }
                        if outlined || !glyph.is_fillable() {
                            let path = glyph.stroke_path(center);
                            self.stroke(backend, outline_colour(r), &path);
                        }
                        stats.points += 1;
                    }
                }
            }
            ShapeType::PolyLine => {
                for &r in query.records() {
                    for path in polyline_paths(&records[r].geometry, vp) {
                        self.stroke(backend, colours.colour(r), &path);
                    }
                }
            }
            _ => {
                for &r in query.records() {
                    let geometry = &records[r].geometry;
                    if filled {
                        let path = polygon_path(geometry, vp);
                        self.fill(backend, colours.colour(r), &path, FillRule::EvenOdd);
                    }
                    if outlined {
                        for ring in ring_paths(geometry, vp) {
                            self.stroke(backend, outline_colour(r), &ring);
                        }
                    }
                }
            }
        }
        stats.records += query.records().len();
        tracing::trace!(
            layer = %layer.header().title(),
            records = query.records().len(),
            min_length,
            "vector drawn"
        );
        true
    }

    fn draw_point_cloud<B: ImagingBackend + ?Sized>(
        &mut self,
        layer: &mut PointCloudLayer,
        vp: &ViewportTransform,
        backend: &mut B,
        stats: &mut RenderStats,
    ) -> bool {
        let map_extent = vp.map_extent();
        layer.colours();
        let Some(colours) = layer.last_colours() else {
            return false;
        };
        let half = layer.style().marker_size / 2.0;
        let mut current: Option<Argb> = None;
        for (p, colour) in layer.source().points().iter().zip(colours) {
            let world = Point::new(p.x, p.y);
            if colour.a() == 0 || !map_extent.contains_point(world) {
                continue;
            }
            if current != Some(*colour) {
                let paint = self.paint(backend, *colour);
                backend.state(StateOp::SetPaint(paint));
                current = Some(*colour);
            }
            let c = vp.world_to_device_point(world);
            backend.draw(DrawOp::FillRect(RectF::from_kurbo(Rect::new(
                c.x - half,
                c.y - half,
                c.x + half,
                c.y + half,
            ))));
            stats.points += 1;
        }
        true
    }

    fn paint<B: ResourceBackend + ?Sized>(&mut self, backend: &mut B, colour: Argb) -> PaintId {
        *self.frame.paints.entry(colour).or_insert_with(|| {
            backend.create_paint(PaintDesc {
                brush: Brush::Solid(colour.to_color()),
            })
        })
    }

    fn path<B: ResourceBackend + ?Sized>(&mut self, backend: &mut B, path: &BezPath) -> PathId {
        let id = backend.create_path(PathDesc::from_bez_path(path));
        self.frame.paths.push(id);
        id
    }

    fn fill<B: ImagingBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        colour: Argb,
        path: &BezPath,
        rule: FillRule,
    ) {
        if colour.a() == 0 || path.elements().is_empty() {
            return;
        }
        let paint = self.paint(backend, colour);
        let id = self.path(backend, path);
        backend.state(StateOp::SetFillRule(rule));
        backend.state(StateOp::SetPaint(paint));
        backend.draw(DrawOp::FillPath(id));
    }

    fn stroke<B: ImagingBackend + ?Sized>(&mut self, backend: &mut B, colour: Argb, path: &BezPath) {
        if colour.a() == 0 || path.elements().is_empty() {
            return;
        }
        let paint = self.paint(backend, colour);
        let id = self.path(backend, path);
        backend.state(StateOp::SetPaint(paint));
        backend.draw(DrawOp::StrokePath(id));
    }
}
