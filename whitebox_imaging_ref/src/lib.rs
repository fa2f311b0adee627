// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whitebox Imaging Reference Backend.
//!
//! A small, stateful implementation of [`ImagingBackend`] and
//! [`ResourceBackend`] that records what a map renderer asked for instead of
//! drawing it.
//!
//! - It does **not** rasterize to pixels.
//! - It keeps every live resource, so tests can read back image pixels and
//!   path commands, and check that per-frame resources were released.
//! - Each state or draw operation is logged together with the imaging state
//!   in effect when it was applied.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;

use whitebox_imaging::{
    Affine, DrawOp, FillRule, ImageDesc, ImageId, ImagingBackend, ImagingOp, LayerOp, PaintDesc,
    PaintId, PathDesc, PathId, ResourceBackend, StateOp, StrokeStyle,
};

/// Snapshot of the current imaging state inside the backend.
#[derive(Clone, Debug)]
pub struct StateSnapshot {
    /// Current transform.
    pub transform: Affine,
    /// Number of active layers on the layer stack.
    pub layer_stack_depth: u32,
    /// The most recently pushed layer op, if any.
    pub layer_top: Option<LayerOp>,
    /// Current paint, if set.
    pub paint: Option<PaintId>,
    /// Current stroke style, if set.
    pub stroke: Option<StrokeStyle>,
    /// Current fill rule.
    pub fill_rule: FillRule,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            layer_stack_depth: 0,
            layer_top: None,
            paint: None,
            stroke: None,
            fill_rule: FillRule::NonZero,
        }
    }
}

/// Event recorded by the reference backend.
#[derive(Clone, Debug)]
pub enum Event {
    /// State operation and the resulting state snapshot.
    State {
        /// State operation that was applied.
        op: StateOp,
        /// Snapshot after applying the state operation.
        state: StateSnapshot,
    },
    /// Draw operation and the state snapshot used for drawing.
    Draw {
        /// Draw operation that was applied.
        op: DrawOp,
        /// Snapshot at the time of drawing.
        state: StateSnapshot,
    },
}

/// Recording implementation of the imaging backend.
#[derive(Default, Debug)]
pub struct RefBackend {
    paths: Vec<Option<PathDesc>>,
    images: Vec<Option<(ImageDesc, Vec<u8>)>>,
    paints: Vec<Option<PaintDesc>>,

    events: Vec<Event>,
    ops: Vec<ImagingOp>,
    state: StateSnapshot,
    layer_stack: Vec<LayerOp>,
}

impl RefBackend {
    /// Returns the recorded events in application order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Returns the raw imaging operations in application order.
    pub fn ops(&self) -> &[ImagingOp] {
        &self.ops
    }

    /// Returns only the draw operations.
    pub fn draws(&self) -> impl Iterator<Item = &DrawOp> + '_ {
        self.ops.iter().filter_map(|op| match op {
            ImagingOp::Draw(d) => Some(d),
            ImagingOp::State(_) => None,
        })
    }

    /// Clears all recorded events and ops but keeps resources.
    pub fn clear_events(&mut self) {
        self.events.clear();
        self.ops.clear();
    }

    /// Returns the current imaging state.
    pub fn current_state(&self) -> &StateSnapshot {
        &self.state
    }

    /// Returns a live path.
    pub fn path(&self, id: PathId) -> Option<&PathDesc> {
        self.paths.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Returns a live image and its pixel bytes.
    pub fn image(&self, id: ImageId) -> Option<(&ImageDesc, &[u8])> {
        self.images
            .get(id.0 as usize)
            .and_then(Option::as_ref)
            .map(|(desc, px)| (desc, px.as_slice()))
    }

    /// Returns a live paint.
    pub fn paint(&self, id: PaintId) -> Option<&PaintDesc> {
        self.paints.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Returns the number of paths not yet destroyed.
    pub fn live_paths(&self) -> usize {
        self.paths.iter().filter(|p| p.is_some()).count()
    }

    /// Returns the number of images not yet destroyed.
    pub fn live_images(&self) -> usize {
        self.images.iter().filter(|p| p.is_some()).count()
    }

    /// Returns the number of paints not yet destroyed.
    pub fn live_paints(&self) -> usize {
        self.paints.iter().filter(|p| p.is_some()).count()
    }
}

fn next_id<T>(slots: &[T]) -> u32 {
    u32::try_from(slots.len()).unwrap_or(u32::MAX)
}

fn release<T>(slots: &mut [Option<T>], idx: u32) {
    if let Some(slot) = slots.get_mut(idx as usize) {
        *slot = None;
    }
}

impl ResourceBackend for RefBackend {
    fn create_path(&mut self, desc: PathDesc) -> PathId {
        let id = next_id(&self.paths);
        self.paths.push(Some(desc));
        PathId(id)
    }

    fn destroy_path(&mut self, id: PathId) {
        release(&mut self.paths, id.0);
    }

    fn create_image(&mut self, desc: ImageDesc, pixels: &[u8]) -> ImageId {
        let id = next_id(&self.images);
        self.images.push(Some((desc, pixels.to_vec())));
        ImageId(id)
    }

    fn destroy_image(&mut self, id: ImageId) {
        release(&mut self.images, id.0);
    }

    fn create_paint(&mut self, desc: PaintDesc) -> PaintId {
        let id = next_id(&self.paints);
        self.paints.push(Some(desc));
        PaintId(id)
    }

    fn destroy_paint(&mut self, id: PaintId) {
        release(&mut self.paints, id.0);
    }
}

impl ImagingBackend for RefBackend {
    fn state(&mut self, op: StateOp) {
        match &op {
            StateOp::SetTransform(tx) => self.state.transform = *tx,
            StateOp::PushLayer(layer) => {
                self.layer_stack.push(layer.clone());
                self.sync_layers();
            }
            StateOp::PopLayer => {
                self.layer_stack.pop();
                self.sync_layers();
            }
            StateOp::SetPaint(id) => self.state.paint = Some(*id),
            StateOp::SetStroke(style) => self.state.stroke = Some(style.clone()),
            StateOp::SetFillRule(rule) => self.state.fill_rule = *rule,
        }

        self.ops.push(ImagingOp::State(op.clone()));
        self.events.push(Event::State {
            op,
            state: self.state.clone(),
        });
    }

    fn draw(&mut self, op: DrawOp) {
        self.ops.push(ImagingOp::Draw(op.clone()));
        self.events.push(Event::Draw {
            op,
            state: self.state.clone(),
        });
    }
}

impl RefBackend {
    fn sync_layers(&mut self) {
        self.state.layer_stack_depth = next_id(&self.layer_stack);
        self.state.layer_top = self.layer_stack.last().cloned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use peniko::{Brush, Color};
    use whitebox_imaging::{
        ImageAlphaType, ImageFormat, ImageSampler, PathCmd, RectF, ImagingBackendExt,
    };

    fn dot() -> PathDesc {
        PathDesc {
            commands: vec![PathCmd::MoveTo { x: 0.0, y: 0.0 }].into_boxed_slice(),
        }
    }

    fn one_pixel() -> ImageDesc {
        ImageDesc {
            width: 1,
            height: 1,
            format: ImageFormat::Rgba8,
            alpha_type: ImageAlphaType::Alpha,
        }
    }

    #[test]
    fn basic_state_and_draw() {
        let mut backend = RefBackend::default();

        let paint = backend.create_paint(PaintDesc {
            brush: Brush::Solid(Color::WHITE),
        });
        let path = backend.create_path(dot());

        backend.state(StateOp::SetPaint(paint));
        backend.draw(DrawOp::FillPath(path));

        assert_eq!(backend.events().len(), 2);
        assert_eq!(backend.ops().len(), 2);
        assert_eq!(backend.draws().count(), 1);
        assert_eq!(backend.current_state().paint, Some(paint));
    }

    #[test]
    fn image_pixels_are_kept() {
        let mut backend = RefBackend::default();
        let img = backend.create_image(one_pixel(), &[1_u8, 2, 3, 4]);
        backend.draw(DrawOp::DrawImageRect {
            image: img,
            dst: RectF::new(0.0, 0.0, 10.0, 10.0),
            sampler: ImageSampler::default(),
        });

        let (desc, px) = backend.image(img).expect("image is live");
        assert_eq!(desc.width, 1);
        assert_eq!(px, &[1, 2, 3, 4]);
    }

    #[test]
    fn clip_layer_is_visible_to_draws() {
        let mut backend = RefBackend::default();
        let path = backend.create_path(dot());
        let clip = RectF::new(0.0, 0.0, 5.0, 5.0);

        backend.with_clip_rect(clip, |b| b.draw(DrawOp::StrokePath(path)));

        let Event::Draw { state, .. } = &backend.events()[1] else {
            panic!("expected a draw event");
        };
        assert_eq!(state.layer_stack_depth, 1);
        assert_eq!(state.layer_top.as_ref().and_then(|l| l.clip), Some(clip));
        assert_eq!(backend.current_state().layer_stack_depth, 0);
    }

    #[test]
    fn clear_events_keeps_resources_usable() {
        let mut backend = RefBackend::default();

        let paint = backend.create_paint(PaintDesc {
            brush: Brush::Solid(Color::WHITE),
        });
        let path = backend.create_path(dot());

        backend.state(StateOp::SetPaint(paint));
        backend.draw(DrawOp::FillPath(path));
        backend.clear_events();
        assert!(backend.events().is_empty());
        assert!(backend.ops().is_empty());

        backend.state(StateOp::SetPaint(paint));
        backend.draw(DrawOp::FillPath(path));
        assert_eq!(backend.events().len(), 2);
        assert!(backend.path(path).is_some());
    }

    #[test]
    fn resource_destroy_is_tolerant() {
        let mut backend = RefBackend::default();

        let path = backend.create_path(dot());
        let img = backend.create_image(one_pixel(), &[0_u8, 0, 0, 0]);
        let paint = backend.create_paint(PaintDesc {
            brush: Brush::Solid(Color::WHITE),
        });
        assert_eq!(
            (backend.live_paths(), backend.live_images(), backend.live_paints()),
            (1, 1, 1)
        );

        backend.destroy_path(path);
        backend.destroy_image(img);
        backend.destroy_paint(paint);

        // Double-destroy should not panic.
        backend.destroy_path(path);
        backend.destroy_image(img);
        backend.destroy_paint(paint);

        assert_eq!(
            (backend.live_paths(), backend.live_images(), backend.live_paints()),
            (0, 0, 0)
        );
        assert!(backend.paint(paint).is_none());
    }
}
