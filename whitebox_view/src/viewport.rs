// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point, Rect, Size};
use whitebox_extent::BoundingBox;

/// Uniform world→device mapping for one repaint.
///
/// `ViewportTransform` fits a requested world extent into a device surface
/// minus a border margin:
/// - The scale is the same on both axes, so the extent is letterboxed
///   rather than stretched.
/// - The visible world rectangle, [`ViewportTransform::map_extent`], is the
///   requested extent widened by the letterbox margins.
/// - World Y grows upward, device Y grows downward.
#[derive(Clone, Copy, Debug)]
pub struct ViewportTransform {
    device_size: Size,
    border: f64,
    current_extent: BoundingBox,
    map_extent: BoundingBox,
    scale: f64,
    world_to_device: Affine,
    device_to_world: Affine,
}

impl ViewportTransform {
    /// Fits `current_extent` into a `device_size` surface inset by `border`
    /// device pixels on every side.
    ///
    /// Returns `None` when there is nothing to map: a null extent, an extent
    /// with no width and no height, or a border that leaves no usable area.
    #[must_use]
    pub fn new(device_size: Size, border: f64, current_extent: BoundingBox) -> Option<Self> {
        let usable_w = device_size.width - 2.0 * border;
        let usable_h = device_size.height - 2.0 * border;
        if usable_w <= 0.0 || usable_h <= 0.0 || current_extent.is_null() {
            return None;
        }

        let x_range = current_extent.width();
        let y_range = current_extent.height();
        let scale = (usable_w / x_range).min(usable_h / y_range);
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }

        // Letterbox offsets of the content inside the usable rect, expressed
        // back in world units.
        let left = border + (usable_w - x_range * scale) / 2.0;
        let top = border + (usable_h - y_range * scale) / 2.0;
        let dx = (left - border) / scale;
        let dy = (top - border) / scale;
        let map_extent = BoundingBox::new(
            current_extent.min_x() - dx,
            current_extent.min_y() - dy,
            current_extent.max_x() + dx,
            current_extent.max_y() + dy,
        );

        let sx = usable_w / map_extent.width();
        let sy = usable_h / map_extent.height();
        let world_to_device = Affine::new([
            sx,
            0.0,
            0.0,
            -sy,
            border - map_extent.min_x() * sx,
            border + map_extent.max_y() * sy,
        ]);

        Some(Self {
            device_size,
            border,
            current_extent,
            map_extent,
            scale,
            world_to_device,
            device_to_world: world_to_device.inverse(),
        })
    }

    /// Returns the device surface size.
    #[must_use]
    pub fn device_size(&self) -> Size {
        self.device_size
    }

    /// Returns the border margin in device pixels.
    #[must_use]
    pub fn border(&self) -> f64 {
        self.border
    }

    /// Returns the extent that was requested.
    #[must_use]
    pub fn current_extent(&self) -> BoundingBox {
        self.current_extent
    }

    /// Returns the world extent that is actually visible inside the border.
    ///
    /// This is at least as large as [`ViewportTransform::current_extent`] and
    /// larger on one axis whenever the aspect ratios differ.
    #[must_use]
    pub fn map_extent(&self) -> BoundingBox {
        self.map_extent
    }

    /// Returns device pixels per world unit.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the device rectangle inside the border.
    #[must_use]
    pub fn usable_rect(&self) -> Rect {
        Rect::new(
            self.border,
            self.border,
            self.device_size.width - self.border,
            self.device_size.height - self.border,
        )
    }

    /// Returns the device rectangle covered by the requested extent.
    #[must_use]
    pub fn content_rect(&self) -> Rect {
        self.world_to_device_rect(&self.current_extent)
    }

    /// Returns the world→device affine transform.
    #[must_use]
    pub fn world_to_device(&self) -> Affine {
        self.world_to_device
    }

    /// Converts a world point into device coordinates.
    #[must_use]
    pub fn world_to_device_point(&self, pt: Point) -> Point {
        self.world_to_device * pt
    }

    /// Converts a device point into world coordinates.
    #[must_use]
    pub fn device_to_world_point(&self, pt: Point) -> Point {
        self.device_to_world * pt
    }

    /// Converts a world box into a device rectangle (`y0` is the top edge).
    #[must_use]
    pub fn world_to_device_rect(&self, bb: &BoundingBox) -> Rect {
        let p0 = self.world_to_device_point(Point::new(bb.min_x(), bb.max_y()));
        let p1 = self.world_to_device_point(Point::new(bb.max_x(), bb.min_y()));
        Rect::from_points(p0, p1)
    }

    /// Converts a device rectangle into a world box.
    #[must_use]
    pub fn device_to_world_rect(&self, rect: Rect) -> BoundingBox {
        let p0 = self.device_to_world_point(Point::new(rect.x0, rect.y0));
        let p1 = self.device_to_world_point(Point::new(rect.x1, rect.y1));
        BoundingBox::from_corners(p0, p1)
    }

    /// Returns the world length that maps to `generalization_level` device pixels.
    ///
    /// Features whose world size does not exceed this are too small to be
    /// told apart on screen.
    #[must_use]
    pub fn min_distinguishable_length(&self, generalization_level: f64) -> f64 {
        generalization_level / self.scale
    }
}
