// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect};

/// Axis-aligned rectangle in world coordinates.
///
/// The constructor normalizes its corners, so for any non-null box
/// `min_x <= max_x` and `min_y <= max_y`. Use [`BoundingBox::NULL`] for the
/// empty box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl BoundingBox {
    /// The empty box: `min = +inf`, `max = -inf`.
    ///
    /// It never intersects anything and is the identity for [`BoundingBox::union`].
    pub const NULL: Self = Self {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

    /// Creates a box from two opposite corners given in any order.
    #[must_use]
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min_x: x0.min(x1),
            min_y: y0.min(y1),
            max_x: x0.max(x1),
            max_y: y0.max(y1),
        }
    }

    /// Creates a box spanning two points.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(a.x, a.y, b.x, b.y)
    }

    /// Returns the smallest box containing every point, or [`BoundingBox::NULL`] for none.
    pub fn from_points(points: impl IntoIterator<Item = Point>) -> Self {
        points.into_iter().fold(Self::NULL, |acc, p| Self {
            min_x: acc.min_x.min(p.x),
            min_y: acc.min_y.min(p.y),
            max_x: acc.max_x.max(p.x),
            max_y: acc.max_y.max(p.y),
        })
    }

    /// Creates a box from a `kurbo` rectangle.
    #[must_use]
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.x1, rect.y1)
    }

    /// Converts to a `kurbo` rectangle (`x0/y0` = min, `x1/y1` = max).
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }

    /// Returns the minimum X coordinate (west edge for east-positive data).
    #[must_use]
    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    /// Returns the minimum Y coordinate (south edge for north-positive data).
    #[must_use]
    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    /// Returns the maximum X coordinate.
    #[must_use]
    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Returns the maximum Y coordinate.
    #[must_use]
    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Returns `true` for an empty box (including [`BoundingBox::NULL`]).
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Returns the X range, or `0.0` for a null box.
    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_null() {
            0.0
        } else {
            self.max_x - self.min_x
        }
    }

    /// Returns the Y range, or `0.0` for a null box.
    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_null() {
            0.0
        } else {
            self.max_y - self.min_y
        }
    }

    /// Returns the smaller of width and height.
    #[must_use]
    pub fn min_extent(&self) -> f64 {
        self.width().min(self.height())
    }

    /// Returns the larger of width and height.
    ///
    /// Cartographic generalization compares this against the minimum
    /// distinguishable length of the current view.
    #[must_use]
    pub fn max_extent(&self) -> f64 {
        self.width().max(self.height())
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) * 0.5,
            (self.min_y + self.max_y) * 0.5,
        )
    }

    /// Returns `true` if the two boxes overlap on both axes.
    ///
    /// Boxes that only share an edge or corner count as intersecting. A null
    /// box intersects nothing.
    #[must_use]
    pub fn does_intersect(&self, other: &Self) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Returns the overlap of the two boxes.
    ///
    /// When [`BoundingBox::does_intersect`] is `false` the result is
    /// [`BoundingBox::NULL`].
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        if !self.does_intersect(other) {
            return Self::NULL;
        }
        Self {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }

    /// Returns the smallest box containing both boxes.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        if self.is_null() {
            return *other;
        }
        if other.is_null() {
            return *self;
        }
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Returns `true` if the point lies inside or on the boundary.
    #[must_use]
    pub fn contains_point(&self, pt: Point) -> bool {
        pt.x >= self.min_x && pt.x <= self.max_x && pt.y >= self.min_y && pt.y <= self.max_y
    }

    /// Returns `true` if `other` lies entirely within this box.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        !self.is_null()
            && !other.is_null()
            && other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Returns the box moved by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Returns the box grown by `dx` on the left and right and `dy` on the
    /// top and bottom. Negative values shrink it.
    ///
    /// Shrinking past the center collapses the box to its center line rather
    /// than inverting it.
    #[must_use]
    pub fn inflate(&self, dx: f64, dy: f64) -> Self {
        let c = self.center();
        Self {
            min_x: (self.min_x - dx).min(c.x),
            min_y: (self.min_y - dy).min(c.y),
            max_x: (self.max_x + dx).max(c.x),
            max_y: (self.max_y + dy).max(c.y),
        }
    }

    /// Returns a box of the same size centered on `center`.
    #[must_use]
    pub fn centered_on(&self, center: Point) -> Self {
        let hw = self.width() * 0.5;
        let hh = self.height() * 0.5;
        Self {
            min_x: center.x - hw,
            min_y: center.y - hh,
            max_x: center.x + hw,
            max_y: center.y + hh,
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::NULL
    }
}

impl From<Rect> for BoundingBox {
    fn from(rect: Rect) -> Self {
        Self::from_rect(rect)
    }
}

impl From<BoundingBox> for Rect {
    fn from(bb: BoundingBox) -> Self {
        bb.to_rect()
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect};

    use super::BoundingBox;

    #[test]
    fn new_normalizes_corners() {
        let bb = BoundingBox::new(10.0, 50.0, -10.0, 20.0);
        assert_eq!(bb.min_x(), -10.0);
        assert_eq!(bb.max_x(), 10.0);
        assert_eq!(bb.min_y(), 20.0);
        assert_eq!(bb.max_y(), 50.0);
        assert!(!bb.is_null());
    }

    #[test]
    fn null_box_is_empty_and_never_intersects() {
        let null = BoundingBox::default();
        let any = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        assert!(null.is_null());
        assert_eq!(null.width(), 0.0);
        assert!(!null.does_intersect(&any));
        assert!(!any.does_intersect(&null));
        assert!(!null.contains_point(Point::ZERO));
    }

    #[test]
    fn does_intersect_is_symmetric() {
        let boxes = [
            BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            BoundingBox::new(5.0, 5.0, 15.0, 15.0),
            BoundingBox::new(10.0, 0.0, 20.0, 10.0),
            BoundingBox::new(30.0, 30.0, 40.0, 40.0),
            BoundingBox::new(-5.0, 2.0, 25.0, 3.0),
            BoundingBox::NULL,
        ];
        for a in &boxes {
            for b in &boxes {
                assert_eq!(a.does_intersect(b), b.does_intersect(a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn intersect_is_commutative_on_overlap() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(5.0, -5.0, 15.0, 7.0);
        assert_eq!(a.intersect(&b), b.intersect(&a));
        assert_eq!(a.intersect(&b), BoundingBox::new(5.0, 0.0, 10.0, 7.0));
    }

    #[test]
    fn touching_edges_intersect_in_a_line() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        assert!(a.does_intersect(&b));
        let i = a.intersect(&b);
        assert_eq!(i.width(), 0.0);
        assert_eq!(i.height(), 10.0);
    }

    #[test]
    fn disjoint_intersect_is_null() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(2.0, 2.0, 3.0, 3.0);
        assert!(a.intersect(&b).is_null());
    }

    #[test]
    fn union_with_null_is_identity() {
        let a = BoundingBox::new(-1.0, -2.0, 3.0, 4.0);
        assert_eq!(a.union(&BoundingBox::NULL), a);
        assert_eq!(BoundingBox::NULL.union(&a), a);
    }

    #[test]
    fn containment() {
        let outer = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        let inner = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
        assert!(outer.contains(&outer));
        assert!(outer.contains_point(Point::new(100.0, 0.0)));
        assert!(!outer.contains_point(Point::new(100.1, 0.0)));
    }

    #[test]
    fn from_points_and_rect_conversions() {
        let bb = BoundingBox::from_points([
            Point::new(3.0, -1.0),
            Point::new(-2.0, 4.0),
            Point::new(0.0, 0.0),
        ]);
        assert_eq!(bb, BoundingBox::new(-2.0, -1.0, 3.0, 4.0));
        assert!(BoundingBox::from_points([]).is_null());

        let rect: Rect = bb.into();
        assert_eq!(BoundingBox::from(rect), bb);
    }

    #[test]
    fn inflate_and_translate() {
        let bb = BoundingBox::new(0.0, 0.0, 10.0, 20.0);
        let grown = bb.inflate(1.0, 2.0);
        assert_eq!(grown, BoundingBox::new(-1.0, -2.0, 11.0, 22.0));
        let shrunk = bb.inflate(-1.0, -2.0);
        assert_eq!(shrunk, BoundingBox::new(1.0, 2.0, 9.0, 18.0));
        let collapsed = bb.inflate(-100.0, 0.0);
        assert_eq!(collapsed.width(), 0.0);
        assert_eq!(collapsed.center(), bb.center());

        let moved = bb.translate(5.0, -5.0);
        assert_eq!(moved, BoundingBox::new(5.0, -5.0, 15.0, 15.0));
    }

    #[test]
    fn centered_on_keeps_size() {
        let bb = BoundingBox::new(0.0, 0.0, 10.0, 4.0);
        let c = bb.centered_on(Point::new(100.0, 100.0));
        assert!((c.width() - 10.0).abs() < 1e-12);
        assert!((c.height() - 4.0).abs() < 1e-12);
        assert_eq!(c.center(), Point::new(100.0, 100.0));
        assert_eq!(bb.max_extent(), 10.0);
        assert_eq!(bb.min_extent(), 4.0);
    }
}
