// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::BoundingBox;

/// Direction of a data source's axes relative to world coordinates.
///
/// Raster headers store north/south/east/west edges. Most data runs north-up
/// and east-right, but some grids store rows bottom-up or columns right-to-left.
/// The normalized [`BoundingBox`] loses that information, so it is kept here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Orientation {
    /// `true` when the east edge has the larger X coordinate.
    pub increases_eastward: bool,
    /// `true` when the north edge has the larger Y coordinate.
    pub increases_northward: bool,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            increases_eastward: true,
            increases_northward: true,
        }
    }
}

impl Orientation {
    /// Normalizes raw edges into a box, remembering their direction.
    #[must_use]
    pub fn from_edges(north: f64, south: f64, east: f64, west: f64) -> (BoundingBox, Self) {
        let bb = BoundingBox::new(west, south, east, north);
        let orientation = Self {
            increases_eastward: east >= west,
            increases_northward: north >= south,
        };
        (bb, orientation)
    }

    /// Returns the `(north, south, east, west)` edges of `bb` in source order.
    #[must_use]
    pub fn edges(&self, bb: &BoundingBox) -> (f64, f64, f64, f64) {
        let (north, south) = if self.increases_northward {
            (bb.max_y(), bb.min_y())
        } else {
            (bb.min_y(), bb.max_y())
        };
        let (east, west) = if self.increases_eastward {
            (bb.max_x(), bb.min_x())
        } else {
            (bb.min_x(), bb.max_x())
        };
        (north, south, east, west)
    }
}

#[cfg(test)]
mod tests {
    use super::Orientation;

    #[test]
    fn north_up_edges_keep_default_orientation() {
        let (bb, o) = Orientation::from_edges(100.0, 0.0, 50.0, 10.0);
        assert_eq!(o, Orientation::default());
        assert_eq!(bb.min_x(), 10.0);
        assert_eq!(bb.max_y(), 100.0);
    }

    #[test]
    fn reversed_edges_normalize_and_round_trip() {
        let (bb, o) = Orientation::from_edges(0.0, 100.0, 10.0, 50.0);
        assert!(!o.increases_northward);
        assert!(!o.increases_eastward);
        assert!(bb.min_y() <= bb.max_y());
        assert!(bb.min_x() <= bb.max_x());
        assert_eq!(o.edges(&bb), (0.0, 100.0, 10.0, 50.0));
    }
}
