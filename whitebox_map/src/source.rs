// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data sources behind map layers.
//!
//! Layers never parse files. They read through these traits, which typed
//! readers (raster headers, shapefiles with their attribute tables, LAS
//! files) implement. [`crate::memory`] has in-memory implementations.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::{self, Debug};

use kurbo::Point;
use serde::{Deserialize, Serialize};
use whitebox_extent::{BoundingBox, Orientation};
use whitebox_view::GridShape;

use crate::{MapError, Result};

/// How raster values are turned into colours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataScale {
    /// Values are stretched across the palette between display min and max.
    #[default]
    Continuous,
    /// Integer classes index the palette cyclically.
    Categorical,
    /// Positive values take the last entry, everything else the first.
    Boolean,
    /// Values are packed `A<<24 | B<<16 | G<<8 | R` colours.
    Rgb,
}

/// Read access to a raster grid, with optional single-cell writes.
pub trait RasterSource: Debug + Send {
    /// File reference the source was opened from.
    fn file_reference(&self) -> &str;

    /// Number of rows.
    fn rows(&self) -> usize;

    /// Number of columns.
    fn columns(&self) -> usize;

    /// Full world extent.
    fn extent(&self) -> BoundingBox;

    /// Axis direction of the stored edges.
    fn orientation(&self) -> Orientation {
        Orientation::default()
    }

    /// Marker value for missing cells.
    fn no_data(&self) -> f64;

    /// Colouring scale declared by the source.
    fn data_scale(&self) -> DataScale;

    /// Smallest valid value.
    fn minimum(&self) -> f64;

    /// Largest valid value.
    fn maximum(&self) -> f64;

    /// Suggested lower display bound.
    fn display_minimum(&self) -> f64 {
        self.minimum()
    }

    /// Suggested upper display bound.
    fn display_maximum(&self) -> f64 {
        self.maximum()
    }

    /// Palette the source was last displayed with, if recorded.
    fn preferred_palette(&self) -> Option<&str> {
        None
    }

    /// Values of one row, west to east. Out-of-range rows are empty.
    fn row_values(&self, row: usize) -> Cow<'_, [f64]>;

    /// Value of one cell; [`RasterSource::no_data`] when out of range.
    fn value(&self, row: usize, column: usize) -> f64 {
        self.row_values(row)
            .get(column)
            .copied()
            .unwrap_or_else(|| self.no_data())
    }

    /// Writes one cell.
    ///
    /// The default refuses with [`MapError::ReadOnlySource`].
    fn set_value(&mut self, row: usize, column: usize, z: f64) -> Result<()> {
        let _ = (row, column, z);
        Err(MapError::ReadOnlySource(self.file_reference().into()))
    }

    /// Grid shape over the full extent.
    fn grid_shape(&self) -> GridShape {
        GridShape::new(self.rows(), self.columns(), self.extent())
    }

    /// Width of one cell in world units.
    fn cell_size_x(&self) -> f64 {
        self.grid_shape().cell_size_x()
    }

    /// Height of one cell in world units.
    fn cell_size_y(&self) -> f64 {
        self.grid_shape().cell_size_y()
    }
}

/// Geometry kind of a vector layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    /// Empty record.
    Null,
    /// Single point.
    Point,
    /// One or more lines.
    PolyLine,
    /// One or more rings.
    Polygon,
    /// Set of points.
    MultiPoint,
    /// Point with Z.
    PointZ,
    /// Lines with Z.
    PolyLineZ,
    /// Rings with Z.
    PolygonZ,
    /// Points with Z.
    MultiPointZ,
    /// Point with measure.
    PointM,
    /// Lines with measure.
    PolyLineM,
    /// Rings with measure.
    PolygonM,
    /// Points with measure.
    MultiPointM,
    /// Surface patches.
    MultiPatch,
}

impl ShapeType {
    /// Collapses the Z and M variants onto their 2D counterparts.
    #[must_use]
    pub fn base(self) -> Self {
        match self {
            Self::PointZ | Self::PointM => Self::Point,
            Self::PolyLineZ | Self::PolyLineM => Self::PolyLine,
            Self::PolygonZ | Self::PolygonM => Self::Polygon,
            Self::MultiPointZ | Self::MultiPointM => Self::MultiPoint,
            other => other,
        }
    }

    /// Returns `true` for point and multipoint kinds.
    #[must_use]
    pub fn is_point_like(self) -> bool {
        matches!(self.base(), Self::Point | Self::MultiPoint)
    }
}

/// Points of one record split into parts.
///
/// `parts` holds the index of the first point of each part; the last part
/// runs to the end of `points`.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    /// Kind of this record; [`ShapeType::Null`] for empty records.
    pub shape_type: ShapeType,
    /// Start index of each part.
    pub parts: Vec<usize>,
    /// All points of all parts.
    pub points: Vec<Point>,
}

impl Geometry {
    /// An empty record.
    #[must_use]
    pub fn null() -> Self {
        Self {
            shape_type: ShapeType::Null,
            parts: Vec::new(),
            points: Vec::new(),
        }
    }

    /// A single point.
    #[must_use]
    pub fn point(p: Point) -> Self {
        Self {
            shape_type: ShapeType::Point,
            parts: alloc::vec![0],
            points: alloc::vec![p],
        }
    }

    /// A multi-part record from a list of parts.
    pub fn from_parts<I, P>(shape_type: ShapeType, parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: IntoIterator<Item = Point>,
    {
        let mut starts = Vec::new();
        let mut points = Vec::new();
        for part in parts {
            starts.push(points.len());
            points.extend(part);
        }
        Self {
            shape_type,
            parts: starts,
            points,
        }
    }

    /// Returns `true` for empty records.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.shape_type == ShapeType::Null || self.points.is_empty()
    }

    /// Iterates the parts as point slices.
    pub fn part_slices(&self) -> impl Iterator<Item = &[Point]> + '_ {
        let n = self.parts.len();
        (0..n).map(move |i| {
            let start = self.parts[i].min(self.points.len());
            let end = if i + 1 < n {
                self.parts[i + 1].clamp(start, self.points.len())
            } else {
                self.points.len()
            };
            &self.points[start..end]
        })
    }

    /// Bounding box of all points.
    #[must_use]
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(self.points.iter().copied())
    }
}

/// One vector record.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeRecord {
    /// Zero-based record number.
    pub record_number: usize,
    /// Record geometry.
    pub geometry: Geometry,
}

/// Attribute column type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Integer or floating point.
    Numeric,
    /// Character data.
    Text,
    /// Logical.
    Boolean,
    /// Calendar date.
    Date,
}

/// A single attribute cell.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// Missing value.
    Null,
    /// Number.
    Number(f64),
    /// Text, also used for dates in `YYYYMMDD` form.
    Text(String),
    /// Logical value.
    Bool(bool),
}

impl AttributeValue {
    /// Returns `true` for [`AttributeValue::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Total order used to rank attribute values.
    ///
    /// Nulls sort first, then booleans, numbers and text.
    #[must_use]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        fn class(v: &AttributeValue) -> u8 {
            match v {
                AttributeValue::Null => 0,
                AttributeValue::Bool(_) => 1,
                AttributeValue::Number(_) => 2,
                AttributeValue::Text(_) => 3,
            }
        }
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => class(self).cmp(&class(other)),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Read access to a vector file and its attribute table.
pub trait VectorSource: Debug + Send {
    /// File reference the source was opened from.
    fn file_reference(&self) -> &str;

    /// Declared shape type of the file.
    fn shape_type(&self) -> ShapeType;

    /// Extent of all records.
    fn extent(&self) -> BoundingBox;

    /// All records in file order.
    fn records(&self) -> &[ShapeRecord];

    /// Number of records.
    fn record_count(&self) -> usize {
        self.records().len()
    }

    /// Attribute column names.
    fn field_names(&self) -> Vec<String>;

    /// Type of the named column, if it exists.
    fn field_kind(&self, column: &str) -> Option<FieldKind>;

    /// Attribute of one record; [`AttributeValue::Null`] when missing.
    fn attribute(&self, record: usize, column: &str) -> AttributeValue;
}

/// One LAS point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LasPoint {
    /// Easting.
    pub x: f64,
    /// Northing.
    pub y: f64,
    /// Elevation.
    pub z: f64,
    /// Return intensity.
    pub intensity: u16,
    /// ASPRS classification code.
    pub classification: u8,
    /// Scan angle in degrees.
    pub scan_angle: i8,
    /// GPS time stamp.
    pub gps_time: f64,
    /// Point is flagged as withheld and must not be displayed.
    pub withheld: bool,
}

/// Read access to a point cloud.
pub trait PointCloudSource: Debug + Send {
    /// File reference the source was opened from.
    fn file_reference(&self) -> &str;

    /// All points in file order.
    fn points(&self) -> &[LasPoint];

    /// XY extent.
    fn extent(&self) -> BoundingBox {
        BoundingBox::from_points(self.points().iter().map(|p| Point::new(p.x, p.y)))
    }

    /// Elevation range as `(min, max)`.
    fn z_range(&self) -> (f64, f64) {
        self.points()
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.z), hi.max(p.z))
            })
    }

    /// Number of points.
    fn point_count(&self) -> usize {
        self.points().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn parts_split_on_start_indices() {
        let g = Geometry::from_parts(
            ShapeType::Polygon,
            [
                vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)],
                vec![Point::new(5.0, 5.0), Point::new(6.0, 5.0)],
            ],
        );
        assert_eq!(g.parts, vec![0, 3]);
        let parts: Vec<_> = g.part_slices().map(<[Point]>::len).collect();
        assert_eq!(parts, vec![3, 2]);
        assert_eq!(g.bounding_box(), BoundingBox::new(0.0, 0.0, 6.0, 5.0));
    }

    #[test]
    fn z_and_m_collapse_to_base() {
        assert_eq!(ShapeType::PolygonZ.base(), ShapeType::Polygon);
        assert_eq!(ShapeType::PolyLineM.base(), ShapeType::PolyLine);
        assert!(ShapeType::MultiPointZ.is_point_like());
        assert!(!ShapeType::MultiPatch.is_point_like());
    }

    #[test]
    fn null_ranks_first() {
        let mut v = vec![
            AttributeValue::Text("b".into()),
            AttributeValue::Number(2.0),
            AttributeValue::Null,
            AttributeValue::Number(-1.0),
        ];
        v.sort_by(AttributeValue::rank_cmp);
        assert!(v[0].is_null());
        assert_eq!(v[1].as_number(), Some(-1.0));
        assert_eq!(alloc::format!("{}", v[3]), "b");
    }
}
