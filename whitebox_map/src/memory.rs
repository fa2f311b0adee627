// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory data sources.
//!
//! Useful for tests, demos and tools that compute a grid without a file
//! behind it.

use alloc::borrow::Cow;
use alloc::string::String;
use alloc::vec::Vec;

use whitebox_extent::{BoundingBox, Orientation};

use crate::source::{
    AttributeValue, DataScale, FieldKind, LasPoint, PointCloudSource, RasterSource, ShapeRecord,
    ShapeType, VectorSource,
};
use crate::{MapError, Result};

/// Row-major raster held in memory.
#[derive(Clone, Debug)]
pub struct MemoryRaster {
    file_reference: String,
    rows: usize,
    columns: usize,
    extent: BoundingBox,
    orientation: Orientation,
    no_data: f64,
    data_scale: DataScale,
    display_range: Option<(f64, f64)>,
    palette: Option<String>,
    writable: bool,
    values: Vec<f64>,
}

impl MemoryRaster {
    /// Creates a raster filled with `fill`.
    #[must_use]
    pub fn new(
        file_reference: impl Into<String>,
        rows: usize,
        columns: usize,
        extent: BoundingBox,
        fill: f64,
    ) -> Self {
        Self {
            file_reference: file_reference.into(),
            rows,
            columns,
            extent,
            orientation: Orientation::default(),
            no_data: -32768.0,
            data_scale: DataScale::Continuous,
            display_range: None,
            palette: None,
            writable: true,
            values: alloc::vec![fill; rows * columns],
        }
    }

    /// Creates a raster from a function of `(row, column)`.
    #[must_use]
    pub fn from_fn(
        file_reference: impl Into<String>,
        rows: usize,
        columns: usize,
        extent: BoundingBox,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Self {
        let mut r = Self::new(file_reference, rows, columns, extent, 0.0);
        for row in 0..rows {
            for col in 0..columns {
                r.values[row * columns + col] = f(row, col);
            }
        }
        r
    }

    /// Sets the no-data marker.
    #[must_use]
    pub fn with_no_data(mut self, no_data: f64) -> Self {
        self.no_data = no_data;
        self
    }

    /// Sets the data scale.
    #[must_use]
    pub fn with_data_scale(mut self, scale: DataScale) -> Self {
        self.data_scale = scale;
        self
    }

    /// Sets the header display range.
    #[must_use]
    pub fn with_display_range(mut self, min: f64, max: f64) -> Self {
        self.display_range = Some((min, max));
        self
    }

    /// Sets the preferred palette.
    #[must_use]
    pub fn with_palette(mut self, palette: impl Into<String>) -> Self {
        self.palette = Some(palette.into());
        self
    }

    /// Sets the stored edge orientation.
    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Makes single-cell writes fail.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.values
            .iter()
            .copied()
            .filter(move |v| *v != self.no_data && !v.is_nan())
    }
}

impl RasterSource for MemoryRaster {
    fn file_reference(&self) -> &str {
        &self.file_reference
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn extent(&self) -> BoundingBox {
        self.extent
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }

    fn no_data(&self) -> f64 {
        self.no_data
    }

    fn data_scale(&self) -> DataScale {
        self.data_scale
    }

    fn minimum(&self) -> f64 {
        self.valid_values().fold(f64::INFINITY, f64::min)
    }

    fn maximum(&self) -> f64 {
        self.valid_values().fold(f64::NEG_INFINITY, f64::max)
    }

    fn display_minimum(&self) -> f64 {
        self.display_range.map_or_else(|| self.minimum(), |r| r.0)
    }

    fn display_maximum(&self) -> f64 {
        self.display_range.map_or_else(|| self.maximum(), |r| r.1)
    }

    fn preferred_palette(&self) -> Option<&str> {
        self.palette.as_deref()
    }

    fn row_values(&self, row: usize) -> Cow<'_, [f64]> {
        if row >= self.rows {
            return Cow::Borrowed(&[]);
        }
        let start = row * self.columns;
        Cow::Borrowed(&self.values[start..start + self.columns])
    }

    fn set_value(&mut self, row: usize, column: usize, z: f64) -> Result<()> {
        if !self.writable {
            return Err(MapError::ReadOnlySource(self.file_reference.clone()));
        }
        if row >= self.rows || column >= self.columns {
            return Err(MapError::CellOutOfRange {
                row: isize::try_from(row).unwrap_or(isize::MAX),
                column: isize::try_from(column).unwrap_or(isize::MAX),
            });
        }
        self.values[row * self.columns + column] = z;
        Ok(())
    }
}

#[derive(Clone, Debug)]
struct Field {
    name: String,
    kind: FieldKind,
    values: Vec<AttributeValue>,
}

/// Vector records with an attribute table, held in memory.
#[derive(Clone, Debug)]
pub struct MemoryVector {
    file_reference: String,
    shape_type: ShapeType,
    records: Vec<ShapeRecord>,
    fields: Vec<Field>,
}

impl MemoryVector {
    /// Creates an empty layer of `shape_type`.
    #[must_use]
    pub fn new(file_reference: impl Into<String>, shape_type: ShapeType) -> Self {
        Self {
            file_reference: file_reference.into(),
            shape_type,
            records: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Appends a record and returns its number.
    pub fn push(&mut self, geometry: crate::Geometry) -> usize {
        let record_number = self.records.len();
        self.records.push(ShapeRecord {
            record_number,
            geometry,
        });
        record_number
    }

    /// Adds an attribute column. Missing values are null.
    #[must_use]
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        values: Vec<AttributeValue>,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
            values,
        });
        self
    }
}

impl VectorSource for MemoryVector {
    fn file_reference(&self) -> &str {
        &self.file_reference
    }

    fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    fn extent(&self) -> BoundingBox {
        self.records
            .iter()
            .fold(BoundingBox::NULL, |acc, r| acc.union(&r.geometry.bounding_box()))
    }

    fn records(&self) -> &[ShapeRecord] {
        &self.records
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    fn field_kind(&self, column: &str) -> Option<FieldKind> {
        self.fields.iter().find(|f| f.name == column).map(|f| f.kind)
    }

    fn attribute(&self, record: usize, column: &str) -> AttributeValue {
        self.fields
            .iter()
            .find(|f| f.name == column)
            .and_then(|f| f.values.get(record))
            .cloned()
            .unwrap_or(AttributeValue::Null)
    }
}

/// Point cloud held in memory.
#[derive(Clone, Debug)]
pub struct MemoryPointCloud {
    file_reference: String,
    points: Vec<LasPoint>,
}

impl MemoryPointCloud {
    /// Wraps a list of points.
    #[must_use]
    pub fn new(file_reference: impl Into<String>, points: Vec<LasPoint>) -> Self {
        Self {
            file_reference: file_reference.into(),
            points,
        }
    }
}

impl PointCloudSource for MemoryPointCloud {
    fn file_reference(&self) -> &str {
        &self.file_reference
    }

    fn points(&self) -> &[LasPoint] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Geometry;
    use alloc::vec;
    use kurbo::Point;

    #[test]
    fn raster_reads_and_writes_cells() {
        let mut r = MemoryRaster::from_fn("a.dep", 2, 3, BoundingBox::new(0.0, 0.0, 3.0, 2.0), |r, c| {
            (r * 10 + c) as f64
        });
        assert_eq!(&*r.row_values(1), &[10.0, 11.0, 12.0]);
        assert_eq!(r.value(0, 2), 2.0);
        assert_eq!(r.value(5, 0), -32768.0);
        r.set_value(0, 0, 99.0).unwrap();
        assert_eq!(r.value(0, 0), 99.0);
        assert!(matches!(
            r.set_value(2, 0, 1.0),
            Err(MapError::CellOutOfRange { row: 2, column: 0 })
        ));
        assert_eq!(r.maximum(), 99.0);
        assert!((r.cell_size_x() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn read_only_raster_refuses_writes() {
        let mut r = MemoryRaster::new("b.dep", 1, 1, BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0.0)
            .read_only();
        assert!(matches!(r.set_value(0, 0, 1.0), Err(MapError::ReadOnlySource(_))));
    }

    #[test]
    fn no_data_is_excluded_from_range() {
        let r = MemoryRaster::from_fn("c.dep", 1, 3, BoundingBox::new(0.0, 0.0, 3.0, 1.0), |_, c| {
            [-32768.0, 4.0, 8.0][c]
        });
        assert_eq!(r.minimum(), 4.0);
        assert_eq!(r.display_maximum(), 8.0);
    }

    #[test]
    fn vector_extent_and_attributes() {
        let mut v = MemoryVector::new("pts.shp", ShapeType::Point)
            .with_field("NAME", FieldKind::Text, vec![AttributeValue::Text("a".into())]);
        v.push(Geometry::point(Point::new(1.0, 2.0)));
        v.push(Geometry::point(Point::new(-1.0, 5.0)));
        assert_eq!(v.extent(), BoundingBox::new(-1.0, 2.0, 1.0, 5.0));
        assert_eq!(v.attribute(0, "NAME"), AttributeValue::Text("a".into()));
        assert!(v.attribute(1, "NAME").is_null());
        assert!(v.attribute(0, "MISSING").is_null());
        assert_eq!(v.field_kind("NAME"), Some(FieldKind::Text));
        assert_eq!(v.record_count(), 2);
    }

    #[test]
    fn point_cloud_ranges() {
        let pc = MemoryPointCloud::new(
            "a.las",
            vec![
                LasPoint {
                    x: 1.0,
                    y: 1.0,
                    z: 10.0,
                    ..LasPoint::default()
                },
                LasPoint {
                    x: 3.0,
                    y: 2.0,
                    z: 4.0,
                    ..LasPoint::default()
                },
            ],
        );
        assert_eq!(pc.extent(), BoundingBox::new(1.0, 1.0, 3.0, 2.0));
        assert_eq!(pc.z_range(), (4.0, 10.0));
    }
}
