// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device position → raster cell lookup and status readouts.

use alloc::string::String;
use core::fmt;

use kurbo::Point;
use whitebox_view::ViewportTransform;

use crate::model::MapModel;
use crate::stats::truncate_signed;

/// A raster cell found by a hit test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCell {
    /// Source row, or -1 when no raster contains the point.
    pub row: isize,
    /// Source column, or -1 when no raster contains the point.
    pub column: isize,
    /// Value read from the layer's sampled image; NaN when the cell is not
    /// part of it.
    pub z: f64,
    /// No-data marker of the layer.
    pub no_data: f64,
    /// Overlay number of the layer the cell belongs to.
    pub overlay: Option<usize>,
    /// Values are packed RGB colours.
    pub is_rgb: bool,
}

impl GridCell {
    /// Result of a hit test that found no raster.
    pub const NONE: Self = Self {
        row: -1,
        column: -1,
        z: f64::NAN,
        no_data: f64::NAN,
        overlay: None,
        is_rgb: false,
    };

    /// Returns `true` if no raster contains the point.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.row < 0
    }

    /// Returns `true` if the value equals the layer's no-data marker.
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        self.z == self.no_data
    }

    /// Readout of the value for a status line.
    #[must_use]
    pub fn readout(&self) -> CellReadout {
        if self.is_none() {
            CellReadout::OutsideRasters
        } else if self.z.is_nan() {
            CellReadout::NotAvailable
        } else if self.is_no_data() {
            CellReadout::NoData
        } else if self.is_rgb {
            let [r, g, b, a, ..] = truncate_signed(self.z).to_le_bytes();
            CellReadout::Rgba { r, g, b, a }
        } else {
            CellReadout::Value(self.z)
        }
    }
}

impl Default for GridCell {
    fn default() -> Self {
        Self::NONE
    }
}

/// What a hit-tested cell shows in the status line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellReadout {
    /// A valid value.
    Value(f64),
    /// A packed colour split into channels.
    Rgba {
        /// Red.
        r: u8,
        /// Green.
        g: u8,
        /// Blue.
        b: u8,
        /// Alpha.
        a: u8,
    },
    /// The cell holds the no-data marker.
    NoData,
    /// The cell is inside a raster but outside its sampled image.
    NotAvailable,
    /// No raster contains the point.
    OutsideRasters,
}

impl fmt::Display for CellReadout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.write_str(&format_grouped(*v, 4, true)),
            Self::Rgba { r, g, b, a } => {
                write!(f, "R: {r}  G: {g}  B: {b}")?;
                if *a != u8::MAX {
                    write!(f, "  A: {a}")?;
                }
                Ok(())
            }
            Self::NoData => f.write_str("NoData"),
            Self::NotAvailable => f.write_str("Not Available"),
            Self::OutsideRasters => Ok(()),
        }
    }
}

/// Formats `v` with comma thousands separators and `decimals` fraction
/// digits.
///
/// With `trim` set, trailing zeros of the fraction are dropped, so
/// `format_grouped(1234.5, 4, true)` is `"1,234.5"` and
/// `format_grouped(1234.0, 1, false)` is `"1,234.0"`.
#[must_use]
pub fn format_grouped(v: f64, decimals: usize, trim: bool) -> String {
    let text = alloc::format!("{:.*}", decimals, v.abs());
    let (int, frac) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac = if trim { frac.trim_end_matches('0') } else { frac };

    let mut out = String::with_capacity(text.len() + int.len() / 3 + 1);
    if v < 0.0 && (int.bytes().any(|b| b != b'0') || frac.bytes().any(|b| b != b'0')) {
        out.push('-');
    }
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Resolves device positions against a model and the viewport it was drawn
/// with.
#[derive(Clone, Copy, Debug)]
pub struct HitTester<'a> {
    model: &'a MapModel,
    viewport: &'a ViewportTransform,
}

impl<'a> HitTester<'a> {
    /// Creates a hit tester for one drawn frame.
    #[must_use]
    pub fn new(model: &'a MapModel, viewport: &'a ViewportTransform) -> Self {
        Self { model, viewport }
    }

    /// World position under a device position.
    #[must_use]
    pub fn world_point(&self, device: Point) -> Point {
        self.viewport.device_to_world_point(device)
    }

    /// Raster cell under a device position.
    #[must_use]
    pub fn cell_at(&self, device: Point) -> GridCell {
        let world = self.world_point(device);
        self.model.row_and_column(world.x, world.y)
    }

    /// Status readout under a device position.
    #[must_use]
    pub fn readout_at(&self, device: Point) -> CellReadout {
        self.cell_at(device).readout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn cell(z: f64) -> GridCell {
        GridCell {
            row: 3,
            column: 4,
            z,
            no_data: -32768.0,
            overlay: Some(0),
            is_rgb: false,
        }
    }

    #[test]
    fn readouts_cover_every_case() {
        assert_eq!(GridCell::NONE.readout(), CellReadout::OutsideRasters);
        assert_eq!(cell(f64::NAN).readout(), CellReadout::NotAvailable);
        assert_eq!(cell(-32768.0).readout(), CellReadout::NoData);
        assert_eq!(cell(12.5).readout(), CellReadout::Value(12.5));
        let rgb = GridCell {
            is_rgb: true,
            ..cell(f64::from(0xFF03_0201_u32))
        };
        assert_eq!(
            rgb.readout(),
            CellReadout::Rgba {
                r: 1,
                g: 2,
                b: 3,
                a: 255
            }
        );
    }

    #[test]
    fn readout_text() {
        assert_eq!(CellReadout::NoData.to_string(), "NoData");
        assert_eq!(CellReadout::NotAvailable.to_string(), "Not Available");
        assert_eq!(CellReadout::OutsideRasters.to_string(), "");
        assert_eq!(
            CellReadout::Rgba {
                r: 1,
                g: 2,
                b: 3,
                a: 255
            }
            .to_string(),
            "R: 1  G: 2  B: 3"
        );
        assert_eq!(
            CellReadout::Rgba {
                r: 1,
                g: 2,
                b: 3,
                a: 7
            }
            .to_string(),
            "R: 1  G: 2  B: 3  A: 7"
        );
    }

    #[test]
    fn values_group_thousands() {
        assert_eq!(CellReadout::Value(1_234_567.891_23).to_string(), "1,234,567.8912");
        assert_eq!(CellReadout::Value(-42.5).to_string(), "-42.5");
        assert_eq!(CellReadout::Value(100.0).to_string(), "100");
        assert_eq!(CellReadout::Value(0.0).to_string(), "0");
    }

    #[test]
    fn fixed_decimals_keep_zeros() {
        assert_eq!(format_grouped(1234.0, 1, false), "1,234.0");
        assert_eq!(format_grouped(-0.04, 1, false), "0.0");
        assert_eq!(format_grouped(-987_654.31, 1, false), "-987,654.3");
        assert_eq!(format_grouped(12.0, 0, false), "12");
    }
}
