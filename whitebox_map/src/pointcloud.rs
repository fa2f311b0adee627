// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! LiDAR point cloud layers.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::cache::LayerCache;
use crate::layer::{LayerHeader, title_from_file};
use crate::palette::{
    Argb, GREY_PALETTE, Palette, PaletteProvider, QUALITATIVE_PALETTE, SPECTRUM_PALETTE,
};
use crate::source::{LasPoint, PointCloudSource};
use crate::stats::{Histogram, truncate_index};

/// Point attribute that selects the colour of each point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillCriterion {
    /// Elevation, stretched over the palette.
    #[default]
    Elevation,
    /// Return intensity, stretched over the palette.
    Intensity,
    /// Classification code, used as a cyclic palette index.
    Classification,
    /// Scan angle, stretched over the palette.
    ScanAngle,
    /// GPS time, stretched over the palette.
    GpsTime,
}

impl FillCriterion {
    /// Palette used when a layer switches to this criterion.
    #[must_use]
    pub fn default_palette(self) -> &'static str {
        match self {
            Self::Intensity => GREY_PALETTE,
            Self::Classification => QUALITATIVE_PALETTE,
            Self::Elevation | Self::ScanAngle | Self::GpsTime => SPECTRUM_PALETTE,
        }
    }

    /// The attribute of `point` this criterion reads.
    #[must_use]
    pub fn value(self, point: &LasPoint) -> f64 {
        match self {
            Self::Elevation => point.z,
            Self::Intensity => f64::from(point.intensity),
            Self::Classification => f64::from(point.classification),
            Self::ScanAngle => f64::from(point.scan_angle),
            Self::GpsTime => point.gps_time,
        }
    }
}

/// Display settings of a point cloud layer.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloudStyle {
    /// Attribute driving point colours.
    pub fill_criterion: FillCriterion,
    /// When set, every point takes this colour instead.
    pub single_colour: Option<Argb>,
    /// Criterion value mapped to the first palette entry.
    pub display_min: f64,
    /// Criterion value mapped to the last palette entry.
    pub display_max: f64,
    /// Palette file reference.
    pub palette: String,
    /// Side of the square drawn for each point, in device pixels.
    pub marker_size: f64,
}

impl Default for PointCloudStyle {
    fn default() -> Self {
        Self {
            fill_criterion: FillCriterion::Elevation,
            single_colour: None,
            display_min: 0.0,
            display_max: 0.0,
            palette: String::from(SPECTRUM_PALETTE),
            marker_size: 2.0,
        }
    }
}

/// Display range of `criterion` over the non-withheld points of `source`,
/// ignoring the outer 1% on each side.
///
/// Uses a histogram with one bin per palette entry.
#[must_use]
pub fn auto_display_range(
    source: &dyn PointCloudSource,
    criterion: FillCriterion,
    bins: usize,
) -> (f64, f64) {
    let values = || {
        source
            .points()
            .iter()
            .filter(|p| !p.withheld)
            .map(move |p| criterion.value(p))
    };
    let (min, max) = values().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        return (0.0, 0.0);
    }
    let histogram = Histogram::new(values(), min, max, bins);
    (histogram.lower_tail(1.0), histogram.upper_tail(1.0))
}

/// Colour of one point for `style`, with `palette` already carrying the
/// layer alpha. Withheld points are transparent.
#[must_use]
pub fn point_colour(style: &PointCloudStyle, palette: &Palette, alpha: u8, point: &LasPoint) -> Argb {
    if point.withheld {
        return Argb::TRANSPARENT;
    }
    if let Some(colour) = style.single_colour {
        return colour.with_alpha(alpha);
    }
    let v = style.fill_criterion.value(point);
    if style.fill_criterion == FillCriterion::Classification {
        return palette.entry_wrapping(usize::from(point.classification));
    }
    let range = style.display_max - style.display_min;
    let t = if range > 0.0 {
        ((v - style.display_min) / range).clamp(0.0, 1.0)
    } else {
        0.0
    };
    palette.entry(truncate_index(t * palette.len().saturating_sub(1) as f64))
}

/// A LiDAR point cloud layer.
#[derive(Debug)]
pub struct PointCloudLayer {
    pub(crate) header: LayerHeader,
    source: Box<dyn PointCloudSource>,
    style: PointCloudStyle,
    palette: Palette,
    colours: LayerCache<Vec<Argb>>,
}

impl PointCloudLayer {
    /// Opens a layer coloured by elevation with an automatic display range.
    pub fn new(source: Box<dyn PointCloudSource>, palettes: &dyn PaletteProvider) -> Self {
        let palette = palettes.resolve(SPECTRUM_PALETTE, SPECTRUM_PALETTE);
        let (display_min, display_max) =
            auto_display_range(source.as_ref(), FillCriterion::Elevation, palette.len());
        let style = PointCloudStyle {
            display_min,
            display_max,
            ..PointCloudStyle::default()
        };
        Self::with_style(source, style, palettes)
    }

    /// Opens a layer with an explicit style.
    pub fn with_style(
        source: Box<dyn PointCloudSource>,
        style: PointCloudStyle,
        palettes: &dyn PaletteProvider,
    ) -> Self {
        let header = LayerHeader::new(title_from_file(source.file_reference()), source.extent());
        let palette = palettes.resolve(&style.palette, style.fill_criterion.default_palette());
        Self {
            header,
            source,
            style,
            palette,
            colours: LayerCache::new(),
        }
    }

    /// Shared layer state.
    #[must_use]
    pub fn header(&self) -> &LayerHeader {
        &self.header
    }

    /// Data source.
    #[must_use]
    pub fn source(&self) -> &dyn PointCloudSource {
        self.source.as_ref()
    }

    /// Display settings.
    #[must_use]
    pub fn style(&self) -> &PointCloudStyle {
        &self.style
    }

    /// Palette as resolved, before alpha.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Colours points by `criterion`, switching to its default palette and
    /// recomputing the display range.
    pub fn set_fill_criterion(&mut self, criterion: FillCriterion, palettes: &dyn PaletteProvider) {
        self.style.fill_criterion = criterion;
        self.style.palette = String::from(criterion.default_palette());
        self.palette = palettes.resolve(&self.style.palette, criterion.default_palette());
        self.reset_display_range();
    }

    /// Recomputes the display range from the 1% tails.
    pub fn reset_display_range(&mut self) {
        let (min, max) =
            auto_display_range(self.source.as_ref(), self.style.fill_criterion, self.palette.len());
        self.set_display_range(min, max);
        self.colours.invalidate();
    }

    /// Sets the criterion range stretched over the palette.
    pub fn set_display_range(&mut self, min: f64, max: f64) {
        if self.style.display_min != min || self.style.display_max != max {
            self.style.display_min = min;
            self.style.display_max = max;
            self.colours.invalidate();
        }
    }

    /// Colours every point with one colour, or restores palette colouring.
    pub fn set_single_colour(&mut self, colour: Option<Argb>) {
        if self.style.single_colour != colour {
            self.style.single_colour = colour;
            self.colours.invalidate();
        }
    }

    /// Switches to another palette.
    pub fn set_palette(&mut self, name: impl Into<String>, palettes: &dyn PaletteProvider) {
        self.style.palette = name.into();
        self.palette = palettes.resolve(
            &self.style.palette,
            self.style.fill_criterion.default_palette(),
        );
        self.colours.invalidate();
    }

    /// Sets the marker size in device pixels.
    pub fn set_marker_size(&mut self, size: f64) {
        self.style.marker_size = size;
    }

    /// Colour of every point in file order, recomputed when stale.
    pub fn colours(&mut self) -> &[Argb] {
        let (source, style, palette, header) =
            (self.source.as_ref(), &self.style, &self.palette, &self.header);
        self.colours.get_or_update(|| {
            tracing::trace!(
                layer = %header.title,
                points = source.point_count(),
                "recomputing point colours"
            );
            let palette = palette.with_alpha(header.alpha);
            source
                .points()
                .iter()
                .map(|p| point_colour(style, &palette, header.alpha, p))
                .collect()
        })
    }

    /// Point colours from the last [`PointCloudLayer::colours`] call.
    #[must_use]
    pub fn last_colours(&self) -> Option<&[Argb]> {
        self.colours.get().map(Vec::as_slice)
    }

    pub(crate) fn invalidate(&mut self) {
        self.colours.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryPointCloud;
    use crate::palette::PaletteLibrary;
    use alloc::vec;

    fn point(z: f64, class: u8) -> LasPoint {
        LasPoint {
            x: z,
            y: z,
            z,
            classification: class,
            ..LasPoint::default()
        }
    }

    #[test]
    fn criterion_palettes() {
        assert_eq!(FillCriterion::Elevation.default_palette(), SPECTRUM_PALETTE);
        assert_eq!(FillCriterion::Intensity.default_palette(), GREY_PALETTE);
        assert_eq!(FillCriterion::Classification.default_palette(), QUALITATIVE_PALETTE);
    }

    #[test]
    fn auto_range_drops_outliers_and_withheld() {
        let mut points: Vec<LasPoint> = (0..98).map(|i| point(f64::from(i), 2)).collect();
        points.push(point(-500.0, 2));
        points.push(point(500.0, 2));
        points.push(LasPoint {
            z: 10_000.0,
            withheld: true,
            ..LasPoint::default()
        });
        let pc = MemoryPointCloud::new("a.las", points);
        let (lo, hi) = auto_display_range(&pc, FillCriterion::Elevation, 100);
        // Each outlier is exactly 1% of the 100 usable points.
        assert!((lo + 500.0).abs() < 1e-9);
        assert!((hi - 500.0).abs() < 1e-9);
        let empty = MemoryPointCloud::new("e.las", vec![]);
        assert_eq!(auto_display_range(&empty, FillCriterion::Elevation, 10), (0.0, 0.0));
    }

    #[test]
    fn elevation_stretches_and_class_cycles() {
        let palette = Palette::new(vec![Argb::RED, Argb::WHITE, Argb::BLUE]);
        let style = PointCloudStyle {
            display_min: 0.0,
            display_max: 10.0,
            ..PointCloudStyle::default()
        };
        assert_eq!(point_colour(&style, &palette, 255, &point(0.0, 0)), Argb::RED);
        assert_eq!(point_colour(&style, &palette, 255, &point(5.0, 0)), Argb::WHITE);
        assert_eq!(point_colour(&style, &palette, 255, &point(99.0, 0)), Argb::BLUE);

        let by_class = PointCloudStyle {
            fill_criterion: FillCriterion::Classification,
            ..style.clone()
        };
        assert_eq!(point_colour(&by_class, &palette, 255, &point(0.0, 4)), Argb::WHITE);

        let single = PointCloudStyle {
            single_colour: Some(Argb::BLACK),
            ..style
        };
        assert_eq!(
            point_colour(&single, &palette, 128, &point(3.0, 0)),
            Argb::BLACK.with_alpha(128)
        );
    }

    #[test]
    fn layer_colours_skip_withheld_points() {
        let lib = PaletteLibrary::with_builtin();
        let pc = MemoryPointCloud::new(
            "b.las",
            vec![
                point(1.0, 2),
                LasPoint {
                    withheld: true,
                    ..point(2.0, 2)
                },
            ],
        );
        let mut layer = PointCloudLayer::new(Box::new(pc), &lib);
        assert_eq!(layer.style().marker_size, 2.0);
        let colours = layer.colours();
        assert_eq!(colours.len(), 2);
        assert_ne!(colours[0], Argb::TRANSPARENT);
        assert_eq!(colours[1], Argb::TRANSPARENT);

        layer.set_fill_criterion(FillCriterion::Intensity, &lib);
        assert_eq!(layer.style().palette, GREY_PALETTE);
        assert_eq!(layer.palette().len(), 256);
    }
}
