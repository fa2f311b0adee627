// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raster layers and palette sampling.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use whitebox_view::RasterWindow;

use crate::cache::LayerCache;
use crate::layer::{LayerHeader, title_from_file};
use crate::palette::{Argb, Palette, PaletteProvider, QUALITATIVE_PALETTE, SPECTRUM_PALETTE};
use crate::source::{DataScale, RasterSource};
use crate::stats::{Histogram, truncate_index, truncate_signed};
use crate::Result;

/// Returns the palette a raster uses when none is named.
#[must_use]
pub fn default_raster_palette(scale: DataScale) -> &'static str {
    match scale {
        DataScale::Continuous | DataScale::Rgb => SPECTRUM_PALETTE,
        DataScale::Categorical | DataScale::Boolean => QUALITATIVE_PALETTE,
    }
}

/// Display settings of a raster layer.
#[derive(Clone, Debug, PartialEq)]
pub struct RasterStyle {
    /// How values map to colours.
    pub data_scale: DataScale,
    /// Value drawn with the first palette entry.
    pub display_min: f64,
    /// Value drawn with the last palette entry.
    pub display_max: f64,
    /// Exponent applied to the normalized value before the palette lookup.
    pub gamma: f64,
    /// Palette file reference.
    pub palette: String,
    /// Draw the palette back to front.
    pub palette_reversed: bool,
}

impl Default for RasterStyle {
    fn default() -> Self {
        Self {
            data_scale: DataScale::Continuous,
            display_min: 0.0,
            display_max: 1.0,
            gamma: 1.0,
            palette: String::from(SPECTRUM_PALETTE),
            palette_reversed: false,
        }
    }
}

impl RasterStyle {
    /// Style suggested by the source header.
    #[must_use]
    pub fn from_source(source: &dyn RasterSource) -> Self {
        let data_scale = source.data_scale();
        Self {
            data_scale,
            display_min: source.display_minimum(),
            display_max: source.display_maximum(),
            gamma: 1.0,
            palette: String::from(
                source
                    .preferred_palette()
                    .unwrap_or_else(|| default_raster_palette(data_scale)),
            ),
            palette_reversed: false,
        }
    }
}

/// Maps raster values to colours.
///
/// The palette handed in is used as is; reversal and alpha are applied by
/// [`RasterSampler::new`].
#[derive(Clone, Debug)]
pub struct RasterSampler {
    palette: Palette,
    scale: DataScale,
    min: f64,
    range: f64,
    gamma: f64,
    no_data: f64,
    alpha: u8,
}

impl RasterSampler {
    /// Builds a sampler for one style, palette, alpha and no-data marker.
    #[must_use]
    pub fn new(style: &RasterStyle, palette: &Palette, alpha: u8, no_data: f64) -> Self {
        let palette = if style.palette_reversed {
            palette.reversed()
        } else {
            palette.clone()
        };
        Self {
            palette: palette.with_alpha(alpha),
            scale: style.data_scale,
            min: style.display_min,
            range: style.display_max - style.display_min,
            gamma: style.gamma,
            no_data,
            alpha,
        }
    }

    /// Palette index for a valid value.
    ///
    /// Not meaningful for [`DataScale::Rgb`], which bypasses the palette.
    #[must_use]
    pub fn entry(&self, v: f64) -> usize {
        let n = self.palette.len();
        if n == 0 {
            return 0;
        }
        let last = n - 1;
        match self.scale {
            DataScale::Continuous | DataScale::Rgb => {
                let t = (v - self.min) / self.range;
                let t = if self.gamma == 1.0 { t } else { t.powf(self.gamma) };
                truncate_index(t * last as f64).min(last)
            }
            DataScale::Categorical => {
                let class = truncate_signed(v - self.min);
                let n = i64::try_from(n).unwrap_or(i64::MAX);
                usize::try_from(class % n).unwrap_or(0)
            }
            DataScale::Boolean => {
                if v > 0.0 {
                    last
                } else {
                    0
                }
            }
        }
    }

    /// Colour of one value. No-data is transparent.
    #[must_use]
    pub fn colour(&self, v: f64) -> Argb {
        if v == self.no_data {
            return Argb::TRANSPARENT;
        }
        if self.scale == DataScale::Rgb {
            return unpack_rgb(v, self.alpha);
        }
        self.palette.entry(self.entry(v))
    }

    /// Samples the visible window of `source` at the window's stride.
    #[must_use]
    pub fn sample(&self, source: &dyn RasterSource, window: &RasterWindow) -> RasterImage {
        let step = window.resolution_factor.max(1);
        let width = window.columns.len().div_ceil(step);
        let height = window.rows.len().div_ceil(step);
        let mut pixels = Vec::with_capacity(width * height);
        let mut values = Vec::with_capacity(width * height);
        for row in window.rows.clone().step_by(step) {
            let data = source.row_values(row);
            for col in window.columns.clone().step_by(step) {
                let z = data.get(col).copied().unwrap_or(self.no_data);
                values.push(z);
                pixels.push(self.colour(z));
            }
        }
        tracing::trace!(width, height, step, "sampled raster window");
        RasterImage {
            width,
            height,
            pixels,
            values,
            window: window.clone(),
        }
    }
}

/// Decodes a packed `A<<24 | B<<16 | G<<8 | R` cell into ARGB, scaling its
/// alpha by the layer alpha.
fn unpack_rgb(v: f64, layer_alpha: u8) -> Argb {
    let [r, g, b, a, ..] = truncate_signed(v).to_le_bytes();
    let a = u16::from(a) * u16::from(layer_alpha) / 255;
    Argb::new(u8::try_from(a).unwrap_or(u8::MAX), r, g, b)
}

/// Sampled and coloured part of a raster, ready to draw.
#[derive(Clone, Debug)]
pub struct RasterImage {
    width: usize,
    height: usize,
    pixels: Vec<Argb>,
    values: Vec<f64>,
    window: RasterWindow,
}

impl RasterImage {
    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Colours, row-major from the top-left.
    #[must_use]
    pub fn pixels(&self) -> &[Argb] {
        &self.pixels
    }

    /// Sampled source values, parallel to [`RasterImage::pixels`].
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Window the image was sampled from.
    #[must_use]
    pub fn window(&self) -> &RasterWindow {
        &self.window
    }

    /// Pixel colour at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<Argb> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Straight-alpha RGBA bytes, row-major.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_rgba8()).collect()
    }

    /// Sampled value nearest to source cell `(row, column)`.
    ///
    /// Returns `None` when the cell lies outside the sampled window.
    #[must_use]
    pub fn cell_value_at_image(&self, row: usize, column: usize) -> Option<f64> {
        let rows = &self.window.rows;
        let cols = &self.window.columns;
        if !rows.contains(&row) || !cols.contains(&column) {
            return None;
        }
        let r = nearest(row - rows.start, rows.len() - 1, self.height);
        let c = nearest(column - cols.start, cols.len() - 1, self.width);
        self.values.get(r * self.width + c).copied()
    }
}

/// Maps an offset within `0..=span` source cells onto `0..len` image cells.
fn nearest(offset: usize, span: usize, len: usize) -> usize {
    if span == 0 || len == 0 {
        return 0;
    }
    let t = offset as f64 / span as f64 * (len - 1) as f64 + 0.5;
    truncate_index(t).min(len - 1)
}

/// A raster layer.
#[derive(Debug)]
pub struct RasterLayer {
    pub(crate) header: LayerHeader,
    source: Box<dyn RasterSource>,
    style: RasterStyle,
    palette: Palette,
    resolution_factor: usize,
    image: LayerCache<RasterImage>,
}

impl RasterLayer {
    /// Opens a layer over `source` with the style its header suggests.
    pub fn new(source: Box<dyn RasterSource>, palettes: &dyn PaletteProvider) -> Self {
        let style = RasterStyle::from_source(source.as_ref());
        Self::with_style(source, style, palettes)
    }

    /// Opens a layer over `source` with an explicit style.
    pub fn with_style(
        source: Box<dyn RasterSource>,
        style: RasterStyle,
        palettes: &dyn PaletteProvider,
    ) -> Self {
        let header = LayerHeader::new(title_from_file(source.file_reference()), source.extent());
        let palette = palettes.resolve(&style.palette, default_raster_palette(style.data_scale));
        Self {
            header,
            source,
            style,
            palette,
            resolution_factor: 1,
            image: LayerCache::new(),
        }
    }

    /// Shared layer state.
    #[must_use]
    pub fn header(&self) -> &LayerHeader {
        &self.header
    }

    /// Data source.
    #[must_use]
    pub fn source(&self) -> &dyn RasterSource {
        self.source.as_ref()
    }

    /// Display settings.
    #[must_use]
    pub fn style(&self) -> &RasterStyle {
        &self.style
    }

    /// Palette as resolved, before reversal and alpha.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.source.rows()
    }

    /// Number of columns.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.source.columns()
    }

    /// No-data marker of the source.
    #[must_use]
    pub fn no_data(&self) -> f64 {
        self.source.no_data()
    }

    /// Stride used for the last sampled image.
    #[must_use]
    pub fn resolution_factor(&self) -> usize {
        self.resolution_factor
    }

    /// Sets the sampling stride; values below one become one.
    pub fn set_resolution_factor(&mut self, factor: usize) {
        let factor = factor.max(1);
        if factor != self.resolution_factor {
            self.resolution_factor = factor;
            self.image.invalidate();
        }
    }

    /// Sets the value range stretched over the palette.
    pub fn set_display_range(&mut self, min: f64, max: f64) {
        if self.style.display_min != min || self.style.display_max != max {
            self.style.display_min = min;
            self.style.display_max = max;
            self.image.invalidate();
        }
    }

    /// Sets the gamma exponent.
    pub fn set_gamma(&mut self, gamma: f64) {
        if self.style.gamma != gamma {
            self.style.gamma = gamma;
            self.image.invalidate();
        }
    }

    /// Sets the data scale.
    pub fn set_data_scale(&mut self, scale: DataScale) {
        if self.style.data_scale != scale {
            self.style.data_scale = scale;
            self.image.invalidate();
        }
    }

    /// Switches to another palette.
    pub fn set_palette(&mut self, name: impl Into<String>, palettes: &dyn PaletteProvider) {
        self.style.palette = name.into();
        self.palette = palettes.resolve(
            &self.style.palette,
            default_raster_palette(self.style.data_scale),
        );
        self.image.invalidate();
    }

    /// Sets whether the palette is drawn back to front.
    pub fn set_palette_reversed(&mut self, reversed: bool) {
        if self.style.palette_reversed != reversed {
            self.style.palette_reversed = reversed;
            self.image.invalidate();
        }
    }

    /// Flips the palette direction.
    pub fn reverse_palette(&mut self) {
        self.set_palette_reversed(!self.style.palette_reversed);
    }

    /// Value below which `percent` of the valid cells lie.
    #[must_use]
    pub fn clip_lower_tail(&self, percent: f64) -> f64 {
        self.histogram().lower_tail(percent)
    }

    /// Value above which `percent` of the valid cells lie.
    #[must_use]
    pub fn clip_upper_tail(&self, percent: f64) -> f64 {
        self.histogram().upper_tail(percent)
    }

    fn histogram(&self) -> Histogram {
        let no_data = self.source.no_data();
        let rows = self.source.rows();
        let values = (0..rows).flat_map(|r| {
            self.source
                .row_values(r)
                .iter()
                .copied()
                .filter(|v| *v != no_data)
                .collect::<Vec<_>>()
        });
        Histogram::new(
            values,
            self.source.minimum(),
            self.source.maximum(),
            self.palette.len().max(256),
        )
    }

    /// Colour mapping for the current style and alpha.
    #[must_use]
    pub fn sampler(&self) -> RasterSampler {
        RasterSampler::new(
            &self.style,
            &self.palette,
            self.header.alpha,
            self.source.no_data(),
        )
    }

    /// Last sampled image, possibly stale.
    #[must_use]
    pub fn image(&self) -> Option<&RasterImage> {
        self.image.get()
    }

    /// Returns `true` if the next [`RasterLayer::update_image`] resamples.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.image.is_dirty()
    }

    /// Generation counter of the image cache.
    #[must_use]
    pub fn image_generation(&self) -> u64 {
        self.image.generation()
    }

    /// Brings the image up to date for `window`, resampling only when the
    /// window, stride or styling changed.
    pub fn update_image(&mut self, window: &RasterWindow) -> &RasterImage {
        if self.image.get().map(RasterImage::window) != Some(window) {
            self.image.invalidate();
        }
        self.header.current_extent = window.visible_extent;
        self.set_resolution_factor(window.resolution_factor);
        if self.image.is_dirty() {
            tracing::trace!(layer = %self.header.title, "regenerating raster image");
        }
        let sampler = self.sampler();
        let source = self.source.as_ref();
        self.image.get_or_update(|| sampler.sample(source, window))
    }

    /// Sampled value nearest to source cell `(row, column)` in the current
    /// image.
    #[must_use]
    pub fn cell_value_at_image(&self, row: usize, column: usize) -> Option<f64> {
        self.image.get()?.cell_value_at_image(row, column)
    }

    /// Writes one cell through to the source and marks the image stale.
    pub fn set_value(&mut self, row: usize, column: usize, z: f64) -> Result<()> {
        self.source.set_value(row, column, z)?;
        self.image.invalidate();
        Ok(())
    }

    pub(crate) fn invalidate(&mut self) {
        self.image.invalidate();
    }
}
