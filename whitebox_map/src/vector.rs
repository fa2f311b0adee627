// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vector layers: styling, per-record colours, legends, visible record
//! queries and device-space paths.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;

use kurbo::{BezPath, Cap, Join, Point, Stroke};
use smallvec::SmallVec;
use whitebox_extent::BoundingBox;
use whitebox_view::ViewportTransform;

use crate::cache::LayerCache;
use crate::layer::{LayerHeader, title_from_file};
use crate::marker::MarkerStyle;
use crate::palette::{Argb, CATEGORICAL_PALETTE, Palette, PaletteProvider};
use crate::source::{AttributeValue, FieldKind, Geometry, ShapeType, VectorSource};
use crate::stats::truncate_index;

bitflags::bitflags! {
    /// Drawing switches of a vector layer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct VectorFlags: u8 {
        /// Polygons and markers are filled.
        const FILLED = 0b0000_0001;
        /// Polygons and markers are outlined.
        const OUTLINED = 0b0000_0010;
        /// Lines and outlines use the dash pattern.
        const DASHED = 0b0000_0100;
        /// Fill colour is the same for every record.
        const FILLED_WITH_ONE_COLOUR = 0b0000_1000;
        /// Line colour is the same for every record.
        const OUTLINED_WITH_ONE_COLOUR = 0b0001_0000;
        /// Attribute colours are stretched over the palette instead of cycling.
        const PALETTE_SCALED = 0b0010_0000;
    }
}

impl Default for VectorFlags {
    fn default() -> Self {
        Self::FILLED | Self::OUTLINED | Self::FILLED_WITH_ONE_COLOUR | Self::OUTLINED_WITH_ONE_COLOUR
    }
}

/// Dash pattern used when none is set.
pub const DEFAULT_DASH_PATTERN: [f64; 4] = [4.0, 4.0, 12.0, 4.0];

/// Display settings of a vector layer.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorStyle {
    /// Drawing switches.
    pub flags: VectorFlags,
    /// Colour of lines and outlines.
    pub line_colour: Argb,
    /// Colour of polygon and marker interiors.
    pub fill_colour: Argb,
    /// Line width in device pixels.
    pub line_thickness: f64,
    /// Marker size in device pixels.
    pub marker_size: f64,
    /// Marker symbol for point features.
    pub marker: MarkerStyle,
    /// Alternating dash and gap lengths in device pixels.
    pub dash_pattern: SmallVec<[f64; 4]>,
    /// Attribute column driving per-record colours, if any.
    pub colouring_attribute: Option<String>,
    /// Palette file reference for attribute colours.
    pub palette: String,
    /// Features no larger than this many device pixels are skipped.
    pub generalization_level: f64,
}

impl Default for VectorStyle {
    fn default() -> Self {
        Self {
            flags: VectorFlags::default(),
            line_colour: Argb::BLACK,
            fill_colour: Argb::RED,
            line_thickness: 1.0,
            marker_size: 6.0,
            marker: MarkerStyle::Circle,
            dash_pattern: SmallVec::from_slice(&DEFAULT_DASH_PATTERN),
            colouring_attribute: None,
            palette: String::from(CATEGORICAL_PALETTE),
            generalization_level: 0.5,
        }
    }
}

impl VectorStyle {
    /// Default style with colours guessed from the layer title.
    ///
    /// Roads are black; streams, rivers and hydrology are blue lines; lakes
    /// and water bodies are blue polygons.
    #[must_use]
    pub fn for_title(title: &str, shape_type: ShapeType) -> Self {
        let mut style = Self::default();
        let t = title.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| t.contains(w));
        match shape_type.base() {
            ShapeType::PolyLine if has(&["roads", "transportation"]) => {
                style.line_colour = Argb::BLACK;
            }
            ShapeType::PolyLine if has(&["stream", "river", "water", "hydrology"]) => {
                style.line_colour = Argb::BLUE;
            }
            ShapeType::Polygon if has(&["lake", "water"]) => {
                style.line_colour = Argb::BLACK;
                style.fill_colour = Argb::BLUE;
            }
            _ => {}
        }
        style
    }

    /// Stroke for lines and outlines: butt caps, miter joins with limit 10,
    /// dashed when [`VectorFlags::DASHED`] is set.
    #[must_use]
    pub fn stroke(&self) -> Stroke {
        let stroke = Stroke::new(self.line_thickness)
            .with_caps(Cap::Butt)
            .with_join(Join::Miter)
            .with_miter_limit(10.0);
        if self.flags.contains(VectorFlags::DASHED) && !self.dash_pattern.is_empty() {
            stroke.with_dashes(0.0, self.dash_pattern.iter().copied())
        } else {
            stroke
        }
    }

    /// Returns `true` if records share one colour for `shape_type`.
    #[must_use]
    pub fn is_single_colour(&self, shape_type: ShapeType) -> bool {
        if self.colouring_attribute.is_none() {
            return true;
        }
        let flag = if shape_type.base() == ShapeType::PolyLine {
            VectorFlags::OUTLINED_WITH_ONE_COLOUR
        } else {
            VectorFlags::FILLED_WITH_ONE_COLOUR
        };
        self.flags.contains(flag)
    }
}

/// One legend row.
#[derive(Clone, Debug, PartialEq)]
pub struct LegendEntry {
    /// Row label.
    pub label: String,
    /// Swatch colour.
    pub colour: Argb,
}

/// Per-record colours and the legend describing them.
#[derive(Clone, Debug, PartialEq)]
pub struct ColourData {
    /// Colour of each record, indexed by record number.
    pub colours: Vec<Argb>,
    /// Legend rows.
    pub legend: Vec<LegendEntry>,
    /// Column minimum and maximum when a numeric column is stretched over the
    /// palette; the legend shows these as the ends of the ramp.
    pub value_range: Option<(f64, f64)>,
}

impl ColourData {
    /// Colour of one record; transparent for unknown records.
    #[must_use]
    pub fn colour(&self, record: usize) -> Argb {
        self.colours.get(record).copied().unwrap_or(Argb::TRANSPARENT)
    }
}

/// Computes record colours for one style.
///
/// - Single colour: the line colour for polylines or the fill colour
///   otherwise, with the layer alpha; one legend row labelled `title`.
/// - Numeric column with [`VectorFlags::PALETTE_SCALED`]: values stretched
///   linearly between the column min and max.
/// - Anything else: values ranked (ties share a rank) and the rank used as a
///   cyclic palette index, or scaled into the palette when palette-scaled.
///
/// Null attributes are transparent.
#[must_use]
pub fn colour_records(
    source: &dyn VectorSource,
    style: &VectorStyle,
    palette: &Palette,
    title: &str,
    alpha: u8,
) -> ColourData {
    let count = source.record_count();
    let shape_type = source.shape_type();
    let attribute = match &style.colouring_attribute {
        Some(a) if !style.is_single_colour(shape_type) => a.as_str(),
        _ => {
            let base = if shape_type.base() == ShapeType::PolyLine {
                style.line_colour
            } else {
                style.fill_colour
            };
            let colour = base.with_alpha(alpha);
            return ColourData {
                colours: alloc::vec![colour; count],
                legend: alloc::vec![LegendEntry {
                    label: String::from(title),
                    colour,
                }],
                value_range: None,
            };
        }
    };

    let values: Vec<AttributeValue> = (0..count).map(|i| source.attribute(i, attribute)).collect();
    let scaled = style.flags.contains(VectorFlags::PALETTE_SCALED);
    if scaled && source.field_kind(attribute) == Some(FieldKind::Numeric) {
        stretch_numeric(&values, palette, alpha)
    } else {
        rank_values(&values, palette, alpha, scaled)
    }
}

fn stretch_numeric(values: &[AttributeValue], palette: &Palette, alpha: u8) -> ColourData {
    let (min, max) = values
        .iter()
        .filter_map(AttributeValue::as_number)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let range = max - min;
    let last = palette.len().saturating_sub(1) as f64;
    let colours = values
        .iter()
        .map(|v| match v.as_number() {
            None => Argb::TRANSPARENT,
            Some(v) => {
                let t = if range > 0.0 { (v - min) / range } else { 0.0 };
                palette.entry(truncate_index(t * last)).with_alpha(alpha)
            }
        })
        .collect();
    ColourData {
        colours,
        legend: alloc::vec![LegendEntry {
            label: String::from("continuous numerical variable"),
            colour: Argb::BLACK,
        }],
        value_range: (min <= max).then_some((min, max)),
    }
}

fn rank_values(values: &[AttributeValue], palette: &Palette, alpha: u8, scaled: bool) -> ColourData {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|a, b| values[*a].rank_cmp(&values[*b]));

    let mut ranks = alloc::vec![0_usize; values.len()];
    let mut rank = 0;
    for pair in order.windows(2) {
        if values[pair[1]].rank_cmp(&values[pair[0]]) != Ordering::Equal {
            rank += 1;
        }
        ranks[pair[1]] = rank;
    }
    let max_rank = rank;

    let entry = |r: usize| {
        if scaled {
            let t = if max_rank > 0 { r as f64 / max_rank as f64 } else { 0.0 };
            palette.entry(truncate_index(t * palette.len().saturating_sub(1) as f64))
        } else {
            palette.entry_wrapping(r)
        }
    };

    let mut legend = Vec::with_capacity(max_rank + 1);
    let mut last: Option<&AttributeValue> = None;
    for &i in &order {
        if last.is_some_and(|l| l.rank_cmp(&values[i]) == Ordering::Equal) {
            continue;
        }
        last = Some(&values[i]);
        legend.push(if values[i].is_null() {
            LegendEntry {
                label: String::from("Null"),
                colour: Argb::TRANSPARENT,
            }
        } else {
            LegendEntry {
                label: values[i].to_string(),
                colour: entry(ranks[i]),
            }
        });
    }

    let colours = values
        .iter()
        .zip(&ranks)
        .map(|(v, r)| {
            if v.is_null() {
                Argb::TRANSPARENT
            } else {
                entry(*r).with_alpha(alpha)
            }
        })
        .collect();
    ColourData {
        colours,
        legend,
        value_range: None,
    }
}

/// Returns `true` if a record should be drawn in `map_extent`.
///
/// Points are kept when inside the extent. Other geometry must overlap the
/// extent and have a larger side longer than `min_length`.
#[must_use]
pub fn is_mappable(geometry: &Geometry, map_extent: &BoundingBox, min_length: f64) -> bool {
    if geometry.is_null() {
        return false;
    }
    if geometry.shape_type.base() == ShapeType::Point {
        return geometry.points.iter().any(|p| map_extent.contains_point(*p));
    }
    let bb = geometry.bounding_box();
    if geometry.shape_type.base() == ShapeType::MultiPoint {
        return map_extent.does_intersect(&bb);
    }
    map_extent.does_intersect(&bb) && bb.max_extent() > min_length
}

/// Indices of the records visible at one extent and generalization length.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordQuery {
    map_extent: BoundingBox,
    min_length: f64,
    records: Vec<usize>,
}

impl RecordQuery {
    /// Runs the query over `records`.
    #[must_use]
    pub fn run(source: &dyn VectorSource, map_extent: BoundingBox, min_length: f64) -> Self {
        let records = source
            .records()
            .iter()
            .enumerate()
            .filter(|(_, r)| is_mappable(&r.geometry, &map_extent, min_length))
            .map(|(i, _)| i)
            .collect();
        Self {
            map_extent,
            min_length,
            records,
        }
    }

    /// Record indices in file order.
    #[must_use]
    pub fn records(&self) -> &[usize] {
        &self.records
    }

    fn matches(&self, map_extent: &BoundingBox, min_length: f64) -> bool {
        self.map_extent == *map_extent && self.min_length == min_length
    }
}

/// Device-space path of one part.
fn part_path(points: &[Point], vp: &ViewportTransform, closed: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter().map(|p| vp.world_to_device_point(*p));
    if let Some(first) = iter.next() {
        path.move_to(first);
        for p in iter {
            path.line_to(p);
        }
        if closed {
            path.close_path();
        }
    }
    path
}

/// One open device-space path per polyline part with at least two points.
pub fn polyline_paths<'a>(
    geometry: &'a Geometry,
    vp: &'a ViewportTransform,
) -> impl Iterator<Item = BezPath> + 'a {
    geometry
        .part_slices()
        .filter(|p| p.len() >= 2)
        .map(move |p| part_path(p, vp, false))
}

/// All polygon parts, each closed, in one device-space path for an even-odd fill.
#[must_use]
pub fn polygon_path(geometry: &Geometry, vp: &ViewportTransform) -> BezPath {
    let mut path = BezPath::new();
    for part in geometry.part_slices().filter(|p| !p.is_empty()) {
        path.extend(part_path(part, vp, true).elements().iter().copied());
    }
    path
}

/// One closed device-space path per polygon part, for outlining.
pub fn ring_paths<'a>(
    geometry: &'a Geometry,
    vp: &'a ViewportTransform,
) -> impl Iterator<Item = BezPath> + 'a {
    geometry
        .part_slices()
        .filter(|p| p.len() >= 2)
        .map(move |p| part_path(p, vp, true))
}

/// A vector layer.
#[derive(Debug)]
pub struct VectorLayer {
    pub(crate) header: LayerHeader,
    source: Box<dyn VectorSource>,
    style: VectorStyle,
    palette: Palette,
    colours: LayerCache<ColourData>,
    query: LayerCache<RecordQuery>,
}

impl VectorLayer {
    /// Opens a layer over `source`, styled from its title and shape type.
    pub fn new(source: Box<dyn VectorSource>, palettes: &dyn PaletteProvider) -> Self {
        let title = title_from_file(source.file_reference());
        let style = VectorStyle::for_title(&title, source.shape_type());
        Self::with_style(source, style, palettes)
    }

    /// Opens a layer over `source` with an explicit style.
    pub fn with_style(
        source: Box<dyn VectorSource>,
        style: VectorStyle,
        palettes: &dyn PaletteProvider,
    ) -> Self {
        let header = LayerHeader::new(title_from_file(source.file_reference()), source.extent());
        let palette = palettes.resolve(&style.palette, CATEGORICAL_PALETTE);
        Self {
            header,
            source,
            style,
            palette,
            colours: LayerCache::new(),
            query: LayerCache::new(),
        }
    }

    /// Shared layer state.
    #[must_use]
    pub fn header(&self) -> &LayerHeader {
        &self.header
    }

    /// Data source.
    #[must_use]
    pub fn source(&self) -> &dyn VectorSource {
        self.source.as_ref()
    }

    /// Shape type of the source.
    #[must_use]
    pub fn shape_type(&self) -> ShapeType {
        self.source.shape_type()
    }

    /// Display settings.
    #[must_use]
    pub fn style(&self) -> &VectorStyle {
        &self.style
    }

    /// Palette used for attribute colours.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Edits the style, re-resolves the palette and invalidates colours.
    pub fn update_style(
        &mut self,
        palettes: &dyn PaletteProvider,
        edit: impl FnOnce(&mut VectorStyle),
    ) {
        let old_palette = self.style.palette.clone();
        edit(&mut self.style);
        if self.style.palette != old_palette {
            self.palette = palettes.resolve(&self.style.palette, CATEGORICAL_PALETTE);
        }
        self.colours.invalidate();
    }

    /// Record colours and legend, recomputed when stale.
    pub fn colour_data(&mut self) -> &ColourData {
        let source = self.source.as_ref();
        let (style, palette, header) = (&self.style, &self.palette, &self.header);
        self.colours.get_or_update(|| {
            tracing::trace!(layer = %header.title, "recomputing record colours");
            colour_records(source, style, palette, &header.title, header.alpha)
        })
    }

    /// Legend rows for the current style.
    pub fn legend(&mut self) -> &[LegendEntry] {
        &self.colour_data().legend
    }

    /// Records visible at `map_extent` for the given generalization length,
    /// re-queried only when either changed.
    pub fn visible_records(&mut self, map_extent: BoundingBox, min_length: f64) -> &[usize] {
        if !self
            .query
            .get()
            .is_some_and(|q| q.matches(&map_extent, min_length))
        {
            self.query.invalidate();
        }
        self.header.current_extent = if self.header.full_extent.does_intersect(&map_extent) {
            self.header.full_extent.intersect(&map_extent)
        } else {
            BoundingBox::NULL
        };
        let source = self.source.as_ref();
        self.query
            .get_or_update(|| RecordQuery::run(source, map_extent, min_length))
            .records()
    }

    /// Brings record query and colours up to date for one frame.
    pub fn prepare(&mut self, map_extent: BoundingBox, min_length: f64) {
        self.visible_records(map_extent, min_length);
        self.colour_data();
    }

    /// Last record query, possibly stale.
    #[must_use]
    pub fn last_query(&self) -> Option<&RecordQuery> {
        self.query.get()
    }

    /// Last colour data, possibly stale.
    #[must_use]
    pub fn last_colours(&self) -> Option<&ColourData> {
        self.colours.get()
    }

    pub(crate) fn invalidate(&mut self) {
        self.colours.invalidate();
        self.query.invalidate();
    }
}
