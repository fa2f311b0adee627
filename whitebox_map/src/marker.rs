// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point marker symbols.

use core::str::FromStr;

use kurbo::{BezPath, Ellipse, Point, Shape, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Shape drawn for each point feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerStyle {
    /// Filled circle.
    #[default]
    Circle,
    /// Filled square.
    Square,
    /// Upward triangle.
    Triangle,
    /// Downward triangle.
    Triangle2,
    /// Diamond, taller than wide.
    Diamond,
    /// Plus sign with thick arms, filled.
    ThickCross,
    /// Plus sign drawn as two strokes.
    Cross,
    /// Diagonal cross drawn as two strokes.
    X,
    /// Eight-armed star drawn as four strokes.
    SimpleStar,
}

impl MarkerStyle {
    /// Every style, in menu order.
    pub const ALL: [Self; 9] = [
        Self::Circle,
        Self::Square,
        Self::Triangle,
        Self::Triangle2,
        Self::Diamond,
        Self::ThickCross,
        Self::Cross,
        Self::X,
        Self::SimpleStar,
    ];

    /// Parses a style name case-insensitively; unknown names give
    /// [`MarkerStyle::Circle`].
    #[must_use]
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Lowercase name as stored in project documents.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Circle => "circle",
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Triangle2 => "triangle2",
            Self::Diamond => "diamond",
            Self::ThickCross => "thick_cross",
            Self::Cross => "cross",
            Self::X => "x",
            Self::SimpleStar => "simple_star",
        }
    }
}

/// Error returned when a marker name is not recognised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownMarker;

impl core::fmt::Display for UnknownMarker {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("unknown marker style")
    }
}

impl FromStr for MarkerStyle {
    type Err = UnknownMarker;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .or_else(|| {
                // Menu labels use spaces ("Thick Cross").
                Self::ALL
                    .into_iter()
                    .find(|m| m.name().replace('_', " ").eq_ignore_ascii_case(s))
            })
            .ok_or(UnknownMarker)
    }
}

/// One drawing primitive of a glyph, relative to the marker centre.
#[derive(Clone, Debug, PartialEq)]
pub enum GlyphOp {
    /// Circle of the given radius.
    Circle(f64),
    /// Closed ring.
    Polygon(SmallVec<[Vec2; 13]>),
    /// Open segment.
    Segment(Vec2, Vec2),
}

/// A marker symbol at a fixed size.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerGlyph {
    ops: SmallVec<[GlyphOp; 4]>,
}

impl MarkerGlyph {
    /// Builds the glyph for `style` at `size` device pixels.
    #[must_use]
    pub fn new(style: MarkerStyle, size: f64) -> Self {
        let h = size / 2.0;
        let v = Vec2::new;
        let ring = |pts: &[Vec2]| GlyphOp::Polygon(pts.iter().copied().collect());
        let ops: SmallVec<[GlyphOp; 4]> = match style {
            MarkerStyle::Circle => smallvec::smallvec![GlyphOp::Circle(h)],
            MarkerStyle::Square => smallvec::smallvec![ring(&[
                v(-h, -h),
                v(h, -h),
                v(h, h),
                v(-h, h),
                v(-h, -h),
            ])],
            MarkerStyle::Triangle => smallvec::smallvec![ring(&[
                v(0.0, -h),
                v(h, h),
                v(-h, h),
                v(0.0, -h),
            ])],
            MarkerStyle::Triangle2 => smallvec::smallvec![ring(&[
                v(0.0, h),
                v(h, -h),
                v(-h, -h),
                v(0.0, h),
            ])],
            MarkerStyle::Diamond => {
                let t = 1.2 * h;
                smallvec::smallvec![ring(&[
                    v(0.0, -t),
                    v(h, 0.0),
                    v(0.0, t),
                    v(-h, 0.0),
                    v(0.0, -t),
                ])]
            }
            MarkerStyle::ThickCross => {
                let t = size / 6.0;
                smallvec::smallvec![ring(&[
                    v(-t, -h),
                    v(t, -h),
                    v(t, -t),
                    v(h, -t),
                    v(h, t),
                    v(t, t),
                    v(t, h),
                    v(-t, h),
                    v(-t, t),
                    v(-h, t),
                    v(-h, -t),
                    v(-t, -t),
                    v(-t, -h),
                ])]
            }
            MarkerStyle::Cross => smallvec::smallvec![
                GlyphOp::Segment(v(0.0, -h), v(0.0, h)),
                GlyphOp::Segment(v(-h, 0.0), v(h, 0.0)),
            ],
            MarkerStyle::X => smallvec::smallvec![
                GlyphOp::Segment(v(-h, -h), v(h, h)),
                GlyphOp::Segment(v(-h, h), v(h, -h)),
            ],
            MarkerStyle::SimpleStar => {
                let t = 1.2 * h;
                smallvec::smallvec![
                    GlyphOp::Segment(v(-h, -h), v(h, h)),
                    GlyphOp::Segment(v(-h, h), v(h, -h)),
                    GlyphOp::Segment(v(0.0, t), v(0.0, -t)),
                    GlyphOp::Segment(v(-t, 0.0), v(t, 0.0)),
                ]
            }
        };
        Self { ops }
    }

    /// Primitives making up the glyph.
    #[must_use]
    pub fn ops(&self) -> &[GlyphOp] {
        &self.ops
    }

    /// Returns `true` if the glyph encloses an area that can be filled.
    #[must_use]
    pub fn is_fillable(&self) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, GlyphOp::Circle(_) | GlyphOp::Polygon(_)))
    }

    /// Closed outline of the glyph centred on `center`, for filling.
    ///
    /// Empty for glyphs made only of segments.
    #[must_use]
    pub fn fill_path(&self, center: Point) -> BezPath {
        let mut path = BezPath::new();
        for op in &self.ops {
            match op {
                GlyphOp::Circle(r) => {
                    path.extend(Ellipse::new(center, Vec2::new(*r, *r), 0.0).path_elements(0.1));
                }
                GlyphOp::Polygon(pts) => push_ring(&mut path, center, pts),
                GlyphOp::Segment(..) => {}
            }
        }
        path
    }

    /// Every primitive of the glyph centred on `center`, for outlining.
    #[must_use]
    pub fn stroke_path(&self, center: Point) -> BezPath {
        let mut path = self.fill_path(center);
        for op in &self.ops {
            if let GlyphOp::Segment(a, b) = op {
                path.move_to(center + *a);
                path.line_to(center + *b);
            }
        }
        path
    }
}

fn push_ring(path: &mut BezPath, center: Point, pts: &[Vec2]) {
    let mut iter = pts.iter();
    if let Some(first) = iter.next() {
        path.move_to(center + *first);
        for p in iter {
            path.line_to(center + *p);
        }
        path.close_path();
    }
}

/// Glyphs for every marker style at one size.
///
/// Built once per layer draw and shared by reference for all of its points.
#[derive(Clone, Debug)]
pub struct MarkerTable {
    size: f64,
    glyphs: [MarkerGlyph; 9],
}

impl MarkerTable {
    /// Builds all glyphs at `size` device pixels.
    #[must_use]
    pub fn new(size: f64) -> Self {
        Self {
            size,
            glyphs: MarkerStyle::ALL.map(|s| MarkerGlyph::new(s, size)),
        }
    }

    /// Marker size the table was built for.
    #[must_use]
    pub fn size(&self) -> f64 {
        self.size
    }

    /// Glyph for `style`.
    #[must_use]
    pub fn glyph(&self, style: MarkerStyle) -> &MarkerGlyph {
        &self.glyphs[style as usize]
    }
}
