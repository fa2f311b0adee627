// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Packed colours and palettes.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use peniko::Color;

/// A colour packed as `0xAARRGGBB`.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Argb(pub u32);

impl Argb {
    /// Fully transparent black; the colour of no-data cells and null attributes.
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque black.
    pub const BLACK: Self = Self(0xFF00_0000);
    /// Opaque white.
    pub const WHITE: Self = Self(0xFFFF_FFFF);
    /// Opaque red.
    pub const RED: Self = Self(0xFFFF_0000);
    /// Opaque blue.
    pub const BLUE: Self = Self(0xFF00_00FF);

    /// Packs four channels.
    #[must_use]
    pub const fn new(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(u32::from_be_bytes([a, r, g, b]))
    }

    /// Packs an opaque colour.
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(255, r, g, b)
    }

    /// Alpha channel.
    #[must_use]
    pub const fn a(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    /// Red channel.
    #[must_use]
    pub const fn r(self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    /// Green channel.
    #[must_use]
    pub const fn g(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    /// Blue channel.
    #[must_use]
    pub const fn b(self) -> u8 {
        self.0.to_be_bytes()[3]
    }

    /// Returns the same colour with its alpha byte replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self::new(alpha, self.r(), self.g(), self.b())
    }

    /// Returns the colour as straight-alpha RGBA bytes.
    #[must_use]
    pub const fn to_rgba8(self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), self.a()]
    }

    /// Converts to a `peniko` colour.
    #[must_use]
    pub fn to_color(self) -> Color {
        Color::from_rgba8(self.r(), self.g(), self.b(), self.a())
    }
}

/// Ordered list of packed colours.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<Argb>,
}

impl Palette {
    /// Wraps a list of colours.
    #[must_use]
    pub fn new(entries: Vec<Argb>) -> Self {
        Self { entries }
    }

    /// Decodes a `.pal` file body: consecutive little-endian 32-bit ARGB
    /// entries. A trailing partial entry is ignored.
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        let entries = bytes
            .chunks_exact(4)
            .map(|c| Argb(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
            .collect();
        Self { entries }
    }

    /// A 256-entry black-to-white ramp, used when no palette can be found.
    #[must_use]
    pub fn grey_ramp() -> Self {
        Self {
            entries: (0..=u8::MAX).map(|v| Argb::opaque(v, v, v)).collect(),
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the palette has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries in order.
    #[must_use]
    pub fn entries(&self) -> &[Argb] {
        &self.entries
    }

    /// Returns the entry at `index`, clamped to the last entry.
    ///
    /// An empty palette yields [`Argb::TRANSPARENT`].
    #[must_use]
    pub fn entry(&self, index: usize) -> Argb {
        match self.entries.len() {
            0 => Argb::TRANSPARENT,
            n => self.entries[index.min(n - 1)],
        }
    }

    /// Returns the entry at `index` modulo the palette length.
    #[must_use]
    pub fn entry_wrapping(&self, index: usize) -> Argb {
        match self.entries.len() {
            0 => Argb::TRANSPARENT,
            n => self.entries[index % n],
        }
    }

    /// Returns a copy whose entries carry `alpha`, unless `alpha` is opaque.
    #[must_use]
    pub fn with_alpha(&self, alpha: u8) -> Self {
        if alpha == u8::MAX {
            return self.clone();
        }
        Self {
            entries: self.entries.iter().map(|c| c.with_alpha(alpha)).collect(),
        }
    }

    /// Returns a copy with the entries in reverse order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            entries: self.entries.iter().rev().copied().collect(),
        }
    }
}

/// Default palette for continuous and RGB rasters.
pub const SPECTRUM_PALETTE: &str = "spectrum.pal";
/// Default palette for categorical and boolean rasters.
pub const QUALITATIVE_PALETTE: &str = "qual.pal";
/// Default palette for attribute-coloured vector layers.
pub const CATEGORICAL_PALETTE: &str = "categorical1.pal";
/// Default palette for intensity-coloured point clouds.
pub const GREY_PALETTE: &str = "grey.pal";

/// Source of palettes by file reference.
///
/// Loading `.pal` files from disk is up to the implementor; the map only
/// asks for palettes by name.
pub trait PaletteProvider {
    /// Returns the named palette, or `None` when it is unavailable.
    fn palette(&self, name: &str) -> Option<Palette>;

    /// Returns the named palette, falling back to `fallback` and then to
    /// [`Palette::grey_ramp`].
    fn resolve(&self, name: &str, fallback: &str) -> Palette {
        if let Some(p) = self.palette(name).filter(|p| !p.is_empty()) {
            return p;
        }
        tracing::warn!(palette = name, fallback, "palette unavailable, using fallback");
        self.palette(fallback)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!(palette = fallback, "fallback palette unavailable, using grey ramp");
                Palette::grey_ramp()
            })
    }
}

/// In-memory palette collection keyed by file name.
///
/// Lookups ignore any directory part of the requested name, so
/// `"/opt/whitebox/palettes/spectrum.pal"` finds `"spectrum.pal"`.
#[derive(Clone, Debug, Default)]
pub struct PaletteLibrary {
    palettes: HashMap<String, Palette>,
}

impl PaletteLibrary {
    /// Creates an empty library.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a library holding generated versions of the default palettes.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut lib = Self::new();
        lib.insert(GREY_PALETTE, Palette::grey_ramp());
        lib.insert(SPECTRUM_PALETTE, spectrum());
        lib.insert(QUALITATIVE_PALETTE, Palette::new(QUALITATIVE.to_vec()));
        lib.insert(CATEGORICAL_PALETTE, Palette::new(CATEGORICAL.to_vec()));
        lib
    }

    /// Adds or replaces a palette.
    pub fn insert(&mut self, name: impl Into<String>, palette: Palette) {
        self.palettes.insert(name.into(), palette);
    }

    /// Number of palettes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    /// Returns `true` if the library is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }
}

impl PaletteProvider for PaletteLibrary {
    fn palette(&self, name: &str) -> Option<Palette> {
        self.palettes.get(file_name(name)).cloned()
    }
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

const QUALITATIVE: [Argb; 12] = [
    Argb::opaque(166, 206, 227),
    Argb::opaque(31, 120, 180),
    Argb::opaque(178, 223, 138),
    Argb::opaque(51, 160, 44),
    Argb::opaque(251, 154, 153),
    Argb::opaque(227, 26, 28),
    Argb::opaque(253, 191, 111),
    Argb::opaque(255, 127, 0),
    Argb::opaque(202, 178, 214),
    Argb::opaque(106, 61, 154),
    Argb::opaque(255, 255, 153),
    Argb::opaque(177, 89, 40),
];

const CATEGORICAL: [Argb; 10] = [
    Argb::opaque(228, 26, 28),
    Argb::opaque(55, 126, 184),
    Argb::opaque(77, 175, 74),
    Argb::opaque(152, 78, 163),
    Argb::opaque(255, 127, 0),
    Argb::opaque(255, 255, 51),
    Argb::opaque(166, 86, 40),
    Argb::opaque(247, 129, 191),
    Argb::opaque(153, 153, 153),
    Argb::opaque(0, 0, 0),
];

/// Blue, cyan, green, yellow, red over 256 entries.
fn spectrum() -> Palette {
    const STOPS: [[u32; 3]; 5] = [
        [0, 0, 255],
        [0, 255, 255],
        [0, 255, 0],
        [255, 255, 0],
        [255, 0, 0],
    ];
    const SEGMENTS: u32 = 4;
    let entries = (0..256_u32)
        .map(|i| {
            let pos = i * SEGMENTS;
            let seg = (pos / 255).min(SEGMENTS - 1);
            let frac = pos - seg * 255;
            let [r, g, b] = core::array::from_fn(|ch| {
                let a = STOPS[seg as usize][ch];
                let z = STOPS[seg as usize + 1][ch];
                let v = (a * (255 - frac) + z * frac) / 255;
                u8::try_from(v).unwrap_or(u8::MAX)
            });
            Argb::opaque(r, g, b)
        })
        .collect();
    Palette::new(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn channels_unpack() {
        let c = Argb(0x80_11_22_33);
        assert_eq!((c.a(), c.r(), c.g(), c.b()), (0x80, 0x11, 0x22, 0x33));
        assert_eq!(c.to_rgba8(), [0x11, 0x22, 0x33, 0x80]);
        assert_eq!(Argb::new(0x80, 0x11, 0x22, 0x33), c);
        assert_eq!(c.with_alpha(0xFF), Argb(0xFF_11_22_33));
    }

    #[test]
    fn pal_bytes_are_little_endian() {
        let p = Palette::from_le_bytes(&[0x33, 0x22, 0x11, 0xFF, 0x00, 0x00, 0xFF, 0xFF, 0x01]);
        assert_eq!(p.entries(), &[Argb(0xFF11_2233), Argb(0xFFFF_0000)]);
    }

    #[test]
    fn alpha_only_replaced_when_translucent() {
        let p = Palette::new(vec![Argb(0xFF01_0203), Argb(0x7F04_0506)]);
        assert_eq!(p.with_alpha(255), p);
        assert_eq!(
            p.with_alpha(10).entries(),
            &[Argb(0x0A01_0203), Argb(0x0A04_0506)]
        );
    }

    #[test]
    fn entry_lookups_clamp_or_wrap() {
        let p = Palette::new(vec![Argb::RED, Argb::BLUE, Argb::WHITE]);
        assert_eq!(p.entry(7), Argb::WHITE);
        assert_eq!(p.entry_wrapping(4), Argb::BLUE);
        assert_eq!(p.reversed().entry(0), Argb::WHITE);
        assert_eq!(Palette::default().entry(0), Argb::TRANSPARENT);
    }

    #[test]
    fn library_falls_back_to_grey() {
        let mut lib = PaletteLibrary::new();
        assert_eq!(lib.resolve("missing.pal", "also_missing.pal"), Palette::grey_ramp());
        lib.insert("qual.pal", Palette::new(vec![Argb::RED]));
        assert_eq!(lib.resolve("missing.pal", "qual.pal").len(), 1);
        assert_eq!(
            lib.palette("C:\\palettes\\qual.pal"),
            Some(Palette::new(vec![Argb::RED]))
        );
    }

    #[test]
    fn builtin_spectrum_runs_blue_to_red() {
        let lib = PaletteLibrary::with_builtin();
        let s = lib.palette(SPECTRUM_PALETTE).unwrap();
        assert_eq!(s.len(), 256);
        assert_eq!(s.entry(0), Argb::opaque(0, 0, 255));
        assert_eq!(s.entry(255), Argb::opaque(255, 0, 0));
        assert_eq!(lib.len(), 4);
    }
}
