// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for SwatchScan.
//
// Every record here is plain data: created fresh for each page run and handed
// to whatever serializer the caller uses.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Code assigned to a sampled color that matched nothing in the palette.
pub const UNKNOWN_CODE: &str = "UNKNOWN";

/// Name given to reference entries whose label could not be read at all.
pub const GENERIC_COLOR_NAME: &str = "Unknown Color";

/// Unique identifier for one page-processing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An 8-bit-per-channel RGB triplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Canonical uppercase 6-digit hex encoding, without a leading `#`.
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.channels())
    }

    /// Parse `RRGGBB` or `#RRGGBB` (either case).
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.trim().trim_start_matches('#');
        let bytes = hex::decode(digits).ok()?;
        match bytes.as_slice() {
            [r, g, b] => Some(Self::new(*r, *g, *b)),
            _ => None,
        }
    }

    /// Euclidean distance in RGB space.
    pub fn distance(&self, other: &RgbColor) -> f64 {
        let dr = self.r as f64 - other.r as f64;
        let dg = self.g as f64 - other.g as f64;
        let db = self.b as f64 - other.b as f64;
        (dr * dr + dg * dg + db * db).sqrt()
    }
}

impl std::fmt::Display for RgbColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Axis-aligned rectangle in page-pixel coordinates.
///
/// Width and height are always positive; the only ways to build one are the
/// fallible constructors below (deserialization included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BoundingBoxRepr")]
pub struct BoundingBox {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

#[derive(Deserialize)]
struct BoundingBoxRepr {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl TryFrom<BoundingBoxRepr> for BoundingBox {
    type Error = String;

    fn try_from(raw: BoundingBoxRepr) -> Result<Self, Self::Error> {
        BoundingBox::new(raw.x, raw.y, raw.width, raw.height)
            .ok_or_else(|| format!("degenerate bounding box {}x{}", raw.width, raw.height))
    }
}

impl BoundingBox {
    /// Returns `None` when either dimension is zero.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Build from inclusive pixel spans `[x0, x1] × [y0, y1]`.
    pub fn from_spans(x0: u32, x1: u32, y0: u32, y1: u32) -> Option<Self> {
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Self::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1)
    }

    pub fn x(&self) -> u32 {
        self.x
    }

    pub fn y(&self) -> u32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        BoundingBox {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Grow by `pad_x` / `pad_top` / `pad_bottom`, clipped to a page of
    /// `page_width` × `page_height`.
    pub fn expand_within(
        &self,
        pad_x: u32,
        pad_top: u32,
        pad_bottom: u32,
        page_width: u32,
        page_height: u32,
    ) -> Option<BoundingBox> {
        let x0 = self.x.saturating_sub(pad_x);
        let y0 = self.y.saturating_sub(pad_top);
        let x1 = self.right().saturating_add(pad_x).min(page_width);
        let y1 = self.bottom().saturating_add(pad_bottom).min(page_height);
        BoundingBox::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }
}

/// How much trust a parsed text field deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseConfidence {
    /// A recognition variant parsed into a well-formed record.
    Structured,
    /// Recovered by a loose pattern scan over all variants.
    Pattern,
    /// Nothing readable; the identifier was synthesized from position and color.
    Synthetic,
    /// Rewritten by the reference validator from ground truth.
    Corrected,
}

impl ParseConfidence {
    pub fn is_low(&self) -> bool {
        matches!(self, Self::Pattern | Self::Synthetic)
    }
}

/// A color sampled from one box on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSample {
    pub rgb: RgbColor,
    /// Always `rgb.to_hex()`.
    pub hex: String,
    pub bounding_box: BoundingBox,
    /// Raw bottom-right pixel of the box, kept for visual sanity checks.
    pub corner_pixel: RgbColor,
}

impl ColorSample {
    pub fn new(rgb: RgbColor, bounding_box: BoundingBox, corner_pixel: RgbColor) -> Self {
        Self {
            rgb,
            hex: rgb.to_hex(),
            bounding_box,
            corner_pixel,
        }
    }
}

/// One entry of the reference palette as read from the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub code: String,
    pub name: String,
    pub pantone_label: Option<String>,
    pub rgb: RgbColor,
    pub hex: String,
    pub bounding_box: BoundingBox,
    pub confidence: ParseConfidence,
}

impl ReferenceEntry {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        pantone_label: Option<String>,
        sample: &ColorSample,
        confidence: ParseConfidence,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            pantone_label,
            rgb: sample.rgb,
            hex: sample.hex.clone(),
            bounding_box: sample.bounding_box,
            confidence,
        }
    }
}

/// A style swatch: identifier, name, and the color boxes it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwatchRecord {
    /// First six characters of the swatch label, verbatim.
    pub style_number: String,
    pub style_name: String,
    pub colors: Vec<ColorSample>,
    pub bounding_box: BoundingBox,
    pub text_confidence: ParseConfidence,
}

/// A sampled color together with its nearest palette entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedColor {
    #[serde(flatten)]
    pub sample: ColorSample,
    pub matched_code: String,
    pub matched_name: String,
    pub pantone_label: Option<String>,
    /// RGB distance to the match, or `-1.0` when unmatched.
    pub distance: f64,
    /// 0..=100.
    pub confidence: f64,
}

impl MatchedColor {
    /// Sentinel record for a color with no palette entry in range.
    pub fn unmatched(sample: ColorSample) -> Self {
        Self {
            sample,
            matched_code: UNKNOWN_CODE.to_string(),
            matched_name: String::new(),
            pantone_label: None,
            distance: -1.0,
            confidence: 0.0,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.distance >= 0.0
    }
}

/// A swatch whose colors have been matched against the palette.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedSwatch {
    pub style_number: String,
    pub style_name: String,
    pub bounding_box: BoundingBox,
    pub text_confidence: ParseConfidence,
    pub colors: Vec<MatchedColor>,
}

/// A reference entry rewritten from ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    /// Position of the entry in the validated list.
    pub index: usize,
    pub corrected_entry: ReferenceEntry,
    pub reason: String,
}

/// One row of the expected-palette ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedEntry {
    pub code: String,
    pub name: String,
    /// Approximate left edge of the entry's color box, in page pixels.
    pub approximate_x: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_is_uppercase_six_digits() {
        let c = RgbColor::new(0x0a, 0xbc, 0xff);
        assert_eq!(c.to_hex(), "0ABCFF");
        assert_eq!(c.to_string(), "#0ABCFF");
    }

    #[test]
    fn hex_parses_with_or_without_hash() {
        assert_eq!(RgbColor::from_hex("#ff0000"), Some(RgbColor::new(255, 0, 0)));
        assert_eq!(RgbColor::from_hex("00FF00"), Some(RgbColor::new(0, 255, 0)));
        assert_eq!(RgbColor::from_hex("00FF"), None);
        assert_eq!(RgbColor::from_hex("zzzzzz"), None);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = RgbColor::new(0, 0, 0);
        let b = RgbColor::new(3, 4, 0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-9);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn bounding_box_rejects_zero_dimensions() {
        assert!(BoundingBox::new(0, 0, 0, 5).is_none());
        assert!(BoundingBox::new(0, 0, 5, 0).is_none());
        let b = BoundingBox::new(10, 20, 5, 6).unwrap();
        assert_eq!((b.right(), b.bottom()), (15, 26));
    }

    #[test]
    fn bounding_box_from_inclusive_spans() {
        let b = BoundingBox::from_spans(10, 10, 4, 7).unwrap();
        assert_eq!((b.width(), b.height()), (1, 4));
        assert!(BoundingBox::from_spans(5, 4, 0, 0).is_none());
    }

    #[test]
    fn bounding_box_deserialize_rejects_empty() {
        let ok: BoundingBox =
            serde_json::from_str(r#"{"x":1,"y":2,"width":3,"height":4}"#).unwrap();
        assert_eq!(ok.width(), 3);
        let bad = serde_json::from_str::<BoundingBox>(r#"{"x":1,"y":2,"width":0,"height":4}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn expand_within_clips_to_page() {
        let b = BoundingBox::new(5, 5, 10, 10).unwrap();
        let grown = b.expand_within(10, 10, 50, 100, 40).unwrap();
        assert_eq!((grown.x(), grown.y()), (0, 0));
        assert_eq!((grown.right(), grown.bottom()), (25, 40));
    }

    #[test]
    fn union_covers_both() {
        let a = BoundingBox::new(0, 0, 10, 10).unwrap();
        let b = BoundingBox::new(20, 5, 5, 20).unwrap();
        let u = a.union(&b);
        assert_eq!((u.x(), u.y(), u.right(), u.bottom()), (0, 0, 25, 25));
    }

    #[test]
    fn matched_color_serializes_flat() {
        let sample = ColorSample::new(
            RgbColor::new(1, 2, 3),
            BoundingBox::new(0, 0, 4, 4).unwrap(),
            RgbColor::WHITE,
        );
        let json = serde_json::to_value(MatchedColor::unmatched(sample)).unwrap();
        assert_eq!(json["hex"], "010203");
        assert_eq!(json["matched_code"], UNKNOWN_CODE);
        assert_eq!(json["distance"], -1.0);
    }
}
