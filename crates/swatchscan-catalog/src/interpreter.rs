// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text interpreter — turns noisy recognized text into swatch and reference
// identifiers.
//
// Each region is recognized several times, once per preprocessing variant.
// Variants are tried in order and the first one that parses into a
// well-formed record wins. When none does, loose patterns are run over all
// variants at once, and reference entries finally fall back to a synthetic
// code derived from position and color.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use swatchscan_core::config::TextConfig;
use swatchscan_core::{ColorSample, GENERIC_COLOR_NAME, ParseConfidence, ReferenceEntry, RgbColor};
use tracing::{debug, warn};

lazy_static! {
    /// Well-formed reference code: one capital letter and two or more digits.
    static ref CODE_RE: Regex = Regex::new(r"\b([A-Z]\d{2,})\b").unwrap();
    /// Looser code scan for noisy text: either case, no word boundaries, so
    /// codes glued to neighbouring text still match.
    static ref LOOSE_CODE_RE: Regex = Regex::new(r"([A-Za-z])(\d{2,})\W?").unwrap();
    static ref PANTONE_RE: Regex = Regex::new(r"(?i)(\d{1,2})-(\d{3,5})\s*TCX").unwrap();
    static ref VALID_CODE_RE: Regex = Regex::new(r"^[A-Z]\d{2,}$").unwrap();

    // Lines that can never be a color name.
    static ref CODE_ONLY_LINE_RE: Regex = Regex::new(r"^[A-Za-z]\d{2,}\W*$").unwrap();
    static ref LEADING_DIGIT_RE: Regex = Regex::new(r"^\d").unwrap();
    static ref SEPARATOR_LINE_RE: Regex = Regex::new(r"^[\W_]+$").unwrap();
    /// "A01 Crimson" / "A01: Crimson": a code with the name on the same line.
    static ref CODE_PREFIXED_NAME_RE: Regex =
        Regex::new(r"^[A-Za-z]\d{2,}[\s:.\-|]+([A-Za-z].*)$").unwrap();

    static ref SIX_DIGITS_RE: Regex = Regex::new(r"(?:^|\D)(\d{6})(?:\D|$)").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Placeholder names that mean "nothing was read".
const GENERIC_NAMES: [&str; 5] = [GENERIC_COLOR_NAME, "Unknown", "Color", "N/A", ""];

/// Length of a style number.
const STYLE_NUMBER_LEN: usize = 6;

/// Fields read from a swatch label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwatchText {
    pub style_number: String,
    pub style_name: String,
}

impl SwatchText {
    /// Six ASCII alphanumerics, at least three of them digits.
    pub fn is_valid(&self) -> bool {
        let chars: Vec<char> = self.style_number.chars().collect();
        chars.len() == STYLE_NUMBER_LEN
            && chars.iter().all(|c| c.is_ascii_alphanumeric())
            && chars.iter().filter(|c| c.is_ascii_digit()).count() >= 3
    }
}

/// Fields read from a reference label. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceText {
    pub code: Option<String>,
    pub name: Option<String>,
    pub pantone_label: Option<String>,
}

// -- Line handling ------------------------------------------------------------

/// Non-empty trimmed lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip pipes and collapse internal whitespace.
fn clean_name(raw: &str) -> String {
    WHITESPACE_RE
        .replace_all(&raw.replace('|', " "), " ")
        .trim()
        .to_string()
}

pub fn is_generic_name(name: &str) -> bool {
    let name = name.trim();
    GENERIC_NAMES
        .iter()
        .any(|generic| generic.eq_ignore_ascii_case(name))
}

pub fn is_valid_code(code: &str) -> bool {
    VALID_CODE_RE.is_match(code)
}

fn format_pantone(caps: &regex::Captures<'_>) -> String {
    format!("{}-{} TCX", &caps[1], &caps[2])
}

// -- Swatch labels ------------------------------------------------------------

/// Parse one variant's lines into a swatch label.
///
/// The style number is the first six characters of the first line, verbatim.
/// The name is the second line, or failing that whatever follows the style
/// number on the first line when it is longer than two characters. Returns
/// `None` when there are no lines.
pub fn parse_swatch_text<S: AsRef<str>>(lines: &[S]) -> Option<SwatchText> {
    let mut lines = lines
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty());
    let first = lines.next()?;

    let style_number: String = first.chars().take(STYLE_NUMBER_LEN).collect();
    let style_name = match lines.next() {
        Some(second) => clean_name(second),
        None => {
            let rest: String = first.chars().skip(STYLE_NUMBER_LEN).collect();
            let rest = clean_name(&rest);
            if rest.chars().count() > 2 { rest } else { String::new() }
        }
    };

    Some(SwatchText {
        style_number,
        style_name,
    })
}

// -- Reference labels ---------------------------------------------------------

/// Parse one variant of a reference label.
pub fn parse_reference_text(text: &str) -> ReferenceText {
    let code = CODE_RE.captures(text).map(|caps| caps[1].to_string());
    let pantone_label = PANTONE_RE.captures(text).map(|caps| format_pantone(&caps));
    let name = split_lines(text).iter().find_map(|line| name_from_line(line));

    ReferenceText {
        code,
        name,
        pantone_label,
    }
}

fn name_from_line(line: &str) -> Option<String> {
    if let Some(caps) = CODE_PREFIXED_NAME_RE.captures(line) {
        if !PANTONE_RE.is_match(line) {
            return Some(clean_name(&caps[1]));
        }
    }
    if CODE_ONLY_LINE_RE.is_match(line)
        || PANTONE_RE.is_match(line)
        || LEADING_DIGIT_RE.is_match(line)
        || SEPARATOR_LINE_RE.is_match(line)
    {
        return None;
    }
    let name = clean_name(line);
    (!name.is_empty()).then_some(name)
}

/// Interprets the recognized variants of one region.
#[derive(Debug, Clone)]
pub struct TextInterpreter {
    config: TextConfig,
}

impl TextInterpreter {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    fn is_usable_name(&self, name: &str) -> bool {
        !is_generic_name(name) && name.chars().count() >= self.config.min_name_length
    }

    /// Whether a parsed reference label is complete enough to stop trying
    /// further variants.
    pub fn is_valid_reference(&self, parsed: &ReferenceText) -> bool {
        parsed.code.as_deref().is_some_and(is_valid_code)
            && parsed.name.as_deref().is_some_and(|n| self.is_usable_name(n))
    }

    /// Early-stop predicate over raw recognized text of a reference label.
    pub fn accepts_reference_text(&self, text: &str) -> bool {
        self.is_valid_reference(&parse_reference_text(text))
    }

    /// Early-stop predicate over raw recognized text of a swatch label.
    pub fn accepts_swatch_text(&self, text: &str) -> bool {
        parse_swatch_text(&split_lines(text)).is_some_and(|parsed| parsed.is_valid())
    }

    /// Pick a swatch label from the variants.
    ///
    /// Returns `None` when no variant has any text, so the swatch is dropped.
    pub fn interpret_swatch<S: AsRef<str>>(
        &self,
        variants: &[S],
    ) -> Option<(SwatchText, ParseConfidence)> {
        let mut first_parsed: Option<SwatchText> = None;
        for (i, variant) in variants.iter().enumerate() {
            let Some(parsed) = parse_swatch_text(&split_lines(variant.as_ref())) else {
                continue;
            };
            if parsed.is_valid() {
                debug!(variant = i, style_number = %parsed.style_number, "Swatch label parsed");
                return Some((parsed, ParseConfidence::Structured));
            }
            first_parsed.get_or_insert(parsed);
        }

        let combined = join_variants(variants);
        if let Some(caps) = SIX_DIGITS_RE.captures(&combined) {
            let style_number = caps[1].to_string();
            let style_name = first_parsed.map(|p| p.style_name).unwrap_or_default();
            debug!(%style_number, "Swatch style number recovered by pattern");
            return Some((
                SwatchText {
                    style_number,
                    style_name,
                },
                ParseConfidence::Pattern,
            ));
        }

        match first_parsed {
            Some(parsed) => {
                warn!(style_number = %parsed.style_number, "Using malformed swatch label");
                Some((parsed, ParseConfidence::Pattern))
            }
            None => None,
        }
    }

    /// Build a reference entry for a sampled box from the variants of its label.
    pub fn interpret_reference<S: AsRef<str>>(
        &self,
        variants: &[S],
        sample: &ColorSample,
    ) -> ReferenceEntry {
        let mut parsed_variants = Vec::with_capacity(variants.len());
        for (i, variant) in variants.iter().enumerate() {
            let parsed = parse_reference_text(variant.as_ref());
            if self.is_valid_reference(&parsed) {
                debug!(variant = i, code = ?parsed.code, "Reference label parsed");
                let ReferenceText {
                    code,
                    name,
                    pantone_label,
                } = parsed;
                return ReferenceEntry::new(
                    code.unwrap_or_default(),
                    name.unwrap_or_default(),
                    pantone_label,
                    sample,
                    ParseConfidence::Structured,
                );
            }
            parsed_variants.push(parsed);
        }

        let combined = join_variants(variants);
        let pantone_label = PANTONE_RE
            .captures(&combined)
            .map(|caps| format_pantone(&caps));
        let name = parsed_variants
            .iter()
            .filter_map(|p| p.name.as_deref())
            .find(|n| self.is_usable_name(n))
            .map(str::to_string);

        if let Some(caps) = LOOSE_CODE_RE.captures(&combined) {
            let code = format!("{}{}", caps[1].to_ascii_uppercase(), &caps[2]);
            debug!(%code, "Reference code recovered by loose pattern");
            return ReferenceEntry::new(
                code,
                name.unwrap_or_else(|| GENERIC_COLOR_NAME.to_string()),
                pantone_label,
                sample,
                ParseConfidence::Pattern,
            );
        }

        let code = self.fallback_code(sample.bounding_box.x(), sample.rgb);
        warn!(
            %code,
            x = sample.bounding_box.x(),
            color = %sample.rgb,
            "No readable reference label; using synthetic code"
        );
        ReferenceEntry::new(
            code,
            GENERIC_COLOR_NAME,
            pantone_label,
            sample,
            ParseConfidence::Synthetic,
        )
    }

    /// `C` + position-bucket digit + three digits hashed from the color.
    /// Deterministic for a given position and color.
    pub fn fallback_code(&self, x: u32, rgb: RgbColor) -> String {
        let bucket = (x / self.config.fallback_bucket_width.max(1)) % 10;
        let digest = Sha256::digest(rgb.channels());
        let hashed = u16::from_be_bytes([digest[0], digest[1]]) % 1000;
        format!("C{bucket}{hashed:03}")
    }
}

fn join_variants<S: AsRef<str>>(variants: &[S]) -> String {
    variants
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use swatchscan_core::{BoundingBox, ScanConfig};

    fn interpreter() -> TextInterpreter {
        TextInterpreter::new(ScanConfig::default().text)
    }

    fn sample_at(x: u32, rgb: RgbColor) -> ColorSample {
        ColorSample::new(rgb, BoundingBox::new(x, 40, 30, 30).unwrap(), rgb)
    }

    #[test]
    fn swatch_number_and_second_line_name() {
        let parsed = parse_swatch_text(&["123456 SAMPLE", "My Style Name"]).unwrap();
        assert_eq!(parsed.style_number, "123456");
        assert_eq!(parsed.style_name, "My Style Name");
    }

    #[test]
    fn swatch_name_falls_back_to_first_line_remainder() {
        let parsed = parse_swatch_text(&["654321  Harbor   Jacket"]).unwrap();
        assert_eq!(parsed.style_number, "654321");
        assert_eq!(parsed.style_name, "Harbor Jacket");

        let short = parse_swatch_text(&["654321 XL"]).unwrap();
        assert_eq!(short.style_name, "");
    }

    #[test]
    fn swatch_name_strips_pipes_and_collapses_spaces() {
        let parsed = parse_swatch_text(&["", "  700812", "|Field  |  Parka|"]).unwrap();
        assert_eq!(parsed.style_number, "700812");
        assert_eq!(parsed.style_name, "Field Parka");
    }

    #[test]
    fn swatch_number_is_taken_verbatim() {
        let parsed = parse_swatch_text(&["12-45X Coat"]).unwrap();
        assert_eq!(parsed.style_number, "12-45X");
        assert!(!parsed.is_valid());
    }

    #[test]
    fn no_lines_means_no_swatch() {
        assert!(parse_swatch_text::<&str>(&[]).is_none());
        assert!(parse_swatch_text(&["   ", ""]).is_none());
        assert!(interpreter().interpret_swatch(&["", "  \n "]).is_none());
    }

    #[test]
    fn first_valid_variant_wins() {
        let variants = ["I2EA5G junk", "123456\nTrail Vest", "999999\nOther"];
        let (parsed, confidence) = interpreter().interpret_swatch(&variants).unwrap();
        assert_eq!(parsed.style_number, "123456");
        assert_eq!(parsed.style_name, "Trail Vest");
        assert_eq!(confidence, ParseConfidence::Structured);
    }

    #[test]
    fn six_digit_run_rescues_noisy_swatch() {
        let variants = ["#I23 456\nTrail Vest", "style 123456 ..."];
        let (parsed, confidence) = interpreter().interpret_swatch(&variants).unwrap();
        assert_eq!(parsed.style_number, "123456");
        assert_eq!(parsed.style_name, "Trail Vest");
        assert_eq!(confidence, ParseConfidence::Pattern);
    }

    #[test]
    fn malformed_swatch_kept_as_low_confidence() {
        let (parsed, confidence) = interpreter().interpret_swatch(&["ABCDEF\nName"]).unwrap();
        assert_eq!(parsed.style_number, "ABCDEF");
        assert_eq!(confidence, ParseConfidence::Pattern);
    }

    #[test]
    fn reference_text_fields() {
        let parsed = parse_reference_text("A01\nCrimson Red\n19-1664 TCX");
        assert_eq!(parsed.code.as_deref(), Some("A01"));
        assert_eq!(parsed.name.as_deref(), Some("Crimson Red"));
        assert_eq!(parsed.pantone_label.as_deref(), Some("19-1664 TCX"));
    }

    #[test]
    fn reference_name_skips_noise_lines() {
        let parsed = parse_reference_text("----\n19-4052tcx\n2 pcs\nB12\nOcean | Blue");
        assert_eq!(parsed.code.as_deref(), Some("B12"));
        assert_eq!(parsed.name.as_deref(), Some("Ocean Blue"));
        assert_eq!(parsed.pantone_label.as_deref(), Some("19-4052 TCX"));
    }

    #[test]
    fn reference_name_after_code_on_same_line() {
        let parsed = parse_reference_text("D07: Forest Green");
        assert_eq!(parsed.code.as_deref(), Some("D07"));
        assert_eq!(parsed.name.as_deref(), Some("Forest Green"));
    }

    #[test]
    fn structured_reference_entry() {
        let sample = sample_at(120, RgbColor::new(200, 30, 30));
        let entry =
            interpreter().interpret_reference(&["", "A01\nCrimson\n19-1664 TCX"], &sample);
        assert_eq!(entry.code, "A01");
        assert_eq!(entry.name, "Crimson");
        assert_eq!(entry.pantone_label.as_deref(), Some("19-1664 TCX"));
        assert_eq!(entry.confidence, ParseConfidence::Structured);
        assert_eq!(entry.rgb, sample.rgb);
        assert_eq!(entry.hex, sample.hex);
    }

    #[test]
    fn loose_code_recovered_across_variants() {
        let sample = sample_at(120, RgbColor::new(200, 30, 30));
        let entry = interpreter().interpret_reference(&["a01.", "Crimson"], &sample);
        assert_eq!(entry.code, "A01");
        assert_eq!(entry.name, "Crimson");
        assert_eq!(entry.confidence, ParseConfidence::Pattern);
    }

    #[test]
    fn loose_code_recovered_when_glued_to_neighbours() {
        let sample = sample_at(120, RgbColor::new(200, 30, 30));
        let i = interpreter();
        for text in ["A01Crimson", "xA01 Crimson", "A01x"] {
            let entry = i.interpret_reference(&[text], &sample);
            assert_eq!(entry.code, "A01", "text {text:?}");
            assert_eq!(entry.confidence, ParseConfidence::Pattern);
        }
    }

    #[test]
    fn unreadable_reference_gets_synthetic_code() {
        let sample = sample_at(450, RgbColor::new(10, 120, 60));
        let i = interpreter();
        let entry = i.interpret_reference(&["", "~~", "?"], &sample);
        assert_eq!(entry.confidence, ParseConfidence::Synthetic);
        assert_eq!(entry.name, GENERIC_COLOR_NAME);
        assert!(entry.code.starts_with("C2"));
        assert_eq!(entry.code.len(), 5);
        assert!(entry.code[1..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(entry.code, i.fallback_code(450, sample.rgb));
    }

    #[test]
    fn fallback_code_is_deterministic() {
        let i = interpreter();
        let red = RgbColor::new(255, 0, 0);
        assert_eq!(i.fallback_code(10, red), i.fallback_code(150, red));
        assert!(i.fallback_code(10, red).starts_with("C0"));
        assert!(i.fallback_code(2150, red).starts_with("C0"));
        assert!(i.fallback_code(1999, red).starts_with("C9"));
    }

    #[test]
    fn generic_names() {
        assert!(is_generic_name("unknown color"));
        assert!(is_generic_name(" N/A "));
        assert!(is_generic_name(""));
        assert!(!is_generic_name("Sage"));
    }

    #[test]
    fn acceptance_predicates() {
        let i = interpreter();
        assert!(i.accepts_swatch_text("123456\nName"));
        assert!(!i.accepts_swatch_text("12 34\nName"));
        assert!(!i.accepts_swatch_text(""));
        assert!(i.accepts_reference_text("A01\nCrimson"));
        assert!(!i.accepts_reference_text("A01\nNA"));
        assert!(!i.accepts_reference_text("Crimson"));
    }
}
