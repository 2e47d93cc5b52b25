// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Color matcher — nearest reference entry by Euclidean RGB distance.

use swatchscan_core::{ColorSample, MatchedColor, MatchedSwatch, ReferenceEntry, SwatchRecord};
use tracing::debug;

/// Matches sampled colors against a reference palette.
///
/// A linear scan per color; palettes hold tens of entries at most.
#[derive(Debug, Clone)]
pub struct ColorMatcher {
    palette: Vec<ReferenceEntry>,
    max_distance: f64,
}

impl ColorMatcher {
    pub fn new(palette: Vec<ReferenceEntry>, max_distance: f64) -> Self {
        Self {
            palette,
            max_distance,
        }
    }

    pub fn palette(&self) -> &[ReferenceEntry] {
        &self.palette
    }

    /// Linear confidence: 100 at distance 0, 0 at `max_distance`. A threshold
    /// of zero or below accepts exact matches only.
    pub fn confidence(&self, distance: f64) -> f64 {
        if distance <= 0.0 {
            return 100.0;
        }
        if self.max_distance <= 0.0 {
            return 0.0;
        }
        (100.0 * (1.0 - distance / self.max_distance)).clamp(0.0, 100.0)
    }

    /// Nearest entry and its distance. The first entry wins a tie.
    pub fn nearest(&self, sample: &ColorSample) -> Option<(&ReferenceEntry, f64)> {
        let mut best: Option<(&ReferenceEntry, f64)> = None;
        for entry in &self.palette {
            let distance = sample.rgb.distance(&entry.rgb);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((entry, distance));
            }
        }
        best
    }

    pub fn match_color(&self, sample: &ColorSample) -> MatchedColor {
        match self.nearest(sample) {
            Some((entry, distance)) if distance <= self.max_distance => MatchedColor {
                sample: sample.clone(),
                matched_code: entry.code.clone(),
                matched_name: entry.name.clone(),
                pantone_label: entry.pantone_label.clone(),
                distance,
                confidence: self.confidence(distance),
            },
            nearest => {
                debug!(
                    color = %sample.rgb,
                    nearest = ?nearest.map(|(entry, d)| (&entry.code, d)),
                    "Color left unmatched"
                );
                MatchedColor::unmatched(sample.clone())
            }
        }
    }

    pub fn match_colors(&self, samples: &[ColorSample]) -> Vec<MatchedColor> {
        samples.iter().map(|s| self.match_color(s)).collect()
    }

    pub fn match_swatch(&self, swatch: &SwatchRecord) -> MatchedSwatch {
        MatchedSwatch {
            style_number: swatch.style_number.clone(),
            style_name: swatch.style_name.clone(),
            bounding_box: swatch.bounding_box,
            text_confidence: swatch.text_confidence,
            colors: self.match_colors(&swatch.colors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swatchscan_core::{BoundingBox, ParseConfidence, RgbColor, UNKNOWN_CODE};

    fn sample(rgb: RgbColor) -> ColorSample {
        ColorSample::new(rgb, BoundingBox::new(0, 0, 10, 10).unwrap(), rgb)
    }

    fn reference(code: &str, rgb: RgbColor) -> ReferenceEntry {
        ReferenceEntry::new(code, "Name", None, &sample(rgb), ParseConfidence::Structured)
    }

    fn matcher() -> ColorMatcher {
        ColorMatcher::new(
            vec![
                reference("A01", RgbColor::new(200, 30, 30)),
                reference("A02", RgbColor::new(30, 60, 200)),
                reference("A03", RgbColor::new(40, 160, 60)),
            ],
            150.0,
        )
    }

    #[test]
    fn identical_color_matches_with_full_confidence() {
        let m = matcher();
        let matched = m.match_color(&sample(RgbColor::new(30, 60, 200)));
        assert_eq!(matched.matched_code, "A02");
        assert_eq!(matched.distance, 0.0);
        assert_eq!(matched.confidence, 100.0);
        assert!(matched.is_matched());
    }

    #[test]
    fn empty_palette_leaves_everything_unmatched() {
        let m = ColorMatcher::new(Vec::new(), 150.0);
        for rgb in [RgbColor::WHITE, RgbColor::BLACK, RgbColor::new(1, 2, 3)] {
            let matched = m.match_color(&sample(rgb));
            assert_eq!(matched.matched_code, UNKNOWN_CODE);
            assert_eq!(matched.distance, -1.0);
            assert_eq!(matched.confidence, 0.0);
        }
    }

    #[test]
    fn beyond_threshold_is_unmatched() {
        let m = ColorMatcher::new(vec![reference("A01", RgbColor::BLACK)], 50.0);
        assert!(!m.match_color(&sample(RgbColor::WHITE)).is_matched());
        assert!(m.match_color(&sample(RgbColor::new(30, 40, 0))).is_matched());
    }

    #[test]
    fn matched_distance_never_exceeds_threshold() {
        let m = matcher();
        for r in (0..=255u32).step_by(15) {
            for b in (0..=255u32).step_by(15) {
                let matched = m.match_color(&sample(RgbColor::new(r as u8, 100, b as u8)));
                if matched.is_matched() {
                    assert!(matched.distance <= 150.0);
                    assert!((0.0..=100.0).contains(&matched.confidence));
                }
            }
        }
    }

    #[test]
    fn confidence_does_not_increase_with_distance() {
        let m = matcher();
        let mut previous = f64::INFINITY;
        for step in 0..40 {
            let c = m.confidence(step as f64 * 5.0);
            assert!(c <= previous);
            previous = c;
        }
        assert_eq!(m.confidence(75.0), 50.0);
        assert_eq!(m.confidence(400.0), 0.0);
    }

    #[test]
    fn zero_threshold_matches_exact_colors_only() {
        let m = ColorMatcher::new(vec![reference("A01", RgbColor::new(200, 30, 30))], 0.0);
        let exact = m.match_color(&sample(RgbColor::new(200, 30, 30)));
        assert_eq!(exact.matched_code, "A01");
        assert_eq!(exact.confidence, 100.0);
        assert!(!m.match_color(&sample(RgbColor::new(201, 30, 30))).is_matched());
        assert_eq!(m.confidence(1.0), 0.0);
    }

    #[test]
    fn first_entry_wins_ties() {
        let m = ColorMatcher::new(
            vec![
                reference("A01", RgbColor::new(100, 0, 0)),
                reference("A02", RgbColor::new(0, 100, 0)),
            ],
            150.0,
        );
        let matched = m.match_color(&sample(RgbColor::new(50, 50, 0)));
        assert_eq!(matched.matched_code, "A01");
    }

    #[test]
    fn swatch_colors_are_matched_in_order() {
        let swatch = SwatchRecord {
            style_number: "123456".into(),
            style_name: "Vest".into(),
            colors: vec![
                sample(RgbColor::new(35, 150, 70)),
                sample(RgbColor::new(210, 25, 35)),
            ],
            bounding_box: BoundingBox::new(0, 0, 100, 100).unwrap(),
            text_confidence: ParseConfidence::Structured,
        };
        let matched = matcher().match_swatch(&swatch);
        let codes: Vec<_> = matched.colors.iter().map(|c| c.matched_code.as_str()).collect();
        assert_eq!(codes, ["A03", "A01"]);
        assert_eq!(matched.style_number, "123456");
    }
}
