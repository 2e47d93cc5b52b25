// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page report — everything one run produced, ready for serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swatchscan_catalog::ValidationReport;
use swatchscan_core::error::Result;
use swatchscan_core::{BoundingBox, MatchedSwatch, ReferenceEntry, RunId};
use swatchscan_document::ReferenceStrategy;

/// What kind of region was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Reference,
    Swatch,
}

/// A region left out of the output, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRegion {
    pub kind: RegionKind,
    pub label: String,
    pub bounding_box: BoundingBox,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageReport {
    pub run_id: RunId,
    pub processed_at: DateTime<Utc>,
    pub page_width: u32,
    pub page_height: u32,
    pub anchors_found: usize,
    pub reference_strategy: ReferenceStrategy,
    /// Reference palette after ground-truth correction, if any was supplied.
    pub reference_entries: Vec<ReferenceEntry>,
    pub validation: Option<ValidationReport>,
    pub swatches: Vec<MatchedSwatch>,
    pub skipped_regions: Vec<SkippedRegion>,
}

impl PageReport {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Matched colors across all swatches.
    pub fn matched_color_count(&self) -> usize {
        self.swatches
            .iter()
            .flat_map(|s| &s.colors)
            .filter(|c| c.is_matched())
            .count()
    }

    /// One-line description for logs.
    pub fn summary(&self) -> String {
        let colors: usize = self.swatches.iter().map(|s| s.colors.len()).sum();
        format!(
            "{} reference entries ({:?}), {} swatches, {}/{} colors matched, {} regions skipped",
            self.reference_entries.len(),
            self.reference_strategy,
            self.swatches.len(),
            self.matched_color_count(),
            colors,
            self.skipped_regions.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swatchscan_core::{ColorSample, MatchedColor, ParseConfidence, RgbColor};

    fn report() -> PageReport {
        let bbox = BoundingBox::new(10, 10, 20, 20).unwrap();
        let sample = ColorSample::new(RgbColor::new(1, 2, 3), bbox, RgbColor::WHITE);
        PageReport {
            run_id: RunId::new(),
            processed_at: Utc::now(),
            page_width: 100,
            page_height: 200,
            anchors_found: 0,
            reference_strategy: ReferenceStrategy::Band,
            reference_entries: Vec::new(),
            validation: None,
            swatches: vec![MatchedSwatch {
                style_number: "123456".into(),
                style_name: "Vest".into(),
                bounding_box: bbox,
                text_confidence: ParseConfidence::Structured,
                colors: vec![MatchedColor::unmatched(sample)],
            }],
            skipped_regions: vec![SkippedRegion {
                kind: RegionKind::Swatch,
                label: "swatch r1/s0".into(),
                bounding_box: bbox,
                reason: "timed out".into(),
            }],
        }
    }

    #[test]
    fn json_carries_strategy_and_skips() {
        let json = report().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["reference_strategy"], "band");
        assert_eq!(value["skipped_regions"][0]["kind"], "swatch");
        assert_eq!(value["swatches"][0]["colors"][0]["matched_code"], "UNKNOWN");
    }

    #[test]
    fn summary_counts() {
        let summary = report().summary();
        assert_eq!(
            summary,
            "0 reference entries (Band), 1 swatches, 0/1 colors matched, 1 regions skipped"
        );
    }
}
