// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reference validator — repairs unreadable reference entries from ground
// truth, matched by horizontal position.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use swatchscan_core::{Correction, ParseConfidence, ReferenceEntry, ScanConfig};
use tracing::{info, instrument, warn};

use crate::interpreter::is_generic_name;
use crate::palette::ExpectedPalette;

lazy_static! {
    static ref SYNTHETIC_CODE_RE: Regex = Regex::new(r"^C\d{4}$").unwrap();
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// True when nothing needed correcting.
    pub is_valid: bool,
    pub corrections: Vec<Correction>,
    /// Flagged entries with no expected entry nearby.
    pub unresolved: usize,
    pub summary: String,
}

#[derive(Debug, Clone)]
pub struct ReferenceValidator {
    palette: ExpectedPalette,
    position_tolerance: u32,
    min_name_length: usize,
}

impl ReferenceValidator {
    pub fn new(palette: ExpectedPalette, config: &ScanConfig) -> Self {
        Self {
            palette,
            position_tolerance: config.validation.position_tolerance,
            min_name_length: config.text.min_name_length,
        }
    }

    /// True when an entry's code is synthetic or its name was not really read.
    pub fn is_ocr_failure(&self, entry: &ReferenceEntry) -> bool {
        SYNTHETIC_CODE_RE.is_match(&entry.code)
            || is_generic_name(&entry.name)
            || entry.name.trim().chars().count() < self.min_name_length
    }

    pub fn palette(&self) -> &ExpectedPalette {
        &self.palette
    }

    /// Report what `correct` would change, without changing anything.
    pub fn validate(&self, entries: &[ReferenceEntry]) -> ValidationReport {
        self.correct(entries).1
    }

    /// Replace code and name of every OCR failure that has an expected entry
    /// within tolerance of its x position. Colors are never touched, and
    /// entries that look correctly read pass through as they are.
    #[instrument(skip_all, fields(entries = entries.len(), catalog = %self.palette.catalog))]
    pub fn correct(&self, entries: &[ReferenceEntry]) -> (Vec<ReferenceEntry>, ValidationReport) {
        let mut corrected = entries.to_vec();
        let mut corrections = Vec::new();
        let mut flagged = 0usize;
        let mut unresolved = 0usize;

        for (index, entry) in corrected.iter_mut().enumerate() {
            if !self.is_ocr_failure(entry) {
                continue;
            }
            flagged += 1;
            let x = entry.bounding_box.x();
            let Some(expected) = self.palette.nearest(x, self.position_tolerance) else {
                warn!(index, code = %entry.code, x, "No expected entry near unreadable reference");
                unresolved += 1;
                continue;
            };

            let reason = format!(
                "OCR read {:?} / {:?}; expected {} {} at x≈{} (entry at x={}, Δ={}px)",
                entry.code,
                entry.name,
                expected.code,
                expected.name,
                expected.approximate_x,
                x,
                expected.approximate_x.abs_diff(x),
            );
            entry.code = expected.code.clone();
            entry.name = expected.name.clone();
            entry.confidence = ParseConfidence::Corrected;
            corrections.push(Correction {
                index,
                corrected_entry: entry.clone(),
                reason,
            });
        }

        let summary = format!(
            "{} of {} reference entries flagged: {} corrected, {} unresolved",
            flagged,
            entries.len(),
            corrections.len(),
            unresolved
        );
        info!(flagged, corrected = corrections.len(), unresolved, "Reference validation complete");

        let report = ValidationReport {
            is_valid: corrections.is_empty(),
            corrections,
            unresolved,
            summary,
        };
        (corrected, report)
    }
}
