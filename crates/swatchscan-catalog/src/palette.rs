// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Expected palette — versioned ground truth for one catalog's reference row.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use swatchscan_core::ExpectedEntry;
use swatchscan_core::error::{Result, SwatchScanError};
use tracing::{debug, instrument};

use crate::interpreter::is_valid_code;

/// The reference palette a catalog is known to print, with each entry's
/// approximate horizontal position on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedPalette {
    pub version: String,
    pub catalog: String,
    pub entries: Vec<ExpectedEntry>,
}

impl ExpectedPalette {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let palette: Self = serde_json::from_str(json)?;
        palette.validate()?;
        debug!(
            version = %palette.version,
            catalog = %palette.catalog,
            entries = palette.entries.len(),
            "Expected palette loaded"
        );
        Ok(palette)
    }

    /// Entries need well-formed, unique codes and non-empty names.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(SwatchScanError::GroundTruth("palette has no entries".into()));
        }
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !is_valid_code(&entry.code) {
                return Err(SwatchScanError::GroundTruth(format!(
                    "malformed code {:?}",
                    entry.code
                )));
            }
            if entry.name.trim().is_empty() {
                return Err(SwatchScanError::GroundTruth(format!(
                    "entry {} has no name",
                    entry.code
                )));
            }
            if !seen.insert(entry.code.as_str()) {
                return Err(SwatchScanError::GroundTruth(format!(
                    "duplicate code {}",
                    entry.code
                )));
            }
        }
        Ok(())
    }

    /// Entry whose position is closest to `x`, if within `tolerance` pixels.
    /// The earlier entry wins a tie.
    pub fn nearest(&self, x: u32, tolerance: u32) -> Option<&ExpectedEntry> {
        self.entries
            .iter()
            .map(|entry| (entry.approximate_x.abs_diff(x), entry))
            .filter(|(distance, _)| *distance <= tolerance)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, entry)| entry)
    }
}
