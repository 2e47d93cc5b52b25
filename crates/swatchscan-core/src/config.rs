// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan configuration.
//
// Every tuning constant the detectors, interpreter, validator and matcher use
// lives here. A `ScanConfig` is passed explicitly to each component, so tests
// can run the whole pipeline with different thresholds side by side.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwatchScanError};

/// Complete configuration for one page run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub classifier: ClassifierConfig,
    pub anchors: AnchorConfig,
    pub rows: RowConfig,
    /// Composite pass splitting a row into swatches.
    pub swatches: SegmentConfig,
    /// Box pass inside one swatch.
    pub color_boxes: SegmentConfig,
    /// Box pass inside a reference-palette row.
    pub reference_boxes: SegmentConfig,
    pub reference_band: ReferenceBandConfig,
    pub sampling: SamplingConfig,
    pub recognition: RecognitionConfig,
    pub text: TextConfig,
    pub matching: MatchingConfig,
    pub validation: ValidationConfig,
    /// Log every detected region at `info` instead of `debug`.
    #[serde(default)]
    pub trace_regions: bool,
}

/// Pixel predicate thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// All channels above this value count as white space.
    pub background_threshold: u8,
    /// Lenient white-space threshold used while segmenting filled boxes.
    pub box_fill_threshold: u8,
    pub anchor_min_red: u8,
    pub anchor_max_green: u8,
    pub anchor_max_blue: u8,
}

/// Red anchor-marker detection in the left margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Fraction of the page width scanned for anchors.
    pub margin_fraction: f32,
    /// A row is an anchor row when more than this fraction of its margin
    /// pixels are anchor-colored.
    pub min_pixel_fraction: f32,
    /// Anchors spanning fewer rows are discarded.
    pub min_rows: u32,
}

/// Vertical row segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowConfig {
    /// Horizontal sample position as a fraction of the page width.
    pub sample_x_fraction: f32,
    /// Distance moved up from the first content pixel of a row.
    pub back_off: u32,
    /// Consecutive background rows that close a row.
    pub min_gap_rows: u32,
    pub min_row_height: u32,
}

/// Parameters of one horizontal boundary pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    pub min_run_length: u32,
    pub gap_threshold: u32,
    /// Scan line position as a fraction of the region height.
    pub scan_fraction: f32,
    /// Merge boxes separated by at most this many pixels. Off by default.
    #[serde(default)]
    pub merge_gap: Option<u32>,
}

/// Reference palette band geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceBandConfig {
    /// Band used when no anchors are found, as fractions of the page height.
    pub top_fraction: f32,
    pub bottom_fraction: f32,
    /// Height of the label area below each reference box.
    pub label_height: u32,
    /// Horizontal padding around a box when cropping its label.
    pub label_padding: u32,
}

/// Color sampling inside a box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Upper bound on samples taken along each axis.
    pub samples_per_axis: u32,
    /// Fraction of each dimension skipped at the box edges.
    pub inset_fraction: f32,
}

/// Preprocessing transform applied to a region before recognition.
///
/// The declaration order is the order variants are tried in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionVariant {
    Original,
    HighContrast,
    Upscaled,
    UpscaledSharpened,
    MaxResolution,
}

impl RecognitionVariant {
    pub const ALL: [RecognitionVariant; 5] = [
        RecognitionVariant::Original,
        RecognitionVariant::HighContrast,
        RecognitionVariant::Upscaled,
        RecognitionVariant::UpscaledSharpened,
        RecognitionVariant::MaxResolution,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::HighContrast => "high-contrast",
            Self::Upscaled => "upscaled",
            Self::UpscaledSharpened => "upscaled-sharpened",
            Self::MaxResolution => "max-resolution",
        }
    }
}

/// Recognition worker pool and preprocessing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Concurrent recognition jobs.
    pub workers: usize,
    /// Time limit for all variants of one region.
    pub timeout_ms: u64,
    pub variants: Vec<RecognitionVariant>,
    pub upscale_factor: u32,
    pub max_upscale_factor: u32,
    pub contrast_boost: f32,
    pub sharpen_sigma: f32,
    pub sharpen_threshold: i32,
}

/// Text interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    /// Width of the horizontal position bucket used in fallback codes.
    pub fallback_bucket_width: u32,
    /// Names shorter than this are treated as unreadable.
    pub min_name_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Largest RGB distance accepted as a match.
    pub max_distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Horizontal distance within which a ground-truth entry may replace a
    /// failed parse.
    pub position_tolerance: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig {
                background_threshold: 240,
                box_fill_threshold: 230,
                anchor_min_red: 180,
                anchor_max_green: 100,
                anchor_max_blue: 100,
            },
            anchors: AnchorConfig {
                margin_fraction: 0.10,
                min_pixel_fraction: 0.10,
                min_rows: 8,
            },
            rows: RowConfig {
                sample_x_fraction: 0.15,
                back_off: 40,
                min_gap_rows: 20,
                min_row_height: 20,
            },
            swatches: SegmentConfig {
                min_run_length: 120,
                gap_threshold: 10,
                scan_fraction: 0.5,
                merge_gap: None,
            },
            color_boxes: SegmentConfig {
                min_run_length: 15,
                gap_threshold: 3,
                scan_fraction: 0.5,
                merge_gap: None,
            },
            reference_boxes: SegmentConfig {
                min_run_length: 20,
                gap_threshold: 10,
                scan_fraction: 0.5,
                merge_gap: None,
            },
            reference_band: ReferenceBandConfig {
                top_fraction: 0.05,
                bottom_fraction: 0.25,
                label_height: 60,
                label_padding: 10,
            },
            sampling: SamplingConfig {
                samples_per_axis: 12,
                inset_fraction: 0.15,
            },
            recognition: RecognitionConfig {
                workers: 4,
                timeout_ms: 15_000,
                variants: RecognitionVariant::ALL.to_vec(),
                upscale_factor: 2,
                max_upscale_factor: 4,
                contrast_boost: 1.6,
                sharpen_sigma: 1.0,
                sharpen_threshold: 4,
            },
            text: TextConfig {
                fallback_bucket_width: 200,
                min_name_length: 3,
            },
            matching: MatchingConfig {
                max_distance: 150.0,
            },
            validation: ValidationConfig {
                position_tolerance: 200,
            },
            trace_regions: false,
        }
    }
}

impl ScanConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the detectors cannot work with.
    pub fn validate(&self) -> Result<()> {
        let fraction = |name: &str, value: f32| -> Result<()> {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(SwatchScanError::InvalidConfig(format!(
                    "{name} must be in (0, 1], got {value}"
                )))
            }
        };

        fraction("anchors.margin_fraction", self.anchors.margin_fraction)?;
        fraction("anchors.min_pixel_fraction", self.anchors.min_pixel_fraction)?;
        fraction("rows.sample_x_fraction", self.rows.sample_x_fraction)?;
        fraction("swatches.scan_fraction", self.swatches.scan_fraction)?;
        fraction("color_boxes.scan_fraction", self.color_boxes.scan_fraction)?;
        fraction("reference_boxes.scan_fraction", self.reference_boxes.scan_fraction)?;
        fraction("reference_band.bottom_fraction", self.reference_band.bottom_fraction)?;

        if self.reference_band.top_fraction < 0.0
            || self.reference_band.top_fraction >= self.reference_band.bottom_fraction
        {
            return Err(SwatchScanError::InvalidConfig(format!(
                "reference_band.top_fraction ({}) must be below bottom_fraction ({})",
                self.reference_band.top_fraction, self.reference_band.bottom_fraction
            )));
        }
        if !(0.0..0.5).contains(&self.sampling.inset_fraction) {
            return Err(SwatchScanError::InvalidConfig(format!(
                "sampling.inset_fraction must be in [0, 0.5), got {}",
                self.sampling.inset_fraction
            )));
        }
        for (name, segment) in [
            ("swatches", &self.swatches),
            ("color_boxes", &self.color_boxes),
            ("reference_boxes", &self.reference_boxes),
        ] {
            if segment.min_run_length == 0 || segment.gap_threshold == 0 {
                return Err(SwatchScanError::InvalidConfig(format!(
                    "{name}: min_run_length and gap_threshold must be positive"
                )));
            }
        }
        if self.rows.min_gap_rows == 0 || self.anchors.min_rows == 0 {
            return Err(SwatchScanError::InvalidConfig(
                "rows.min_gap_rows and anchors.min_rows must be positive".into(),
            ));
        }
        if self.sampling.samples_per_axis == 0 {
            return Err(SwatchScanError::InvalidConfig(
                "sampling.samples_per_axis must be positive".into(),
            ));
        }
        if self.recognition.workers == 0 || self.recognition.timeout_ms == 0 {
            return Err(SwatchScanError::InvalidConfig(
                "recognition.workers and recognition.timeout_ms must be positive".into(),
            ));
        }
        if self.recognition.variants.is_empty() {
            return Err(SwatchScanError::InvalidConfig(
                "recognition.variants must name at least one variant".into(),
            ));
        }
        if self.recognition.upscale_factor == 0
            || self.recognition.max_upscale_factor < self.recognition.upscale_factor
        {
            return Err(SwatchScanError::InvalidConfig(
                "recognition upscale factors must satisfy 0 < upscale <= max_upscale".into(),
            ));
        }
        if self.text.fallback_bucket_width == 0 {
            return Err(SwatchScanError::InvalidConfig(
                "text.fallback_bucket_width must be positive".into(),
            ));
        }
        if !(self.matching.max_distance > 0.0) {
            return Err(SwatchScanError::InvalidConfig(format!(
                "matching.max_distance must be positive, got {}",
                self.matching.max_distance
            )));
        }
        Ok(())
    }
}
