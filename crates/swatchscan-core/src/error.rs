// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for SwatchScan.

use thiserror::Error;

/// Top-level error type for all SwatchScan operations.
#[derive(Debug, Error)]
pub enum SwatchScanError {
    // -- Page input --
    #[error("no usable page image: {0}")]
    NoPageImage(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("region {region} lies outside the {page_width}x{page_height} page")]
    RegionOutOfBounds {
        region: String,
        page_width: u32,
        page_height: u32,
    },

    // -- Recognition --
    #[error("OCR failed: {0}")]
    OcrError(String),

    #[error("recognition of {region} timed out after {timeout_ms}ms")]
    RecognitionTimeout { region: String, timeout_ms: u64 },

    #[error("recognition of {0} was cancelled")]
    RecognitionCancelled(String),

    // -- Configuration / ground truth --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("expected palette is unusable: {0}")]
    GroundTruth(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// How far an error reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorScope {
    /// Confined to one region, row, or swatch: log it and omit that unit.
    Region,
    /// Nothing useful can be produced for the page.
    Page,
}

impl SwatchScanError {
    /// Classify the error for the pipeline's propagation policy.
    pub fn scope(&self) -> ErrorScope {
        match self {
            SwatchScanError::OcrError(_)
            | SwatchScanError::RecognitionTimeout { .. }
            | SwatchScanError::RecognitionCancelled(_)
            | SwatchScanError::RegionOutOfBounds { .. }
            | SwatchScanError::ImageError(_) => ErrorScope::Region,

            SwatchScanError::NoPageImage(_)
            | SwatchScanError::PdfError(_)
            | SwatchScanError::InvalidConfig(_)
            | SwatchScanError::GroundTruth(_)
            | SwatchScanError::Io(_)
            | SwatchScanError::Serialization(_) => ErrorScope::Page,
        }
    }

    pub fn is_local(&self) -> bool {
        self.scope() == ErrorScope::Region
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SwatchScanError>;
