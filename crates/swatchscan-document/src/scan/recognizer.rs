// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text recognizer seam.

use image::DynamicImage;
use swatchscan_core::error::Result;

/// Turns a sub-image into recognized text, one line per `\n`.
///
/// Implementations may return any string, including an empty one, and are
/// called from blocking worker threads.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String>;

    /// Short engine name for logs.
    fn name(&self) -> &'static str {
        "recognizer"
    }
}

/// Recognizes nothing. Useful for geometry-only runs: every reference entry
/// falls back to a synthetic code and every swatch is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRecognizer;

impl TextRecognizer for NullRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<String> {
        Ok(String::new())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
