// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition side — the recognizer seam, preprocessing variants, and optical
// character recognition (OCR).

pub mod enhance;
pub mod recognizer;

#[cfg(feature = "ocr")]
pub mod ocr;

pub use enhance::RegionEnhancer;
pub use recognizer::{NullRecognizer, TextRecognizer};

#[cfg(feature = "ocr")]
pub use ocr::OcrEngine;
