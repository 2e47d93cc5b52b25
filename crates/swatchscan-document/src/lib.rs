// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// swatchscan-document — Page rasters and pixel-level region detection.
//
// Provides the raster page and its sources (image files, scanned PDFs), the
// pixel classifier, color sampler and boundary scanner, region detection for
// anchors, rows, swatches and color boxes, and the recognition side: the
// recognizer seam, preprocessing variants and the optional OCR engine.

pub mod detect;
pub mod page;
pub mod scan;

pub use detect::boundary::{BoundaryPolicy, ScanParams, Span, merge_nearby_boxes, scan_boundaries};
pub use detect::classify::PixelClassifier;
pub use detect::regions::{ReferenceStrategy, RegionDetector};
pub use detect::sampler::ColorSampler;
pub use page::raster::RasterPage;
pub use page::source::{ImageFileSource, PageSource, PdfPageSource};
pub use scan::enhance::RegionEnhancer;
pub use scan::recognizer::{NullRecognizer, TextRecognizer};

#[cfg(feature = "ocr")]
pub use scan::ocr::OcrEngine;
