// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inputs of a run — page source, scan configuration, ground truth and the
// recognizer.

use std::path::Path;
use std::sync::Arc;

use swatchscan_catalog::ExpectedPalette;
use swatchscan_core::ScanConfig;
use swatchscan_core::error::Result;
use swatchscan_document::{ImageFileSource, PageSource, PdfPageSource, TextRecognizer};
use tracing::info;

/// Open a page source, choosing the adapter by file extension.
pub fn open_source(path: &Path) -> Result<Box<dyn PageSource>> {
    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    let source: Box<dyn PageSource> = if is_pdf {
        Box::new(PdfPageSource::open(path)?)
    } else {
        Box::new(ImageFileSource::open(path)?)
    };
    info!(path = %path.display(), pages = source.page_count(), "Page source opened");
    Ok(source)
}

/// Configuration from `path`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => {
            let config = ScanConfig::from_json_file(path)?;
            info!(path = %path.display(), "Scan configuration loaded");
            Ok(config)
        }
        None => Ok(ScanConfig::default()),
    }
}

pub fn load_expected_palette(path: Option<&Path>) -> Result<Option<ExpectedPalette>> {
    path.map(ExpectedPalette::from_json_file).transpose()
}

#[cfg(feature = "ocr")]
pub fn recognizer(models: Option<&Path>) -> Result<Arc<dyn TextRecognizer>> {
    use swatchscan_document::OcrEngine;
    use swatchscan_document::scan::ocr::OcrConfig;

    let config = models.map_or_else(OcrConfig::default, OcrConfig::from_dir);
    Ok(Arc::new(OcrEngine::new(config)?))
}

#[cfg(not(feature = "ocr"))]
pub fn recognizer(models: Option<&Path>) -> Result<Arc<dyn TextRecognizer>> {
    use swatchscan_document::NullRecognizer;

    tracing::warn!(
        models = ?models,
        "Built without the `ocr` feature; no text will be read and all labels fall back"
    );
    Ok(Arc::new(NullRecognizer))
}
