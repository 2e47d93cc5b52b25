// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page extraction pipeline — geometry, recognition, interpretation,
// ground-truth repair and color matching for one page.
//
// Geometry is detected sequentially up front. Recognition runs through the
// bounded pool, one batch for the reference palette and one for the swatch
// labels. Anything that fails for a single region lands in
// `PageReport::skipped_regions`; only an unusable page image is fatal.

use std::sync::Arc;

use chrono::Utc;
use swatchscan_catalog::{
    ColorMatcher, ExpectedPalette, ReferenceValidator, TextInterpreter, ValidationReport,
};
use swatchscan_core::error::{Result, SwatchScanError};
use swatchscan_core::{BoundingBox, ReferenceEntry, RunId, ScanConfig, SwatchRecord};
use swatchscan_document::{
    ColorSampler, PageSource, RasterPage, ReferenceStrategy, RegionDetector, TextRecognizer,
};
use tracing::{debug, info, instrument, warn};

use crate::pool::{Acceptor, FailedJob, RecognitionJob, RecognitionPool};
use crate::report::{PageReport, RegionKind, SkippedRegion};

/// The reference palette as read from the page, before any correction.
#[derive(Debug, Clone)]
pub struct ReferencePalette {
    pub anchors_found: usize,
    pub strategy: ReferenceStrategy,
    pub entries: Vec<ReferenceEntry>,
    /// First y below every reference row and label; swatch rows start here.
    pub section_bottom: u32,
    pub skipped: Vec<SkippedRegion>,
}

/// Swatches read from the page, before color matching.
#[derive(Debug, Clone, Default)]
pub struct SwatchScan {
    pub swatches: Vec<SwatchRecord>,
    pub skipped: Vec<SkippedRegion>,
}

/// Runs every stage of extraction over one page.
pub struct PageExtractor {
    config: ScanConfig,
    detector: RegionDetector,
    sampler: ColorSampler,
    interpreter: TextInterpreter,
    pool: RecognitionPool,
}

impl PageExtractor {
    /// # Errors
    ///
    /// [`SwatchScanError::InvalidConfig`] when the configuration fails
    /// validation.
    pub fn new(config: ScanConfig, recognizer: Arc<dyn TextRecognizer>) -> Result<Self> {
        config.validate()?;
        let detector = RegionDetector::new(&config);
        let sampler = ColorSampler::new(config.sampling.clone(), detector.classifier().clone());
        let interpreter = TextInterpreter::new(config.text.clone());
        let pool = RecognitionPool::new(recognizer, &config.recognition);
        Ok(Self {
            config,
            detector,
            sampler,
            interpreter,
            pool,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Render one page of `source` and extract it.
    ///
    /// # Errors
    ///
    /// Fails only when the page cannot be rendered; everything after that is
    /// best effort.
    #[instrument(skip_all, fields(page = index))]
    pub async fn extract_from_source(
        &self,
        source: &dyn PageSource,
        index: usize,
        expected: Option<&ExpectedPalette>,
    ) -> Result<PageReport> {
        let pages = source.page_count();
        if index >= pages {
            return Err(SwatchScanError::NoPageImage(format!(
                "page {} requested, source has {pages}",
                index + 1
            )));
        }
        let page = source.render_page(index)?;
        Ok(self.extract(Arc::new(page), expected).await)
    }

    /// Extract references and swatches from a rendered page.
    ///
    /// With `expected`, unreadable reference entries are repaired before
    /// matching; without it the palette is matched as read.
    #[instrument(skip_all, fields(width = page.width(), height = page.height()))]
    pub async fn extract(
        &self,
        page: Arc<RasterPage>,
        expected: Option<&ExpectedPalette>,
    ) -> PageReport {
        let run_id = RunId::new();
        info!(%run_id, "Extracting page");

        let reference = self.extract_reference_palette(Arc::clone(&page)).await;

        let (reference_entries, validation) = match expected {
            Some(palette) => {
                let (entries, report) = self.correct_references(&reference.entries, palette);
                (entries, Some(report))
            }
            None => (reference.entries.clone(), None),
        };

        let scan = self
            .extract_swatches(Arc::clone(&page), reference.section_bottom)
            .await;

        let matcher = ColorMatcher::new(
            reference_entries.clone(),
            self.config.matching.max_distance,
        );
        let swatches = scan
            .swatches
            .iter()
            .map(|swatch| matcher.match_swatch(swatch))
            .collect();

        let mut skipped_regions = reference.skipped;
        skipped_regions.extend(scan.skipped);

        let report = PageReport {
            run_id,
            processed_at: Utc::now(),
            page_width: page.width(),
            page_height: page.height(),
            anchors_found: reference.anchors_found,
            reference_strategy: reference.strategy,
            reference_entries,
            validation,
            swatches,
            skipped_regions,
        };
        info!(summary = %report.summary(), "Page extracted");
        report
    }

    // -- Reference palette ----------------------------------------------------

    /// Locate the reference palette, read every entry's label and sample its
    /// color. Entries whose recognition failed are skipped; entries with no
    /// readable label get a synthetic code.
    #[instrument(skip_all)]
    pub async fn extract_reference_palette(&self, page: Arc<RasterPage>) -> ReferencePalette {
        let anchors = self.detector.find_anchors(&page);
        let (strategy, rows) = self.detector.reference_rows(&page, &anchors);

        let mut section_bottom = rows.iter().map(BoundingBox::bottom).max().unwrap_or(0);
        let mut boxes = Vec::new();
        let mut jobs = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            let row_boxes = self.detector.reference_boxes(&page, row);
            for (b, reference_box) in row_boxes.into_iter().enumerate() {
                let region = self
                    .detector
                    .reference_label_region(&page, &reference_box)
                    .unwrap_or(reference_box);
                section_bottom = section_bottom.max(region.bottom());
                jobs.push(RecognitionJob {
                    index: boxes.len(),
                    label: format!("reference r{r}/b{b}"),
                    region,
                });
                boxes.push(reference_box);
            }
        }
        if boxes.is_empty() {
            warn!(?strategy, rows = rows.len(), "No reference boxes found");
        }

        let interpreter = self.interpreter.clone();
        let accept: Acceptor = Arc::new(move |text: &str| interpreter.accepts_reference_text(text));
        let (recognized, failed) = self.pool.run(Arc::clone(&page), jobs, accept).await;

        let entries: Vec<ReferenceEntry> = recognized
            .iter()
            .map(|region| {
                let sample = self.sampler.sample(&page, &boxes[region.index]);
                self.interpreter.interpret_reference(&region.variants, &sample)
            })
            .collect();

        info!(
            anchors = anchors.len(),
            ?strategy,
            entries = entries.len(),
            section_bottom,
            "Reference palette read"
        );
        ReferencePalette {
            anchors_found: anchors.len(),
            strategy,
            entries,
            section_bottom,
            skipped: failed.into_iter().map(|f| skipped(RegionKind::Reference, f)).collect(),
        }
    }

    /// Repair unreadable reference entries against ground truth.
    pub fn correct_references(
        &self,
        entries: &[ReferenceEntry],
        expected: &ExpectedPalette,
    ) -> (Vec<ReferenceEntry>, ValidationReport) {
        ReferenceValidator::new(expected.clone(), &self.config).correct(entries)
    }

    // -- Swatches -------------------------------------------------------------

    /// Segment rows below `y_offset` into swatches, read each swatch's label
    /// and sample its color boxes.
    #[instrument(skip_all, fields(y_offset = y_offset))]
    pub async fn extract_swatches(&self, page: Arc<RasterPage>, y_offset: u32) -> SwatchScan {
        let mut scan = SwatchScan::default();
        let mut candidates: Vec<(BoundingBox, Vec<BoundingBox>)> = Vec::new();
        let mut jobs = Vec::new();

        for (r, row) in self.detector.segment_rows(&page, y_offset).iter().enumerate() {
            for (s, swatch) in self.detector.segment_swatches(&page, row).into_iter().enumerate() {
                let label = format!("swatch r{r}/s{s}");
                let boxes = self.detector.color_boxes(&page, &swatch);
                if boxes.is_empty() {
                    debug!(%label, "Swatch has no color boxes");
                    scan.skipped.push(SkippedRegion {
                        kind: RegionKind::Swatch,
                        label,
                        bounding_box: swatch,
                        reason: "no color boxes".into(),
                    });
                    continue;
                }
                jobs.push(RecognitionJob {
                    index: candidates.len(),
                    label,
                    region: swatch,
                });
                candidates.push((swatch, boxes));
            }
        }

        let labels: Vec<String> = jobs.iter().map(|job| job.label.clone()).collect();
        let interpreter = self.interpreter.clone();
        let accept: Acceptor = Arc::new(move |text: &str| interpreter.accepts_swatch_text(text));
        let (recognized, failed) = self.pool.run(Arc::clone(&page), jobs, accept).await;

        for region in recognized {
            let (bounding_box, boxes) = &candidates[region.index];
            let Some((text, text_confidence)) = self.interpreter.interpret_swatch(&region.variants)
            else {
                warn!(label = %labels[region.index], "No readable swatch label");
                scan.skipped.push(SkippedRegion {
                    kind: RegionKind::Swatch,
                    label: labels[region.index].clone(),
                    bounding_box: *bounding_box,
                    reason: "no readable label".into(),
                });
                continue;
            };
            let colors = boxes
                .iter()
                .map(|b| self.sampler.sample(&page, b))
                .collect();
            scan.swatches.push(SwatchRecord {
                style_number: text.style_number,
                style_name: text.style_name,
                colors,
                bounding_box: *bounding_box,
                text_confidence,
            });
        }
        scan.skipped
            .extend(failed.into_iter().map(|f| skipped(RegionKind::Swatch, f)));

        info!(
            swatches = scan.swatches.len(),
            skipped = scan.skipped.len(),
            "Swatches read"
        );
        scan
    }
}

fn skipped(kind: RegionKind, failed: FailedJob) -> SkippedRegion {
    SkippedRegion {
        kind,
        label: failed.label,
        bounding_box: failed.region,
        reason: failed.error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swatchscan_core::RgbColor;
    use swatchscan_document::NullRecognizer;

    fn extractor() -> PageExtractor {
        PageExtractor::new(ScanConfig::default(), Arc::new(NullRecognizer)).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ScanConfig::default();
        config.rows.sample_x_fraction = 0.0;
        assert!(matches!(
            PageExtractor::new(config, Arc::new(NullRecognizer)),
            Err(SwatchScanError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn blank_page_falls_back_to_band_and_finds_nothing() {
        let page = Arc::new(RasterPage::filled(400, 600, RgbColor::WHITE).unwrap());
        let report = extractor().extract(page, None).await;

        assert_eq!(report.anchors_found, 0);
        assert_eq!(report.reference_strategy, ReferenceStrategy::Band);
        assert!(report.reference_entries.is_empty());
        assert!(report.swatches.is_empty());
        assert!(report.skipped_regions.is_empty());
        assert!(report.validation.is_none());
    }

    #[tokio::test]
    async fn unreadable_references_get_synthetic_codes() {
        let mut page = RasterPage::filled(800, 600, RgbColor::WHITE).unwrap();
        // Inside the fallback band (30..150).
        page.fill_rect(100, 60, 50, 40, RgbColor::new(20, 120, 200));
        let report = extractor().extract(Arc::new(page), None).await;

        assert_eq!(report.reference_strategy, ReferenceStrategy::Band);
        assert_eq!(report.reference_entries.len(), 1);
        let entry = &report.reference_entries[0];
        assert_eq!(entry.confidence, swatchscan_core::ParseConfidence::Synthetic);
        assert!(entry.code.starts_with("C0"));
        assert_eq!(entry.rgb, RgbColor::new(20, 120, 200));
    }

    #[tokio::test]
    async fn out_of_range_page_index_is_fatal() {
        let source = swatchscan_document::ImageFileSource::from_dynamic(
            image::DynamicImage::new_rgb8(10, 10),
        );
        let err = extractor()
            .extract_from_source(&source, 1, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SwatchScanError::NoPageImage(_)));
        assert!(!err.is_local());
    }
}
