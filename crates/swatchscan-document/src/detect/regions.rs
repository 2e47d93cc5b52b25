// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region detection — anchors, reference rows, swatch rows, swatches and color
// boxes, all found from pixel runs without any page template.
//
// Page layout assumed:
//
//   ┌────────────────────────────────────────────┐
//   │ ▌ [ref] [ref] [ref] ...   ← reference rows, │
//   │ ▌  label  label  label      red anchor at   │
//   │                             the left margin │
//   │ [swatch: label, boxes] [swatch] ...  ← rows │
//   │ [swatch] [swatch] ...                       │
//   └────────────────────────────────────────────┘

use serde::{Deserialize, Serialize};
use swatchscan_core::config::SegmentConfig;
use swatchscan_core::{BoundingBox, RgbColor, ScanConfig};
use tracing::{debug, info, instrument, warn};

use super::boundary::{BoundaryPolicy, ScanParams, merge_nearby_boxes, scan_boundaries};
use super::classify::PixelClassifier;
use crate::page::raster::RasterPage;

/// Where the reference palette rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStrategy {
    /// One row to the right of each detected anchor.
    Anchors,
    /// No anchors: a fixed horizontal band of the page.
    Band,
}

/// Geometry detection over one page. Deterministic and sequential.
#[derive(Debug, Clone)]
pub struct RegionDetector {
    config: ScanConfig,
    classifier: PixelClassifier,
}

impl RegionDetector {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            config: config.clone(),
            classifier: PixelClassifier::new(config.classifier.clone()),
        }
    }

    pub fn classifier(&self) -> &PixelClassifier {
        &self.classifier
    }

    // -- Anchors / reference palette ------------------------------------------

    /// Find red anchor markers in the left margin.
    ///
    /// Rows whose anchor-pixel fraction exceeds the configured minimum are
    /// grouped into contiguous runs; runs shorter than `min_rows` are noise.
    #[instrument(skip_all, fields(width = page.width(), height = page.height()))]
    pub fn find_anchors(&self, page: &RasterPage) -> Vec<BoundingBox> {
        let cfg = &self.config.anchors;
        let margin = ((page.width() as f32 * cfg.margin_fraction) as u32).max(1);

        let mut anchors = Vec::new();
        // (first row, last row, min x, max x) of the current run.
        let mut run: Option<(u32, u32, u32, u32)> = None;

        for y in 0..page.height() {
            let hits = page.classify_row(y, 0, margin, |px| self.classifier.is_anchor(px));
            let count = hits.iter().filter(|hit| **hit).count();
            let is_anchor_row = count as f32 / margin as f32 > cfg.min_pixel_fraction;

            if is_anchor_row {
                let first = hits.iter().position(|hit| *hit).unwrap_or(0) as u32;
                let last = hits.iter().rposition(|hit| *hit).unwrap_or(0) as u32;
                run = Some(match run {
                    Some((y0, _, x0, x1)) => (y0, y, x0.min(first), x1.max(last)),
                    None => (y, y, first, last),
                });
            } else if let Some(done) = run.take() {
                self.close_anchor(done, &mut anchors);
            }
        }
        if let Some(done) = run.take() {
            self.close_anchor(done, &mut anchors);
        }

        info!(anchors = anchors.len(), "Anchor scan complete");
        anchors
    }

    fn close_anchor(&self, (y0, y1, x0, x1): (u32, u32, u32, u32), out: &mut Vec<BoundingBox>) {
        if y1 - y0 + 1 < self.config.anchors.min_rows {
            debug!(y0, y1, "Discarding short anchor run");
            return;
        }
        if let Some(anchor) = BoundingBox::from_spans(x0, x1, y0, y1) {
            self.trace_region("anchor", &anchor);
            out.push(anchor);
        }
    }

    /// Reference palette rows: beside each anchor if there are any, otherwise
    /// the fixed fallback band.
    pub fn reference_rows(
        &self,
        page: &RasterPage,
        anchors: &[BoundingBox],
    ) -> (ReferenceStrategy, Vec<BoundingBox>) {
        if !anchors.is_empty() {
            let rows = anchors
                .iter()
                .filter_map(|anchor| {
                    BoundingBox::new(
                        anchor.right(),
                        anchor.y(),
                        page.width().saturating_sub(anchor.right()),
                        anchor.height(),
                    )
                })
                .collect();
            return (ReferenceStrategy::Anchors, rows);
        }

        let band = &self.config.reference_band;
        let y0 = (page.height() as f32 * band.top_fraction) as u32;
        let y1 = ((page.height() as f32 * band.bottom_fraction) as u32).min(page.height());
        warn!(y0, y1, "No anchors found; using fixed reference band");
        let rows = BoundingBox::new(0, y0, page.width(), y1.saturating_sub(y0))
            .into_iter()
            .collect();
        (ReferenceStrategy::Band, rows)
    }

    /// Boxes inside one reference row.
    pub fn reference_boxes(&self, page: &RasterPage, row: &BoundingBox) -> Vec<BoundingBox> {
        self.segment_boxes(page, row, &self.config.reference_boxes)
    }

    /// Area read for a reference entry's label: the box plus the label strip
    /// beneath it, padded sideways.
    pub fn reference_label_region(
        &self,
        page: &RasterPage,
        reference_box: &BoundingBox,
    ) -> Option<BoundingBox> {
        let band = &self.config.reference_band;
        reference_box.expand_within(
            band.label_padding,
            0,
            band.label_height,
            page.width(),
            page.height(),
        )
    }

    // -- Swatch rows ----------------------------------------------------------

    /// Split the page below `y_offset` into horizontal rows.
    ///
    /// A single column at `sample_x_fraction` of the width is scanned. Each
    /// row opens at its first content pixel moved up by `back_off` (never above
    /// `y_offset` or the previous row) and closes after `min_gap_rows`
    /// background pixels. Rows span the full page width.
    #[instrument(skip_all, fields(y_offset = y_offset))]
    pub fn segment_rows(&self, page: &RasterPage, y_offset: u32) -> Vec<BoundingBox> {
        let cfg = &self.config.rows;
        if y_offset >= page.height() {
            return Vec::new();
        }
        let sample_x = ((page.width() as f32 * cfg.sample_x_fraction) as u32).min(page.width() - 1);
        let content = page.classify_column(sample_x, y_offset, page.height(), |px| {
            !self.classifier.is_background(px)
        });
        let params = ScanParams {
            min_run_length: 1,
            gap_threshold: cfg.min_gap_rows,
            policy: BoundaryPolicy::Paired,
        };

        let mut rows: Vec<BoundingBox> = Vec::new();
        let mut floor = y_offset;
        for span in scan_boundaries(&content, &params) {
            let span = span.offset(y_offset);
            let start = span.start.saturating_sub(cfg.back_off).max(floor);
            floor = span.end + 1;
            if span.end + 1 - start < cfg.min_row_height {
                debug!(start, end = span.end, "Discarding short row");
                continue;
            }
            if let Some(row) = BoundingBox::from_spans(0, page.width() - 1, start, span.end) {
                self.trace_region("row", &row);
                rows.push(row);
            }
        }

        info!(rows = rows.len(), sample_x, "Row segmentation complete");
        rows
    }

    // -- Swatches and color boxes ---------------------------------------------

    /// Split a row into composite swatches. Partitioning keeps each swatch's
    /// inner white space (label margins, box gutters) inside it.
    pub fn segment_swatches(&self, page: &RasterPage, row: &BoundingBox) -> Vec<BoundingBox> {
        let segment = &self.config.swatches;
        let y = scan_line(row, segment);
        let content = page.classify_row(y, row.x(), row.right(), |px| {
            !self.classifier.is_background(px)
        });
        let params = ScanParams::from_segment(segment, BoundaryPolicy::NextStart);

        let swatches: Vec<BoundingBox> = scan_boundaries(&content, &params)
            .into_iter()
            .filter_map(|span| {
                let span = span.offset(row.x());
                BoundingBox::from_spans(span.start, span.end, row.y(), row.bottom() - 1)
            })
            .inspect(|swatch| self.trace_region("swatch", swatch))
            .collect();
        debug!(row_y = row.y(), swatches = swatches.len(), "Row split into swatches");
        swatches
    }

    /// Color boxes inside a swatch.
    pub fn color_boxes(&self, page: &RasterPage, swatch: &BoundingBox) -> Vec<BoundingBox> {
        self.segment_boxes(page, swatch, &self.config.color_boxes)
    }

    /// Find filled boxes crossing the region's scan line.
    ///
    /// The horizontal extent comes from a paired scan along the scan line with
    /// the lenient fill threshold; the vertical extent from a second paired
    /// scan down the box's center column, keeping the run that crosses the
    /// scan line.
    pub fn segment_boxes(
        &self,
        page: &RasterPage,
        region: &BoundingBox,
        segment: &SegmentConfig,
    ) -> Vec<BoundingBox> {
        let scan_y = scan_line(region, segment);
        let is_content = |px: RgbColor| !self.classifier.is_box_background(px);
        let content = page.classify_row(scan_y, region.x(), region.right(), is_content);
        let params = ScanParams::from_segment(segment, BoundaryPolicy::Paired);
        let column_params = ScanParams {
            min_run_length: 1,
            ..params
        };

        let mut boxes = Vec::new();
        for span in scan_boundaries(&content, &params) {
            let span = span.offset(region.x());
            let center_x = span.start + (span.end - span.start) / 2;
            let column = page.classify_column(center_x, region.y(), region.bottom(), is_content);
            let (y0, y1) = scan_boundaries(&column, &column_params)
                .into_iter()
                .map(|s| s.offset(region.y()))
                .find(|s| s.contains(scan_y))
                .map_or((region.y(), region.bottom() - 1), |s| (s.start, s.end));

            if let Some(found) = BoundingBox::from_spans(span.start, span.end, y0, y1) {
                self.trace_region("box", &found);
                boxes.push(found);
            }
        }

        match segment.merge_gap {
            Some(gap) => merge_nearby_boxes(&boxes, gap),
            None => boxes,
        }
    }

    fn trace_region(&self, kind: &'static str, region: &BoundingBox) {
        if self.config.trace_regions {
            info!(
                kind,
                x = region.x(),
                y = region.y(),
                width = region.width(),
                height = region.height(),
                "Region"
            );
        } else {
            debug!(
                kind,
                x = region.x(),
                y = region.y(),
                width = region.width(),
                height = region.height(),
                "Region"
            );
        }
    }
}

/// Absolute y of a region's horizontal scan line.
fn scan_line(region: &BoundingBox, segment: &SegmentConfig) -> u32 {
    let offset = (region.height() as f32 * segment.scan_fraction) as u32;
    region.y() + offset.min(region.height() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: RgbColor = RgbColor::new(220, 20, 20);
    const INK: RgbColor = RgbColor::new(30, 30, 30);

    fn detector() -> RegionDetector {
        RegionDetector::new(&ScanConfig::default())
    }

    fn blank(width: u32, height: u32) -> RasterPage {
        RasterPage::filled(width, height, RgbColor::WHITE).unwrap()
    }

    #[test]
    fn anchors_are_grouped_and_short_runs_dropped() {
        let mut page = blank(400, 300);
        page.fill_rect(5, 20, 20, 30, RED);
        page.fill_rect(5, 100, 20, 4, RED); // too short
        page.fill_rect(8, 150, 15, 12, RED);

        let anchors = detector().find_anchors(&page);
        assert_eq!(anchors.len(), 2);
        assert_eq!(
            (anchors[0].x(), anchors[0].y(), anchors[0].width(), anchors[0].height()),
            (5, 20, 20, 30)
        );
        assert_eq!((anchors[1].y(), anchors[1].height()), (150, 12));
    }

    #[test]
    fn sparse_red_does_not_make_an_anchor() {
        let mut page = blank(400, 100);
        // 3 of 40 margin pixels per row: below the 10% fraction.
        page.fill_rect(0, 10, 3, 40, RED);
        assert!(detector().find_anchors(&page).is_empty());
    }

    #[test]
    fn reference_rows_follow_anchors() {
        let page = blank(500, 400);
        let anchor = BoundingBox::new(5, 40, 20, 30).unwrap();
        let (strategy, rows) = detector().reference_rows(&page, &[anchor]);
        assert_eq!(strategy, ReferenceStrategy::Anchors);
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].x(), rows[0].y()), (25, 40));
        assert_eq!((rows[0].right(), rows[0].height()), (500, 30));
    }

    #[test]
    fn band_fallback_without_anchors() {
        let page = blank(500, 1000);
        let (strategy, rows) = detector().reference_rows(&page, &[]);
        assert_eq!(strategy, ReferenceStrategy::Band);
        assert_eq!((rows[0].y(), rows[0].bottom()), (50, 250));
        assert_eq!(rows[0].width(), 500);
    }

    #[test]
    fn rows_stay_inside_page_below_offset() {
        let mut page = blank(400, 600);
        // Column content at x = 60 (15% of 400).
        page.fill_rect(40, 130, 50, 60, INK);
        page.fill_rect(40, 300, 50, 80, INK);
        page.fill_rect(40, 560, 50, 40, INK);

        let y_offset = 120;
        let rows = detector().segment_rows(&page, y_offset);
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert!(row.y() >= y_offset);
            assert!(row.bottom() <= page.height());
            assert_eq!(row.width(), page.width());
        }
        // Back-off clamped to the offset for the first row, full 40px later.
        assert_eq!((rows[0].y(), rows[0].bottom()), (120, 190));
        assert_eq!((rows[1].y(), rows[1].bottom()), (260, 380));
        assert_eq!(rows[2].bottom(), 600);
    }

    #[test]
    fn back_off_never_reaches_previous_row() {
        let mut page = blank(400, 300);
        page.fill_rect(40, 10, 50, 30, INK);
        page.fill_rect(40, 65, 50, 30, INK);

        let rows = detector().segment_rows(&page, 0);
        assert_eq!(rows.len(), 2);
        assert!(rows[1].y() >= rows[0].bottom());
    }

    #[test]
    fn offset_past_page_yields_no_rows() {
        let page = blank(100, 100);
        assert!(detector().segment_rows(&page, 100).is_empty());
    }

    #[test]
    fn swatches_partition_a_row() {
        let mut page = blank(800, 200);
        // Two composite swatches: three boxes 5px apart each.
        for start in [20, 420] {
            for k in 0..3 {
                page.fill_rect(start + k * 65, 60, 60, 80, INK);
            }
        }
        let row = BoundingBox::new(0, 20, 800, 160).unwrap();
        let swatches = detector().segment_swatches(&page, &row);
        assert_eq!(swatches.len(), 2);
        assert_eq!((swatches[0].x(), swatches[0].right()), (20, 420));
        assert_eq!((swatches[1].x(), swatches[1].right()), (420, 800));
        assert!(swatches.iter().all(|s| s.y() == 20 && s.height() == 160));
    }

    #[test]
    fn color_boxes_get_their_own_vertical_extent() {
        let mut page = blank(400, 200);
        page.fill_rect(20, 10, 100, 8, INK); // label text above the boxes
        page.fill_rect(20, 60, 60, 80, RgbColor::new(200, 40, 40));
        page.fill_rect(85, 60, 60, 80, RgbColor::new(40, 200, 40));

        let swatch = BoundingBox::new(0, 0, 400, 200).unwrap();
        let boxes = detector().color_boxes(&page, &swatch);
        assert_eq!(boxes.len(), 2);
        assert_eq!((boxes[0].x(), boxes[0].width()), (20, 60));
        assert_eq!((boxes[0].y(), boxes[0].height()), (60, 80));
        assert_eq!(boxes[1].x(), 85);
    }

    #[test]
    fn merge_gap_joins_boxes_when_enabled() {
        let mut page = blank(400, 200);
        page.fill_rect(20, 60, 60, 80, INK);
        page.fill_rect(85, 60, 60, 80, INK);

        let mut config = ScanConfig::default();
        config.color_boxes.merge_gap = Some(6);
        let swatch = BoundingBox::new(0, 0, 400, 200).unwrap();
        let boxes = RegionDetector::new(&config).color_boxes(&page, &swatch);
        assert_eq!(boxes.len(), 1);
        assert_eq!((boxes[0].x(), boxes[0].right()), (20, 145));
    }

    #[test]
    fn label_region_extends_below_box() {
        let page = blank(300, 300);
        let reference_box = BoundingBox::new(100, 50, 40, 40).unwrap();
        let label = detector()
            .reference_label_region(&page, &reference_box)
            .unwrap();
        assert_eq!((label.x(), label.y()), (90, 50));
        assert_eq!((label.right(), label.bottom()), (150, 150));
    }
}
