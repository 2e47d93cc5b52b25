// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boundary scanner — splits a 1-D run of pixel classifications into regions.
//
// Every segmentation pass on the page (swatches across a row, color boxes
// inside a swatch, reference boxes inside a palette row, vertical extents of
// boxes) feeds one line of classifications through `scan_boundaries`. Only the
// parameters and the policy for closing a region differ.

use serde::{Deserialize, Serialize};
use swatchscan_core::BoundingBox;
use swatchscan_core::config::SegmentConfig;

/// How a detected region is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// A region ends at its last content sample before a gap of
    /// `gap_threshold` background samples.
    Paired,
    /// A region extends up to the sample before the next region's start, so
    /// the scan line is partitioned. Used for composite swatches whose inner
    /// white space must stay inside the swatch.
    NextStart,
}

/// Parameters of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanParams {
    pub min_run_length: u32,
    pub gap_threshold: u32,
    pub policy: BoundaryPolicy,
}

impl ScanParams {
    pub fn from_segment(segment: &SegmentConfig, policy: BoundaryPolicy) -> Self {
        Self {
            min_run_length: segment.min_run_length,
            gap_threshold: segment.gap_threshold,
            policy,
        }
    }
}

/// Inclusive index range `[start, end]` along a scan line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Spans always cover at least one index.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: u32) -> bool {
        (self.start..=self.end).contains(&index)
    }

    pub fn offset(self, by: u32) -> Span {
        Span {
            start: self.start + by,
            end: self.end + by,
        }
    }
}

/// Scan `content` (true = non-background sample) and return the regions
/// found, in scan order.
pub fn scan_boundaries(content: &[bool], params: &ScanParams) -> Vec<Span> {
    let gap_threshold = params.gap_threshold.max(1);
    let mut closed: Vec<Span> = Vec::new();
    let mut open: Option<u32> = None;
    let mut last_content = 0u32;
    let mut gap = 0u32;

    for (i, &is_content) in content.iter().enumerate() {
        let i = i as u32;
        if is_content {
            if open.is_none() {
                open = Some(i);
            }
            last_content = i;
            gap = 0;
        } else if let Some(start) = open {
            gap += 1;
            if gap >= gap_threshold {
                closed.push(Span {
                    start,
                    end: last_content,
                });
                open = None;
                gap = 0;
            }
        }
    }
    if let Some(start) = open {
        closed.push(Span {
            start,
            end: last_content,
        });
    }

    let spans = match params.policy {
        BoundaryPolicy::Paired => closed,
        BoundaryPolicy::NextStart => {
            let last_index = (content.len() as u32).saturating_sub(1);
            let starts: Vec<u32> = closed.iter().map(|s| s.start).collect();
            starts
                .iter()
                .enumerate()
                .map(|(k, &start)| Span {
                    start,
                    end: starts.get(k + 1).map_or(last_index, |next| next - 1),
                })
                .collect()
        }
    };

    spans
        .into_iter()
        .filter(|span| span.len() >= params.min_run_length)
        .collect()
}

/// Merge horizontally adjacent boxes separated by at most `max_gap` pixels.
///
/// Boxes are merged in left-to-right order; merged boxes cover the union of
/// their parts.
pub fn merge_nearby_boxes(boxes: &[BoundingBox], max_gap: u32) -> Vec<BoundingBox> {
    let mut sorted = boxes.to_vec();
    sorted.sort_by_key(|b| (b.x(), b.y()));

    let mut merged: Vec<BoundingBox> = Vec::with_capacity(sorted.len());
    for current in sorted {
        match merged.last_mut() {
            Some(prev) if current.x() <= prev.right().saturating_add(max_gap) => {
                *prev = prev.union(&current);
            }
            _ => merged.push(current),
        }
    }
    merged
}
