// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// swatchscan-extract — Page extraction for SwatchScan.
//
// Ties the detectors, the recognizer and the catalog logic together: a
// bounded recognition pool with per-region timeouts, the page pipeline, and
// the serializable page report it produces.

pub mod pipeline;
pub mod pool;
pub mod report;

pub use pipeline::{PageExtractor, ReferencePalette, SwatchScan};
pub use pool::{
    Acceptor, FailedJob, RecognitionJob, RecognitionPool, RecognizedRegion, collect_successes,
};
pub use report::{PageReport, RegionKind, SkippedRegion};
