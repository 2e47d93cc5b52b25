// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region detection from raw pixel runs.

pub mod boundary;
pub mod classify;
pub mod regions;
pub mod sampler;

pub use boundary::{BoundaryPolicy, ScanParams, Span};
pub use classify::PixelClassifier;
pub use regions::{ReferenceStrategy, RegionDetector};
pub use sampler::ColorSampler;
