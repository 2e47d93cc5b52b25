// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page input — the raster grid and the sources that produce it.

pub mod raster;
pub mod source;

pub use raster::RasterPage;
pub use source::{ImageFileSource, PageSource, PdfPageSource};
