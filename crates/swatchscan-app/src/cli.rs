// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Extract swatches and the reference palette from a scanned catalog page.
///
/// The page report is written to stdout as JSON; logs go to stderr and follow
/// RUST_LOG (default `info`).
#[derive(Debug, Parser)]
#[command(name = "swatchscan", version)]
pub struct Cli {
    /// Page image (PNG, JPEG, ...) or scanned PDF
    #[arg(required = true)]
    pub input: PathBuf,

    /// Expected reference palette (JSON) used to repair unreadable entries
    pub expected_palette: Option<PathBuf>,

    /// Scan configuration (JSON); defaults are used otherwise
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Page of a PDF to extract, starting at 1
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Directory holding the OCR models (builds with the `ocr` feature)
    #[arg(long)]
    pub models: Option<PathBuf>,
}

impl Cli {
    /// Zero-based page index.
    pub fn page_index(&self) -> usize {
        self.page as usize - 1
    }
}
