// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SwatchScan — schema-free swatch and reference-palette extraction
//
// Entry point. Initialises logging, loads the page, configuration and ground
// truth, runs the extraction pipeline and prints the page report as JSON.

mod cli;
mod input;

use std::process::ExitCode;

use clap::Parser;
use swatchscan_core::error::Result;
use swatchscan_extract::PageExtractor;
use tracing::{error, info};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Extraction failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<()> {
    info!(input = %args.input.display(), "SwatchScan starting");

    let config = input::load_config(args.config.as_deref())?;
    let expected = input::load_expected_palette(args.expected_palette.as_deref())?;
    let source = input::open_source(&args.input)?;
    let recognizer = input::recognizer(args.models.as_deref())?;

    let extractor = PageExtractor::new(config, recognizer)?;
    let report = extractor
        .extract_from_source(source.as_ref(), args.page_index(), expected.as_ref())
        .await?;

    println!("{}", report.to_json_pretty()?);
    Ok(())
}
