// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition pool — bounded, timed, failure-isolated text recognition.
//
// Every region is an independent job. A semaphore bounds how many run at
// once; each job renders the preprocessing variants in order on a blocking
// thread and stops at the first text the caller's predicate accepts. A job
// that errors, panics or runs past its deadline is skipped on its own; the
// rest of the page carries on.

use std::sync::Arc;
use std::time::Duration;

use swatchscan_core::BoundingBox;
use swatchscan_core::config::RecognitionConfig;
use swatchscan_core::error::{Result, SwatchScanError};
use swatchscan_document::{RasterPage, RegionEnhancer, TextRecognizer};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Predicate deciding whether a variant's text is good enough to stop.
pub type Acceptor = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// One region to recognize.
#[derive(Debug, Clone)]
pub struct RecognitionJob {
    /// Position in the caller's region list; results come back in this order.
    pub index: usize,
    /// Human-readable region name for logs, e.g. `reference r0/b2`.
    pub label: String,
    pub region: BoundingBox,
}

/// Texts recognized for one region, in variant order, ending with the
/// accepted one when a variant was accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedRegion {
    pub index: usize,
    pub variants: Vec<String>,
    pub accepted: bool,
}

/// A job that produced nothing.
#[derive(Debug)]
pub struct FailedJob {
    pub index: usize,
    pub label: String,
    pub region: BoundingBox,
    pub error: SwatchScanError,
}

pub struct RecognitionPool {
    recognizer: Arc<dyn TextRecognizer>,
    enhancer: Arc<RegionEnhancer>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl RecognitionPool {
    pub fn new(recognizer: Arc<dyn TextRecognizer>, config: &RecognitionConfig) -> Self {
        Self {
            recognizer,
            enhancer: Arc::new(RegionEnhancer::new(config.clone())),
            permits: Arc::new(Semaphore::new(config.workers.max(1))),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Recognize every job and return successes in job order plus failures.
    #[instrument(skip_all, fields(jobs = jobs.len(), engine = self.recognizer.name()))]
    pub async fn run(
        &self,
        page: Arc<RasterPage>,
        jobs: Vec<RecognitionJob>,
        accept: Acceptor,
    ) -> (Vec<RecognizedRegion>, Vec<FailedJob>) {
        let mut set = JoinSet::new();
        let job_count = jobs.len();

        for job in jobs {
            let page = Arc::clone(&page);
            let recognizer = Arc::clone(&self.recognizer);
            let enhancer = Arc::clone(&self.enhancer);
            let permits = Arc::clone(&self.permits);
            let accept = Arc::clone(&accept);
            let timeout = self.timeout;

            set.spawn(async move {
                let result =
                    run_job(page, &job, recognizer, enhancer, permits, accept, timeout).await;
                (job, result)
            });
        }

        let mut outcomes = Vec::with_capacity(job_count);
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => warn!(error = %err, "Recognition task lost"),
            }
        }

        let (ok, failed) = collect_successes(outcomes);
        info!(
            recognized = ok.len(),
            failed = failed.len(),
            "Recognition batch complete"
        );
        (ok, failed)
    }
}

async fn run_job(
    page: Arc<RasterPage>,
    job: &RecognitionJob,
    recognizer: Arc<dyn TextRecognizer>,
    enhancer: Arc<RegionEnhancer>,
    permits: Arc<Semaphore>,
    accept: Acceptor,
    timeout: Duration,
) -> Result<RecognizedRegion> {
    let permit = permits
        .acquire_owned()
        .await
        .map_err(|_| SwatchScanError::RecognitionCancelled(job.label.clone()))?;

    let index = job.index;
    let region = job.region;
    // The permit lives on the blocking thread so a slot frees only when the
    // engine call actually returns, not when the deadline fires.
    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        let crop = page.crop(&region)?;
        recognize_variants(recognizer.as_ref(), &enhancer, &crop, accept.as_ref(), index)
    });

    // A timed-out blocking call cannot be interrupted; its result is dropped.
    tokio::time::timeout(timeout, handle)
        .await
        .map_err(|_| SwatchScanError::RecognitionTimeout {
            region: job.label.clone(),
            timeout_ms: timeout.as_millis() as u64,
        })?
        .map_err(|err| {
            SwatchScanError::RecognitionCancelled(format!("{} ({err})", job.label))
        })?
}

/// Try each variant in order until one is accepted. Engine errors on single
/// variants are tolerated; the job fails only if every variant errored.
fn recognize_variants(
    recognizer: &dyn TextRecognizer,
    enhancer: &RegionEnhancer,
    crop: &image::DynamicImage,
    accept: &(dyn Fn(&str) -> bool + Send + Sync),
    index: usize,
) -> Result<RecognizedRegion> {
    let mut variants = Vec::new();
    let mut last_error = None;

    for &variant in enhancer.variants() {
        let rendered = enhancer.render(crop, variant);
        match recognizer.recognize(&rendered) {
            Ok(text) => {
                let accepted = accept(&text);
                variants.push(text);
                if accepted {
                    debug!(index, variant = variant.label(), "Variant accepted");
                    return Ok(RecognizedRegion {
                        index,
                        variants,
                        accepted: true,
                    });
                }
            }
            Err(err) => {
                debug!(index, variant = variant.label(), error = %err, "Variant failed");
                last_error = Some(err);
            }
        }
    }

    match last_error {
        Some(err) if variants.is_empty() => Err(err),
        _ => Ok(RecognizedRegion {
            index,
            variants,
            accepted: false,
        }),
    }
}

/// Split job outcomes into successes (sorted by job index) and failures,
/// logging each failure. Never short-circuits.
pub fn collect_successes(
    outcomes: Vec<(RecognitionJob, Result<RecognizedRegion>)>,
) -> (Vec<RecognizedRegion>, Vec<FailedJob>) {
    let mut ok = Vec::new();
    let mut failed = Vec::new();

    for (job, result) in outcomes {
        match result {
            Ok(region) => ok.push(region),
            Err(error) => {
                warn!(region = %job.label, error = %error, "Skipping region");
                failed.push(FailedJob {
                    index: job.index,
                    label: job.label,
                    region: job.region,
                    error,
                });
            }
        }
    }

    ok.sort_by_key(|r| r.index);
    failed.sort_by_key(|f| f.index);
    (ok, failed)
}
