// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Color sampler — representative color of one box.

use swatchscan_core::config::SamplingConfig;
use swatchscan_core::{BoundingBox, ColorSample, RgbColor};

use super::classify::PixelClassifier;
use crate::page::raster::RasterPage;

/// Averages a bounded grid of non-background pixels inside a box.
///
/// Samples are strided so at most `samples_per_axis²` pixels are read, and
/// `inset_fraction` of each dimension is skipped at the edges to stay clear of
/// outlines and anti-aliasing. When every sample is background the center
/// pixel stands in.
#[derive(Debug, Clone)]
pub struct ColorSampler {
    config: SamplingConfig,
    classifier: PixelClassifier,
}

impl ColorSampler {
    pub fn new(config: SamplingConfig, classifier: PixelClassifier) -> Self {
        Self { config, classifier }
    }

    pub fn sample(&self, page: &RasterPage, region: &BoundingBox) -> ColorSample {
        let (x0, x1) = inset(region.x(), region.width(), self.config.inset_fraction);
        let (y0, y1) = inset(region.y(), region.height(), self.config.inset_fraction);
        let n = self.config.samples_per_axis.max(1);
        let step_x = ((x1 - x0) / n).max(1);
        let step_y = ((y1 - y0) / n).max(1);

        let mut sum = [0u64; 3];
        let mut count = 0u64;
        for y in (y0..y1).step_by(step_y as usize).take(n as usize) {
            for x in (x0..x1).step_by(step_x as usize).take(n as usize) {
                let px = page.pixel(x, y);
                if self.classifier.is_background(px) {
                    continue;
                }
                sum[0] += px.r as u64;
                sum[1] += px.g as u64;
                sum[2] += px.b as u64;
                count += 1;
            }
        }

        let rgb = if count == 0 {
            let (cx, cy) = region.center();
            page.pixel(cx, cy)
        } else {
            let avg = |s: u64| ((s + count / 2) / count) as u8;
            RgbColor::new(avg(sum[0]), avg(sum[1]), avg(sum[2]))
        };
        let corner = page.pixel(region.right() - 1, region.bottom() - 1);

        ColorSample::new(rgb, *region, corner)
    }
}

/// Shrink `[start, start + len)` by `fraction` on both sides, falling back to
/// the full span when nothing would remain.
fn inset(start: u32, len: u32, fraction: f32) -> (u32, u32) {
    let margin = (len as f32 * fraction) as u32;
    if margin * 2 >= len {
        (start, start + len)
    } else {
        (start + margin, start + len - margin)
    }
}
