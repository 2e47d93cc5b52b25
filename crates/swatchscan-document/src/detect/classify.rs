// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel classifier — per-pixel background and anchor predicates.

use swatchscan_core::RgbColor;
use swatchscan_core::config::ClassifierConfig;

/// True when every channel strictly exceeds `threshold`.
pub fn is_background(rgb: RgbColor, threshold: u8) -> bool {
    rgb.r > threshold && rgb.g > threshold && rgb.b > threshold
}

/// Saturated red: the color of the margin markers beside reference rows.
pub fn is_anchor_color(rgb: RgbColor, min_red: u8, max_green: u8, max_blue: u8) -> bool {
    rgb.r > min_red && rgb.g < max_green && rgb.b < max_blue
}

/// The predicates above bound to one configuration.
#[derive(Debug, Clone)]
pub struct PixelClassifier {
    config: ClassifierConfig,
}

impl PixelClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// General white-space test.
    pub fn is_background(&self, rgb: RgbColor) -> bool {
        is_background(rgb, self.config.background_threshold)
    }

    /// Lenient test used while segmenting filled color boxes: off-white
    /// gutters between boxes count as background.
    pub fn is_box_background(&self, rgb: RgbColor) -> bool {
        is_background(rgb, self.config.box_fill_threshold)
    }

    pub fn is_anchor(&self, rgb: RgbColor) -> bool {
        is_anchor_color(
            rgb,
            self.config.anchor_min_red,
            self.config.anchor_max_green,
            self.config.anchor_max_blue,
        )
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }
}
