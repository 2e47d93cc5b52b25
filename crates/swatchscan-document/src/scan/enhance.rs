// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region enhancer — the deterministic preprocessing variants fed to the text
// recognizer, one at a time, in `RecognitionVariant` order.

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::contrast::otsu_level;
use swatchscan_core::RecognitionVariant;
use swatchscan_core::config::RecognitionConfig;
use tracing::{debug, instrument};

/// Upscaled renders are capped at this many pixels on their longer side.
const MAX_RENDER_DIMENSION: u32 = 6000;

/// Renders recognition variants of a cropped region.
#[derive(Debug, Clone)]
pub struct RegionEnhancer {
    config: RecognitionConfig,
}

impl RegionEnhancer {
    pub fn new(config: RecognitionConfig) -> Self {
        Self { config }
    }

    /// Variants to try, in order.
    pub fn variants(&self) -> &[RecognitionVariant] {
        &self.config.variants
    }

    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn render(&self, image: &DynamicImage, variant: RecognitionVariant) -> DynamicImage {
        let rendered = match variant {
            RecognitionVariant::Original => image.clone(),
            RecognitionVariant::HighContrast => binarize_otsu(image),
            RecognitionVariant::Upscaled => upscale(image, self.config.upscale_factor),
            RecognitionVariant::UpscaledSharpened => upscale(image, self.config.upscale_factor)
                .unsharpen(self.config.sharpen_sigma, self.config.sharpen_threshold),
            RecognitionVariant::MaxResolution => adjust_contrast(
                &upscale(image, self.config.max_upscale_factor),
                self.config.contrast_boost,
            ),
        };
        debug!(
            variant = variant.label(),
            out_w = rendered.width(),
            out_h = rendered.height(),
            "Variant rendered"
        );
        rendered
    }
}

/// Grayscale, then a global threshold at the Otsu level.
fn binarize_otsu(image: &DynamicImage) -> DynamicImage {
    let gray = image.to_luma8();
    let level = otsu_level(&gray);
    let binary = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] <= level {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });
    DynamicImage::ImageLuma8(binary)
}

/// Integer Lanczos3 upscale, reduced when it would exceed the render cap.
fn upscale(image: &DynamicImage, factor: u32) -> DynamicImage {
    let longest = image.width().max(image.height()).max(1);
    let factor = factor.min(MAX_RENDER_DIMENSION / longest).max(1);
    if factor == 1 {
        return image.clone();
    }
    image.resize_exact(
        image.width() * factor,
        image.height() * factor,
        FilterType::Lanczos3,
    )
}

/// Linear contrast stretch around mid-gray.
fn adjust_contrast(image: &DynamicImage, factor: f32) -> DynamicImage {
    let rgb = image.to_rgb8();
    let adjust = |channel: u8| -> u8 {
        let val = factor * (channel as f32 - 128.0) + 128.0;
        val.clamp(0.0, 255.0) as u8
    };
    let contrasted = RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let Rgb([r, g, b]) = *rgb.get_pixel(x, y);
        Rgb([adjust(r), adjust(g), adjust(b)])
    });
    DynamicImage::ImageRgb8(contrasted)
}
