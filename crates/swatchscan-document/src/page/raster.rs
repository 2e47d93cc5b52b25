// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster page — the read-only RGB pixel grid every detector works on.

use image::{DynamicImage, RgbImage};
use swatchscan_core::error::{Result, SwatchScanError};
use swatchscan_core::{BoundingBox, RgbColor};

/// A rasterized page: `width × height` RGB8 pixels, row-major, with pixel
/// `(x, y)` starting at byte `(y * width + x) * 3`.
///
/// Pixel data never changes after construction.
#[derive(Debug, Clone)]
pub struct RasterPage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterPage {
    /// Wrap a contiguous RGB8 buffer.
    ///
    /// # Errors
    ///
    /// [`SwatchScanError::NoPageImage`] for a zero-sized page, and
    /// [`SwatchScanError::ImageError`] when the buffer length does not match
    /// the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SwatchScanError::NoPageImage(format!(
                "page has zero area ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(SwatchScanError::ImageError(format!(
                "pixel buffer holds {} bytes, expected {expected} for {width}x{height} RGB",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A page filled with one color.
    pub fn filled(width: u32, height: u32, color: RgbColor) -> Result<Self> {
        let pixels = color
            .channels()
            .repeat(width as usize * height as usize);
        Self::new(width, height, pixels)
    }

    pub fn from_rgb_image(image: RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }

    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        Self::from_rgb_image(image.to_rgb8())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Color at `(x, y)`. Coordinates past the edge are clamped to it.
    pub fn pixel(&self, x: u32, y: u32) -> RgbColor {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let i = (y * self.width as usize + x) * 3;
        RgbColor::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2])
    }

    /// Overwrite a rectangle with one color. Used to compose synthetic pages.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: RgbColor) {
        let x1 = x.saturating_add(width).min(self.width);
        let y1 = y.saturating_add(height).min(self.height);
        for py in y.min(self.height)..y1 {
            for px in x.min(self.width)..x1 {
                let i = (py as usize * self.width as usize + px as usize) * 3;
                self.pixels[i..i + 3].copy_from_slice(&color.channels());
            }
        }
    }

    /// Classify pixels along row `y` for `x` in `x0..x1`.
    pub fn classify_row(
        &self,
        y: u32,
        x0: u32,
        x1: u32,
        predicate: impl Fn(RgbColor) -> bool,
    ) -> Vec<bool> {
        let x1 = x1.min(self.width);
        (x0.min(x1)..x1).map(|x| predicate(self.pixel(x, y))).collect()
    }

    /// Classify pixels along column `x` for `y` in `y0..y1`.
    pub fn classify_column(
        &self,
        x: u32,
        y0: u32,
        y1: u32,
        predicate: impl Fn(RgbColor) -> bool,
    ) -> Vec<bool> {
        let y1 = y1.min(self.height);
        (y0.min(y1)..y1).map(|y| predicate(self.pixel(x, y))).collect()
    }

    /// The whole page as a full-width bounding box.
    pub fn bounds(&self) -> BoundingBox {
        // Dimensions are checked non-zero at construction.
        BoundingBox::new(0, 0, self.width, self.height)
            .unwrap_or_else(|| unreachable!("raster pages are never empty"))
    }

    /// Copy a region out as an image suitable for recognition.
    ///
    /// # Errors
    ///
    /// [`SwatchScanError::RegionOutOfBounds`] when the box extends past the page.
    pub fn crop(&self, region: &BoundingBox) -> Result<DynamicImage> {
        if region.right() > self.width || region.bottom() > self.height {
            return Err(SwatchScanError::RegionOutOfBounds {
                region: format!(
                    "{}x{}+{}+{}",
                    region.width(),
                    region.height(),
                    region.x(),
                    region.y()
                ),
                page_width: self.width,
                page_height: self.height,
            });
        }
        let crop = RgbImage::from_fn(region.width(), region.height(), |x, y| {
            image::Rgb(self.pixel(region.x() + x, region.y() + y).channels())
        });
        Ok(DynamicImage::ImageRgb8(crop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_page() {
        assert!(matches!(
            RasterPage::new(0, 10, Vec::new()),
            Err(SwatchScanError::NoPageImage(_))
        ));
    }

    #[test]
    fn rejects_short_buffer() {
        assert!(matches!(
            RasterPage::new(2, 2, vec![0; 11]),
            Err(SwatchScanError::ImageError(_))
        ));
    }

    #[test]
    fn pixel_addressing_is_row_major() {
        let mut bytes = vec![255u8; 4 * 3 * 3];
        // (x=2, y=1) → index (1 * 4 + 2) * 3 = 18
        bytes[18..21].copy_from_slice(&[10, 20, 30]);
        let page = RasterPage::new(4, 3, bytes).unwrap();
        assert_eq!(page.pixel(2, 1), RgbColor::new(10, 20, 30));
        assert_eq!(page.pixel(0, 0), RgbColor::WHITE);
    }

    #[test]
    fn fill_rect_and_crop() {
        let mut page = RasterPage::filled(20, 10, RgbColor::WHITE).unwrap();
        page.fill_rect(5, 2, 4, 3, RgbColor::new(200, 0, 0));

        let region = BoundingBox::new(5, 2, 4, 3).unwrap();
        let crop = page.crop(&region).unwrap().to_rgb8();
        assert_eq!(crop.dimensions(), (4, 3));
        assert!(crop.pixels().all(|p| p.0 == [200, 0, 0]));
    }

    #[test]
    fn crop_outside_page_is_rejected() {
        let page = RasterPage::filled(10, 10, RgbColor::WHITE).unwrap();
        let region = BoundingBox::new(8, 8, 5, 5).unwrap();
        assert!(matches!(
            page.crop(&region),
            Err(SwatchScanError::RegionOutOfBounds { .. })
        ));
    }

    #[test]
    fn classify_row_clips_to_page() {
        let mut page = RasterPage::filled(10, 2, RgbColor::WHITE).unwrap();
        page.fill_rect(3, 0, 2, 1, RgbColor::BLACK);
        let classes = page.classify_row(0, 0, 50, |c| c == RgbColor::BLACK);
        assert_eq!(classes.len(), 10);
        assert_eq!(classes.iter().filter(|c| **c).count(), 2);
    }
}
