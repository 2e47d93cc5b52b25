// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page sources — turn image files and scanned PDFs into raster pages.
//
// Catalog scans arrive either as plain images or as PDFs wrapping one
// full-page scan image per page. The PDF source pulls out that embedded image;
// it does not render vector content.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Document, ObjectId};
use swatchscan_core::error::{Result, SwatchScanError};
use tracing::{debug, info, instrument, warn};

use super::raster::RasterPage;

/// Anything that can produce rasterized pages.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Rasterize page `index` (0-based).
    fn render_page(&self, index: usize) -> Result<RasterPage>;
}

// -- Image files --------------------------------------------------------------

/// A single page already rendered to PNG, JPEG, TIFF, ...
pub struct ImageFileSource {
    image: DynamicImage,
}

impl ImageFileSource {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let image = image::open(path.as_ref()).map_err(|err| {
            SwatchScanError::NoPageImage(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = image.width(), height = image.height(), "Page image loaded");
        Ok(Self { image })
    }

    /// Decode an encoded image already in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(data).map_err(|err| {
            SwatchScanError::NoPageImage(format!("failed to decode page image: {err}"))
        })?;
        Ok(Self { image })
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }
}

impl PageSource for ImageFileSource {
    fn page_count(&self) -> usize {
        1
    }

    fn render_page(&self, index: usize) -> Result<RasterPage> {
        if index != 0 {
            return Err(SwatchScanError::NoPageImage(format!(
                "page {index} requested from a single-image source"
            )));
        }
        RasterPage::from_dynamic(&self.image)
    }
}

// -- Scanned PDFs -------------------------------------------------------------

/// A PDF whose pages each wrap a full-page scan image.
pub struct PdfPageSource {
    document: Document,
}

impl PdfPageSource {
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            SwatchScanError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;
        info!(pages = document.get_pages().len(), "PDF loaded");
        Ok(Self { document })
    }

    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            SwatchScanError::PdfError(format!("failed to load PDF from memory: {err}"))
        })?;
        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { document })
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        // lopdf keys pages by 1-based page number.
        let pages = self.document.get_pages();
        pages.get(&(index as u32 + 1)).copied().ok_or_else(|| {
            SwatchScanError::NoPageImage(format!(
                "page {index} out of range (document has {} pages)",
                pages.len()
            ))
        })
    }

    /// Decode the largest image XObject on the page.
    fn largest_image(&self, page_id: ObjectId) -> Result<DynamicImage> {
        let images = self
            .document
            .get_page_images(page_id)
            .map_err(|err| {
                SwatchScanError::PdfError(format!("failed to list page images: {err}"))
            })?;

        let largest = images
            .iter()
            .max_by_key(|img| pixel_area(img.width, img.height))
            .ok_or_else(|| SwatchScanError::NoPageImage("page carries no embedded image".into()))?;

        let width = u32::try_from(largest.width)
            .map_err(|_| SwatchScanError::PdfError(format!("bad image width {}", largest.width)))?;
        let height = u32::try_from(largest.height).map_err(|_| {
            SwatchScanError::PdfError(format!("bad image height {}", largest.height))
        })?;
        let filters = largest.filters.clone().unwrap_or_default();
        debug!(width, height, ?filters, color_space = ?largest.color_space, "Embedded page image");

        if filters.iter().any(|f| f == "DCTDecode") {
            return image::load_from_memory(largest.content).map_err(|err| {
                SwatchScanError::ImageError(format!("failed to decode embedded JPEG: {err}"))
            });
        }

        let stream = self
            .document
            .get_object(largest.id)
            .and_then(|object| object.as_stream())
            .map_err(|err| SwatchScanError::PdfError(format!("image stream unreadable: {err}")))?;
        let data = if filters.is_empty() {
            stream.content.clone()
        } else {
            stream.decompressed_content().map_err(|err| {
                SwatchScanError::PdfError(format!("failed to decompress image stream: {err}"))
            })?
        };

        decode_raw(
            width,
            height,
            largest.color_space.as_deref().unwrap_or("DeviceRGB"),
            largest.bits_per_component.unwrap_or(8),
            data,
        )
    }
}

impl PageSource for PdfPageSource {
    fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    #[instrument(skip(self))]
    fn render_page(&self, index: usize) -> Result<RasterPage> {
        let page_id = self.page_id(index)?;
        let image = self.largest_image(page_id)?;
        RasterPage::from_dynamic(&image)
    }
}

/// Wrap an uncompressed 8-bit sample buffer.
fn decode_raw(
    width: u32,
    height: u32,
    color_space: &str,
    bits_per_component: i64,
    mut data: Vec<u8>,
) -> Result<DynamicImage> {
    if bits_per_component != 8 {
        return Err(SwatchScanError::ImageError(format!(
            "unsupported {bits_per_component}-bit embedded image"
        )));
    }
    let channels = match color_space {
        "DeviceRGB" => 3,
        "DeviceGray" => 1,
        other => {
            warn!(color_space = other, "Unsupported embedded color space");
            return Err(SwatchScanError::ImageError(format!(
                "unsupported embedded color space {other}"
            )));
        }
    };
    let expected = width as usize * height as usize * channels;
    if data.len() < expected {
        return Err(SwatchScanError::ImageError(format!(
            "image stream holds {} bytes, expected {expected}",
            data.len()
        )));
    }
    data.truncate(expected);

    let image = if channels == 3 {
        RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
    } else {
        GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
    };
    image.ok_or_else(|| SwatchScanError::ImageError("image buffer size mismatch".into()))
}

/// Declared pixel count of an embedded image; dimensions come straight from
/// the file and may be negative or absurd.
fn pixel_area(width: i64, height: i64) -> i64 {
    width.max(0).saturating_mul(height.max(0))
}
