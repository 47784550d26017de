//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The bytes are not a recognized image format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The decoded image (or a requested resize target) has a zero dimension.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Filter type for image resizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterType {
    /// Bilinear interpolation (fast, acceptable quality).
    Bilinear,
    /// Catmull-Rom bicubic interpolation.
    CatmullRom,
    /// Lanczos3 interpolation (slower, highest quality).
    #[default]
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::CatmullRom => image::imageops::FilterType::CatmullRom,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// A decoded raster with RGBA pixel data.
///
/// Rasters are always stored as RGBA8 so that alpha survives a round trip
/// through lossless and WebP outputs. `has_alpha` records whether the source
/// actually carried transparency; opaque rasters are encoded as RGB.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    /// Raster width in pixels.
    pub width: u32,
    /// Raster height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    pub pixels: Vec<u8>,
    /// Whether the alpha channel carries information.
    pub has_alpha: bool,
}

impl DecodedRaster {
    /// Create a new raster with the given dimensions and RGBA pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>, has_alpha: bool) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
            has_alpha,
        }
    }

    /// Create a raster from any decoded `DynamicImage`.
    pub fn from_dynamic(img: image::DynamicImage) -> Self {
        let has_alpha = img.color().has_alpha();
        Self::from_rgba_image(img.into_rgba8(), has_alpha)
    }

    /// Create a raster from an `image::RgbaImage`.
    pub fn from_rgba_image(img: image::RgbaImage, has_alpha: bool) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
            has_alpha,
        }
    }

    /// Borrow the pixel data as an image buffer view without copying.
    pub fn as_rgba_view(&self) -> Option<image::ImageBuffer<image::Rgba<u8>, &[u8]>> {
        image::ImageBuffer::from_raw(self.width, self.height, self.pixels.as_slice())
    }

    /// RGB pixel data with any transparency composited over white.
    pub fn to_rgb_flattened(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixel_count() as usize * 3);
        for px in self.pixels.chunks_exact(4) {
            let [r, g, b, a] = [px[0], px[1], px[2], px[3]];
            if !self.has_alpha || a == 255 {
                rgb.extend_from_slice(&[r, g, b]);
                continue;
            }
            let alpha = a as f32 / 255.0;
            let inv_alpha = 1.0 - alpha;
            for c in [r, g, b] {
                rgb.push((c as f32 * alpha + 255.0 * inv_alpha).round() as u8);
            }
        }
        rgb
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check if this is an empty/invalid raster.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
