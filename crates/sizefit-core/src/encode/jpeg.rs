//! JPEG encoding.
//!
//! Uses the `image` crate's baseline JPEG encoder. The engine's 0-1 quality
//! parameter maps to the encoder's 1-100 scale.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;

use super::types::{normalize_quality, validate_buffer};
use super::EncodeError;
use crate::format::ImageFormat;

/// Encode RGB pixel data to JPEG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `quality` - Quality in (0, 1]; values outside are clamped
///
/// # Errors
///
/// Returns an error if the buffer doesn't match the dimensions, the
/// dimensions are zero, or the quality is not finite.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: f32,
) -> Result<Vec<u8>, EncodeError> {
    validate_buffer(pixels, width, height, 3)?;
    let quality = normalize_quality(quality)?;

    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality));
    encoder
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed {
            format: ImageFormat::Jpeg,
            message: e.to_string(),
        })?;

    Ok(buffer)
}

/// Map a 0-1 quality onto the encoder's 1-100 scale.
pub(crate) fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}


// ============================================================================
// Property-Based Tests
// ============================================================================
