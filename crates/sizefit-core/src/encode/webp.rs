//! Lossy WebP encoding through libwebp.
//!
//! The `image` crate only writes lossless WebP, which would make WebP
//! quality-insensitive. libwebp's simple encoder gives the lossy quality
//! knob the search depends on.

use super::types::{normalize_quality, validate_buffer};
use super::EncodeError;
use crate::decode::DecodedRaster;
use crate::format::ImageFormat;

/// WebP's hard limit on either dimension.
const MAX_WEBP_DIMENSION: u32 = 16383;

/// Encode a raster to lossy WebP.
///
/// Opaque rasters are encoded from RGB so no alpha plane is written.
pub fn encode_webp(raster: &DecodedRaster, quality: f32) -> Result<Vec<u8>, EncodeError> {
    validate_buffer(&raster.pixels, raster.width, raster.height, 4)?;
    let quality = normalize_quality(quality)?;

    if raster.width > MAX_WEBP_DIMENSION || raster.height > MAX_WEBP_DIMENSION {
        return Err(EncodeError::EncodingFailed {
            format: ImageFormat::Webp,
            message: format!(
                "{}x{} exceeds the {} pixel limit",
                raster.width, raster.height, MAX_WEBP_DIMENSION
            ),
        });
    }

    let rgb;
    let encoder = if raster.has_alpha {
        webp::Encoder::from_rgba(&raster.pixels, raster.width, raster.height)
    } else {
        rgb = raster.to_rgb_flattened();
        webp::Encoder::from_rgb(&rgb, raster.width, raster.height)
    };

    let memory = encoder
        .encode_simple(false, quality * 100.0)
        .map_err(|e| EncodeError::EncodingFailed {
            format: ImageFormat::Webp,
            message: format!("{:?}", e),
        })?;

    Ok(memory.to_vec())
}
