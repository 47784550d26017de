//! PNG and GIF encoding.
//!
//! Neither format has a quality knob, so shrinking their output is left
//! entirely to the resolution search.

use image::codecs::gif::GifEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};

use super::types::validate_buffer;
use super::EncodeError;
use crate::decode::DecodedRaster;
use crate::format::ImageFormat;

/// GIF quantizer speed (1 = best palette, 30 = fastest).
const GIF_QUANTIZER_SPEED: i32 = 10;

/// Encode a raster to PNG with maximum compression.
///
/// Opaque rasters are written as RGB to avoid a useless alpha channel.
pub fn encode_png(raster: &DecodedRaster) -> Result<Vec<u8>, EncodeError> {
    validate_buffer(&raster.pixels, raster.width, raster.height, 4)?;

    let mut buffer = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, PngFilter::Adaptive);

    let result = if raster.has_alpha {
        encoder.write_image(
            &raster.pixels,
            raster.width,
            raster.height,
            ExtendedColorType::Rgba8,
        )
    } else {
        let rgb = raster.to_rgb_flattened();
        encoder.write_image(&rgb, raster.width, raster.height, ExtendedColorType::Rgb8)
    };
    result.map_err(|e| EncodeError::EncodingFailed {
        format: ImageFormat::Png,
        message: e.to_string(),
    })?;

    Ok(buffer)
}

/// Encode a raster as a single-frame GIF.
pub fn encode_gif(raster: &DecodedRaster) -> Result<Vec<u8>, EncodeError> {
    validate_buffer(&raster.pixels, raster.width, raster.height, 4)?;
    if raster.width > u16::MAX as u32 || raster.height > u16::MAX as u32 {
        return Err(EncodeError::EncodingFailed {
            format: ImageFormat::Gif,
            message: format!("{}x{} exceeds GIF limits", raster.width, raster.height),
        });
    }

    let mut buffer = Vec::new();
    {
        // The trailer is written when the encoder is dropped
        let mut encoder = GifEncoder::new_with_speed(&mut buffer, GIF_QUANTIZER_SPEED);
        encoder
            .encode(
                &raster.pixels,
                raster.width,
                raster.height,
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| EncodeError::EncodingFailed {
                format: ImageFormat::Gif,
                message: e.to_string(),
            })?;
    }

    Ok(buffer)
}
