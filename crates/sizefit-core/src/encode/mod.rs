//! Image encoding for the compression engine.
//!
//! This module provides functionality for:
//! - Encoding rasters to JPEG and lossy WebP with a 0-1 quality parameter
//! - Encoding rasters to PNG and single-frame GIF (quality-insensitive)
//! - Wrapping each trial output as an [`EncodeCandidate`]
//!
//! # Examples
//!
//! ```ignore
//! use sizefit_core::encode::encode_raster;
//! use sizefit_core::ImageFormat;
//!
//! let candidate = encode_raster(&raster, ImageFormat::Webp, 0.8).unwrap();
//! println!("Encoded {} bytes", candidate.size());
//! ```

mod jpeg;
mod lossless;
mod types;
mod webp;

pub use self::jpeg::encode_jpeg;
pub use self::lossless::{encode_gif, encode_png};
pub use self::types::{EncodeCandidate, EncodeError};
pub use self::webp::encode_webp;

use crate::decode::DecodedRaster;
use crate::format::ImageFormat;

/// Encode a raster in `format` and wrap the output as a candidate.
///
/// `quality` is only consulted for quality-adjustable formats; the
/// candidate's `quality` is `None` otherwise.
///
/// # Errors
///
/// Returns `EncodeError::EmptyOutput` if the codec succeeded without
/// producing bytes, plus any error of the format-specific encoder.
pub fn encode_raster(
    raster: &DecodedRaster,
    format: ImageFormat,
    quality: f32,
) -> Result<EncodeCandidate, EncodeError> {
    let bytes = match format {
        ImageFormat::Jpeg => {
            if raster.pixels.len() != raster.pixel_count() as usize * 4 {
                return Err(EncodeError::InvalidPixelData {
                    expected: raster.pixel_count() as usize * 4,
                    actual: raster.pixels.len(),
                });
            }
            encode_jpeg(
                &raster.to_rgb_flattened(),
                raster.width,
                raster.height,
                quality,
            )?
        }
        ImageFormat::Webp => encode_webp(raster, quality)?,
        ImageFormat::Png => encode_png(raster)?,
        ImageFormat::Gif => encode_gif(raster)?,
    };

    if bytes.is_empty() {
        return Err(EncodeError::EmptyOutput(format));
    }

    let quality = format
        .capability()
        .supports_quality()
        .then(|| quality.clamp(0.01, 1.0));

    Ok(EncodeCandidate {
        bytes,
        width: raster.width,
        height: raster.height,
        format,
        quality,
    })
}
