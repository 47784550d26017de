//! Raster decoding for JPEG, PNG, GIF and WebP sources.

use std::io::Cursor;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageReader};

use super::orientation::{apply_orientation, read_orientation};
use super::{DecodeError, DecodedRaster};
use crate::format::ImageFormat;

/// Decode image bytes into an upright RGBA raster.
///
/// The container format is sniffed from the bytes; the declared MIME type of
/// the source plays no part here. EXIF orientation is applied so the raster
/// matches what a browser would draw. Animated sources decode to their first
/// frame.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the bytes are not a recognized image.
/// Returns `DecodeError::CorruptedFile` if decoding fails part-way.
/// Returns `DecodeError::InvalidDimensions` if the image has a zero dimension.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedRaster, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let img = apply_orientation(img, read_orientation(bytes));
    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::InvalidDimensions {
            width: img.width(),
            height: img.height(),
        });
    }

    Ok(DecodedRaster::from_dynamic(img))
}

/// Check whether the source holds more than one frame.
///
/// Only the first frame is ever processed; callers use this to warn about it.
pub fn is_animated(bytes: &[u8], format: ImageFormat) -> bool {
    match format {
        ImageFormat::Gif => GifDecoder::new(Cursor::new(bytes))
            .map(|decoder| decoder.into_frames().take(2).count() > 1)
            .unwrap_or(false),
        ImageFormat::Webp => webp_has_animation_flag(bytes),
        ImageFormat::Jpeg | ImageFormat::Png => false,
    }
}

/// Extended WebP files (`VP8X`) carry an animation bit in their flags byte.
fn webp_has_animation_flag(bytes: &[u8]) -> bool {
    const ANIMATION_FLAG: u8 = 0x02;
    bytes.len() > 20
        && &bytes[0..4] == b"RIFF"
        && &bytes[8..12] == b"WEBP"
        && &bytes[12..16] == b"VP8X"
        && bytes[20] & ANIMATION_FLAG != 0
}
