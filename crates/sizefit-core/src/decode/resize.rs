//! Raster resizing for the resolution search.
//!
//! All functions return new `DecodedRaster` instances without modifying the input.

use super::{DecodeError, DecodedRaster, FilterType};

/// Resize a raster to exact dimensions.
///
/// # Arguments
///
/// * `raster` - The source raster to resize
/// * `width` - Target width in pixels
/// * `height` - Target height in pixels
/// * `filter` - Interpolation filter to use
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either target dimension is zero.
/// Returns `DecodeError::CorruptedFile` if the pixel buffer does not match the
/// raster's dimensions.
pub fn resize(
    raster: &DecodedRaster,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedRaster, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    // Fast path: if dimensions match, just clone
    if raster.width == width && raster.height == height {
        return Ok(raster.clone());
    }

    let view = raster
        .as_rgba_view()
        .ok_or_else(|| DecodeError::CorruptedFile("Pixel buffer size mismatch".to_string()))?;

    let resized = image::imageops::resize(&view, width, height, filter.to_image_filter());

    Ok(DecodedRaster::from_rgba_image(resized, raster.has_alpha))
}

/// Scale dimensions by a linear factor, never producing a zero dimension.
///
/// Both edges are scaled by the same factor so the aspect ratio is kept as
/// closely as integer rounding allows.
pub fn scaled_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scale = if scale.is_finite() { scale.max(0.0) } else { 1.0 };
    let w = (width as f64 * scale).round().clamp(1.0, u32::MAX as f64) as u32;
    let h = (height as f64 * scale).round().clamp(1.0, u32::MAX as f64) as u32;
    (w, h)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
