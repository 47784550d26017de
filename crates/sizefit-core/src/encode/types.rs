//! Core types for image encoding.

use thiserror::Error;

use crate::format::ImageFormat;

/// Errors that can occur while encoding a raster.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Quality is not a finite number
    #[error("Invalid quality: {0}")]
    InvalidQuality(f32),

    /// The underlying codec rejected the image
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: ImageFormat,
        message: String,
    },

    /// The codec reported success but produced no bytes
    #[error("{0} encoder produced empty output")]
    EmptyOutput(ImageFormat),
}

/// One trial encode produced during a search.
///
/// Candidates own their bytes outright; a superseded candidate is released
/// simply by dropping it.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeCandidate {
    /// Encoded file bytes.
    pub bytes: Vec<u8>,
    /// Pixel width of the encoded raster.
    pub width: u32,
    /// Pixel height of the encoded raster.
    pub height: u32,
    /// Output format of the bytes.
    pub format: ImageFormat,
    /// Quality used, or `None` when the format ignores quality.
    pub quality: Option<f32>,
}

impl EncodeCandidate {
    /// Encoded size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn fits(&self, budget: usize) -> bool {
        self.size() <= budget
    }
}

/// Validate dimensions and buffer length for a raster about to be encoded.
pub(crate) fn validate_buffer(
    pixels: &[u8],
    width: u32,
    height: u32,
    channels: usize,
) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let expected = width as usize * height as usize * channels;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// Clamp a 0-1 quality into the encoder's accepted range.
pub(crate) fn normalize_quality(quality: f32) -> Result<f32, EncodeError> {
    if !quality.is_finite() {
        return Err(EncodeError::InvalidQuality(quality));
    }
    Ok(quality.clamp(0.01, 1.0))
}
