//! The decode/resize/encode seam used by the engine.
//!
//! The searches only ever talk to a [`Codec`], so the raster primitives can
//! be swapped out (for example by a deterministic synthetic codec in tests)
//! without touching the search logic.

use crate::decode::{self, DecodeError, DecodedRaster, FilterType};
use crate::encode::{self, EncodeCandidate, EncodeError};
use crate::format::ImageFormat;

/// Raster primitives the compression engine is built on.
pub trait Codec {
    /// Decode source bytes into an upright raster.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRaster, DecodeError>;

    /// Resize a raster to exact dimensions.
    fn resize(
        &self,
        raster: &DecodedRaster,
        width: u32,
        height: u32,
    ) -> Result<DecodedRaster, DecodeError>;

    /// Encode a raster; `quality` is ignored by quality-insensitive formats.
    fn encode(
        &self,
        raster: &DecodedRaster,
        format: ImageFormat,
        quality: f32,
    ) -> Result<EncodeCandidate, EncodeError>;
}

/// The production codec: `image` for decoding, resizing, JPEG/PNG/GIF,
/// libwebp for lossy WebP.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCodec {
    filter: FilterType,
}

impl ImageCodec {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> FilterType {
        self.filter
    }
}

impl Codec for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRaster, DecodeError> {
        decode::decode_image(bytes)
    }

    fn resize(
        &self,
        raster: &DecodedRaster,
        width: u32,
        height: u32,
    ) -> Result<DecodedRaster, DecodeError> {
        decode::resize(raster, width, height, self.filter)
    }

    fn encode(
        &self,
        raster: &DecodedRaster,
        format: ImageFormat,
        quality: f32,
    ) -> Result<EncodeCandidate, EncodeError> {
        encode::encode_raster(raster, format, quality)
    }
}
