//! Deterministic codec for exercising the searches.

use std::sync::Mutex;

use crate::codec::Codec;
use crate::decode::{DecodeError, DecodedRaster};
use crate::encode::{EncodeCandidate, EncodeError};
use crate::format::ImageFormat;

/// A codec whose output size is a closed-form function of pixel count and
/// quality: `10 + pixels * quality` bytes for lossy formats and
/// `pixels * 3` for the rest.
#[derive(Debug)]
pub(crate) struct SyntheticCodec {
    width: u32,
    height: u32,
    pub fail_decode: bool,
    pub panic_on_encode: bool,
    log: Mutex<CodecLog>,
}

#[derive(Debug, Default)]
struct CodecLog {
    qualities: Vec<f32>,
    resize_sources: Vec<(u32, u32)>,
}

impl SyntheticCodec {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            fail_decode: false,
            panic_on_encode: false,
            log: Mutex::new(CodecLog::default()),
        }
    }

    pub(crate) fn decode_raster(&self) -> DecodedRaster {
        blank(self.width, self.height)
    }

    pub(crate) fn encode_count(&self) -> usize {
        self.log.lock().unwrap().qualities.len()
    }

    pub(crate) fn qualities(&self) -> Vec<f32> {
        self.log.lock().unwrap().qualities.clone()
    }

    pub(crate) fn resize_sources(&self) -> Vec<(u32, u32)> {
        self.log.lock().unwrap().resize_sources.clone()
    }

    pub(crate) fn size_for(width: u32, height: u32, format: ImageFormat, quality: f32) -> usize {
        let pixels = width as f64 * height as f64;
        let size = if format.capability().supports_quality() {
            10.0 + pixels * quality as f64
        } else {
            pixels * 3.0
        };
        (size.round() as usize).max(1)
    }
}

fn blank(width: u32, height: u32) -> DecodedRaster {
    DecodedRaster::new(
        width,
        height,
        vec![0u8; width as usize * height as usize * 4],
        false,
    )
}

impl Codec for SyntheticCodec {
    fn decode(&self, _bytes: &[u8]) -> Result<DecodedRaster, DecodeError> {
        if self.fail_decode {
            return Err(DecodeError::CorruptedFile("synthetic decode failure".into()));
        }
        Ok(self.decode_raster())
    }

    fn resize(
        &self,
        raster: &DecodedRaster,
        width: u32,
        height: u32,
    ) -> Result<DecodedRaster, DecodeError> {
        self.log
            .lock()
            .unwrap()
            .resize_sources
            .push((raster.width, raster.height));
        Ok(blank(width, height))
    }

    fn encode(
        &self,
        raster: &DecodedRaster,
        format: ImageFormat,
        quality: f32,
    ) -> Result<EncodeCandidate, EncodeError> {
        if self.panic_on_encode {
            panic!("synthetic encoder crashed");
        }
        self.log.lock().unwrap().qualities.push(quality);
        let size = Self::size_for(raster.width, raster.height, format, quality);
        Ok(EncodeCandidate {
            bytes: vec![0u8; size],
            width: raster.width,
            height: raster.height,
            format,
            quality: format.capability().supports_quality().then_some(quality),
        })
    }
}
