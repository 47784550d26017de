//! Attempt guard: every codec call passes through here.

use crate::clock::Deadline;
use crate::codec::Codec;
use crate::decode::DecodedRaster;
use crate::encode::EncodeCandidate;
use crate::format::ImageFormat;

use super::CompressError;

/// A codec bound to a deadline.
///
/// The deadline is checked before each step starts; a step already running
/// is never interrupted.
#[derive(Clone, Copy)]
pub(crate) struct Guarded<'a> {
    codec: &'a dyn Codec,
    deadline: Deadline<'a>,
}

impl<'a> Guarded<'a> {
    pub(crate) fn new(codec: &'a dyn Codec, deadline: Deadline<'a>) -> Self {
        Self { codec, deadline }
    }

    /// The same codec under a nested deadline of at most `timeout_ms`.
    pub(crate) fn narrowed(&self, timeout_ms: u64) -> Guarded<'a> {
        Guarded {
            codec: self.codec,
            deadline: self.deadline.child(timeout_ms),
        }
    }

    pub(crate) fn decode(&self, bytes: &[u8]) -> Result<DecodedRaster, CompressError> {
        self.deadline.check("decode")?;
        Ok(self.codec.decode(bytes)?)
    }

    pub(crate) fn resize(
        &self,
        raster: &DecodedRaster,
        width: u32,
        height: u32,
    ) -> Result<DecodedRaster, CompressError> {
        self.deadline.check("resize")?;
        Ok(self.codec.resize(raster, width, height)?)
    }

    pub(crate) fn encode(
        &self,
        raster: &DecodedRaster,
        format: ImageFormat,
        quality: f32,
    ) -> Result<EncodeCandidate, CompressError> {
        self.deadline.check("encode")?;
        let candidate = self.codec.encode(raster, format, quality)?;
        log::debug!(
            "candidate {}x{} {} q={:?}: {} bytes",
            candidate.width,
            candidate.height,
            format,
            candidate.quality,
            candidate.size()
        );
        Ok(candidate)
    }

    pub(crate) fn elapsed_ms(&self) -> f64 {
        self.deadline.elapsed_ms()
    }
}

/// Keep whichever of `current` and `next` is larger.
pub(crate) fn keep_largest(
    current: Option<EncodeCandidate>,
    next: EncodeCandidate,
) -> Option<EncodeCandidate> {
    match current {
        Some(existing) if existing.size() >= next.size() => Some(existing),
        _ => Some(next),
    }
}

/// Keep whichever of `current` and `next` is smaller.
pub(crate) fn keep_smallest(
    current: Option<EncodeCandidate>,
    next: EncodeCandidate,
) -> Option<EncodeCandidate> {
    match current {
        Some(existing) if existing.size() <= next.size() => Some(existing),
        _ => Some(next),
    }
}
