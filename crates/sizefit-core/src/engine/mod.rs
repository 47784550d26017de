//! The size-targeting compression engine.
//!
//! A request flows through up to three stages, stopping at the first that
//! produces a candidate within budget:
//!
//! 1. **Direct fit** - the source already fits and is returned untouched.
//! 2. **Quality search** - lossy outputs are re-encoded at the original
//!    dimensions with bisection or adaptive-step quality search.
//! 3. **Resolution search** - the raster is scaled down (and re-grown on
//!    large undershoots) at a fixed quality.
//!
//! Every decode, resize and encode runs behind the request deadline, and the
//! resolution stage additionally runs under its own shorter sub-deadline.
//!
//! # Examples
//!
//! ```ignore
//! use sizefit_core::{compress_to_target_size, SourceImage, TargetFormat};
//!
//! let source = SourceImage::new(bytes, "image/jpeg", "photo.jpg");
//! let result = compress_to_target_size(&source, 200.0, TargetFormat::KeepOriginal);
//! println!("{} -> {} bytes", result.original_size(), result.size());
//! ```

mod error;
mod guard;
mod quality;
mod resolution;

#[cfg(test)]
mod scenarios;
#[cfg(test)]
pub(crate) mod testing;

pub use self::error::CompressError;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;

use crate::clock::{Clock, Deadline, SystemClock};
use crate::codec::{Codec, ImageCodec};
use crate::config::{ConfigError, EngineConfig, QualityStrategy};
use crate::decode;
use crate::encode::EncodeCandidate;
use crate::format::{output_file_name, ImageFormat, TargetFormat};
use crate::request::{CompressionRequest, SourceImage};
use crate::result::{
    BudgetFit, CompressedImage, CompressionFailure, FailureKind, ProcessedImage, Strategy,
};

use self::guard::Guarded;
use self::quality::{adaptive_search, bisection_search, QualityOutcome};
use self::resolution::{resolution_search, ResolutionOutcome};

/// Compresses images to fit a byte budget.
///
/// Generic over the raster [`Codec`] and the [`Clock`] used for deadlines;
/// the defaults are the production codec and the system clock.
#[derive(Debug)]
pub struct CompressionEngine<C = ImageCodec, K = SystemClock> {
    config: EngineConfig,
    codec: C,
    clock: K,
}

impl CompressionEngine {
    /// Create an engine with the production codec and system clock.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` fails validation.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            codec: ImageCodec::new(config.resize_filter),
            clock: SystemClock::new(),
            config,
        })
    }
}

impl Default for CompressionEngine {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            codec: ImageCodec::new(config.resize_filter),
            clock: SystemClock::new(),
            config,
        }
    }
}

impl<C: Codec, K: Clock> CompressionEngine<C, K> {
    /// Create an engine from explicit parts.
    ///
    /// Targets without `std::time::Instant` (such as `wasm32-unknown-unknown`)
    /// must build their engine this way with their own [`Clock`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `config` fails validation.
    pub fn from_parts(config: EngineConfig, codec: C, clock: K) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            codec,
            clock,
        })
    }

    /// Replace the raster codec.
    pub fn with_codec<C2: Codec>(self, codec: C2) -> CompressionEngine<C2, K> {
        CompressionEngine {
            config: self.config,
            codec,
            clock: self.clock,
        }
    }

    /// Replace the deadline clock.
    pub fn with_clock<K2: Clock>(self, clock: K2) -> CompressionEngine<C, K2> {
        CompressionEngine {
            config: self.config,
            codec: self.codec,
            clock,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compress one request.
    ///
    /// Never panics and never returns an error: every outcome, including a
    /// codec panic, is reported as a [`ProcessedImage`].
    pub fn compress(&self, request: &CompressionRequest<'_>) -> ProcessedImage {
        let source = request.source();
        match panic::catch_unwind(AssertUnwindSafe(|| self.run(request))) {
            Ok(Ok(image)) => {
                log::info!(
                    "{}: {} -> {} bytes ({}, {}x{}, {})",
                    source.file_name(),
                    source.len(),
                    image.size(),
                    image.format,
                    image.width,
                    image.height,
                    image.strategy.as_str()
                );
                ProcessedImage::Success(image)
            }
            Ok(Err(err)) => {
                log::warn!("{}: {}", source.file_name(), err);
                ProcessedImage::Failure(CompressionFailure::from_error(&err, source))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("{}: codec panicked: {}", source.file_name(), message);
                ProcessedImage::Failure(CompressionFailure::new(
                    FailureKind::EncodeFailure,
                    format!("codec panicked: {message}"),
                    source,
                ))
            }
        }
    }

    /// Validate the target and compress `source`.
    ///
    /// An invalid target is reported as a `FailureKind::InvalidRequest`
    /// failure rather than an error.
    pub fn compress_source(
        &self,
        source: &SourceImage,
        target_kb: f64,
        format: TargetFormat,
    ) -> ProcessedImage {
        match CompressionRequest::new(source, target_kb, format) {
            Ok(request) => self.compress(&request),
            Err(err) => {
                log::warn!("{}: {}", source.file_name(), err);
                ProcessedImage::Failure(CompressionFailure::new(
                    FailureKind::InvalidRequest,
                    err.to_string(),
                    source,
                ))
            }
        }
    }

    fn run(&self, request: &CompressionRequest<'_>) -> Result<CompressedImage, CompressError> {
        let source = request.source();
        let budget = request.budget_bytes();
        let guard = Guarded::new(
            &self.codec,
            Deadline::start(&self.clock, self.config.timeout_ms),
        );

        let source_format = ImageFormat::detect(source.mime_type(), source.bytes())
            .ok_or_else(|| CompressError::UnknownFormat(source.mime_type().to_string()))?;
        let original = guard.decode(source.bytes())?;

        if source.len() <= budget {
            let candidate = EncodeCandidate {
                bytes: source.bytes().to_vec(),
                width: original.width,
                height: original.height,
                format: source_format,
                quality: None,
            };
            return Ok(finish(request, candidate, Strategy::DirectFit, BudgetFit::WithinBudget));
        }

        if decode::is_animated(source.bytes(), source_format) {
            log::warn!(
                "{}: animated source, only the first frame is kept",
                source.file_name()
            );
        }

        let output = request.format().output_for(source_format);
        let mut closest: Option<(EncodeCandidate, Strategy)> = None;
        let mut seed_size = source.len();

        if output.capability().supports_quality() {
            let outcome = match self.config.quality_strategy.resolve(output) {
                QualityStrategy::Adaptive => {
                    adaptive_search(&guard, &original, output, budget, &self.config.adaptive)?
                }
                _ => bisection_search(&guard, &original, output, budget, &self.config.bisection)?,
            };
            match outcome {
                QualityOutcome::Fit(candidate) => {
                    return Ok(finish(
                        request,
                        candidate,
                        Strategy::QualitySearch,
                        BudgetFit::WithinBudget,
                    ));
                }
                QualityOutcome::NoFit { smallest } => {
                    if let Some(smallest) = smallest {
                        seed_size = smallest.size();
                        closest = Some((smallest, Strategy::QualitySearch));
                    }
                }
            }
        }

        let narrowed = guard.narrowed(self.config.resolution_timeout_ms);
        let outcome = resolution_search(
            &narrowed,
            &original,
            output,
            budget,
            seed_size,
            &self.config.resolution,
        )?;
        match outcome {
            ResolutionOutcome::Fit(candidate) => Ok(finish(
                request,
                candidate,
                Strategy::ResolutionSearch,
                BudgetFit::WithinBudget,
            )),
            ResolutionOutcome::Exhausted {
                closest: resized,
                attempts,
            } => {
                if let Some(resized) = resized {
                    closest = match closest {
                        Some((kept, strategy)) if kept.size() <= resized.size() => {
                            Some((kept, strategy))
                        }
                        _ => Some((resized, Strategy::ResolutionSearch)),
                    };
                }
                match closest {
                    Some((candidate, strategy)) if self.config.allow_approximate => {
                        log::warn!(
                            "{}: no candidate within {} bytes after {:.0}ms, returning closest ({} bytes)",
                            source.file_name(),
                            budget,
                            guard.elapsed_ms(),
                            candidate.size()
                        );
                        Ok(finish(request, candidate, strategy, BudgetFit::Approximate))
                    }
                    _ => Err(CompressError::Exhausted { budget, attempts }),
                }
            }
        }
    }
}

impl<C: Codec + Sync, K: Clock + Sync> CompressionEngine<C, K> {
    /// Compress independent requests in parallel.
    ///
    /// Results are returned in request order.
    pub fn compress_batch(&self, requests: &[CompressionRequest<'_>]) -> Vec<ProcessedImage> {
        requests
            .par_iter()
            .map(|request| self.compress(request))
            .collect()
    }
}

/// Compress `source` to at most `target_kb` kilobytes with the default
/// engine.
pub fn compress_to_target_size(
    source: &SourceImage,
    target_kb: f64,
    format: TargetFormat,
) -> ProcessedImage {
    CompressionEngine::default().compress_source(source, target_kb, format)
}

/// Release the payload of a result. Safe to call more than once.
pub fn release_result(result: &mut ProcessedImage) {
    result.release();
}

fn finish(
    request: &CompressionRequest<'_>,
    candidate: EncodeCandidate,
    strategy: Strategy,
    fit: BudgetFit,
) -> CompressedImage {
    let source = request.source();
    CompressedImage {
        file_name: output_file_name(source.file_name(), candidate.format),
        bytes: candidate.bytes,
        width: candidate.width,
        height: candidate.height,
        format: candidate.format,
        quality: candidate.quality,
        strategy,
        fit,
        original_size: source.len(),
        budget: request.budget_bytes(),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
