//! Engine configuration.
//!
//! Every knob has a default matching the documented search behavior, so an
//! empty JS object (or `EngineConfig::default()`) is a complete config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;
use crate::format::ImageFormat;

/// Which quality search runs for lossy outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualityStrategy {
    /// Adaptive-step for WebP output, bisection for everything else.
    #[default]
    Auto,
    /// Interval bisection keeping the largest under-budget candidate.
    Bisection,
    /// Multiplicative steps from a per-format starting quality.
    Adaptive,
}

impl QualityStrategy {
    /// Resolve `Auto` for a concrete output format.
    pub fn resolve(self, output: ImageFormat) -> QualityStrategy {
        match self {
            QualityStrategy::Auto if output == ImageFormat::Webp => QualityStrategy::Adaptive,
            QualityStrategy::Auto => QualityStrategy::Bisection,
            other => other,
        }
    }
}

/// Bisection quality search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BisectionConfig {
    pub min_quality: f32,
    pub max_quality: f32,
    /// Stop once the interval is narrower than this.
    pub precision: f32,
    pub max_iterations: u32,
}

impl Default for BisectionConfig {
    fn default() -> Self {
        Self {
            min_quality: 0.01,
            max_quality: 1.0,
            precision: 0.01,
            max_iterations: 15,
        }
    }
}

/// Adaptive-step quality search parameters.
///
/// Starting quality and floor are per-format (see [`ImageFormat`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdaptiveConfig {
    pub max_attempts: u32,
    /// A fitting candidate smaller than `budget * undershoot_ratio` is an
    /// overcorrection and triggers a quality raise.
    pub undershoot_ratio: f64,
    pub raise_factor: f32,
    pub max_quality: f32,
    /// Quality multiplier after an overshoot on the first attempt.
    pub first_shrink_factor: f32,
    /// Quality multiplier after an overshoot on later attempts.
    pub shrink_factor: f32,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            undershoot_ratio: 0.5,
            raise_factor: 1.5,
            max_quality: 0.99,
            first_shrink_factor: 0.6,
            shrink_factor: 0.85,
        }
    }
}

/// Resolution search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolutionConfig {
    pub max_attempts: u32,
    /// Smallest linear scale relative to the original dimensions.
    pub min_scale: f64,
    /// Largest linear scale relative to the original dimensions.
    pub max_scale: f64,
    /// Extra factor applied to the scale after an overshoot.
    pub steepen_factor: f64,
    pub undershoot_ratio: f64,
    /// Below this longest edge an undershoot is accepted as-is.
    pub min_upscale_edge: u32,
    /// Fixed quality for WebP re-encodes.
    pub webp_quality: f32,
    /// Fixed quality for other lossy re-encodes.
    pub lossy_quality: f32,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_scale: 0.1,
            max_scale: 1.0,
            steepen_factor: 0.9,
            undershoot_ratio: 0.5,
            min_upscale_edge: 100,
            webp_quality: 0.9,
            lossy_quality: 0.8,
        }
    }
}

impl ResolutionConfig {
    /// Fixed re-encode quality for `format`.
    pub fn quality_for(&self, format: ImageFormat) -> f32 {
        match format {
            ImageFormat::Webp => self.webp_quality,
            _ => self.lossy_quality,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Deadline for a whole request.
    pub timeout_ms: u64,
    /// Deadline for the resolution sub-search, capped by the outer deadline.
    pub resolution_timeout_ms: u64,
    pub quality_strategy: QualityStrategy,
    pub bisection: BisectionConfig,
    pub adaptive: AdaptiveConfig,
    pub resolution: ResolutionConfig,
    pub resize_filter: FilterType,
    /// Return the closest over-budget candidate, flagged approximate, when
    /// every search is exhausted. When false, exhaustion is a failure.
    pub allow_approximate: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            resolution_timeout_ms: 20_000,
            quality_strategy: QualityStrategy::default(),
            bisection: BisectionConfig::default(),
            adaptive: AdaptiveConfig::default(),
            resolution: ResolutionConfig::default(),
            resize_filter: FilterType::default(),
            allow_approximate: true,
        }
    }
}

/// A configuration value outside its meaningful range.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("bisection range is empty: {min} >= {max}")]
    EmptyQualityRange { min: f32, max: f32 },

    #[error("resolution scale range is empty: {min} > {max}")]
    EmptyScaleRange { min: f64, max: f64 },
}

impl EngineConfig {
    /// Reject configurations the searches cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("timeoutMs", self.timeout_ms as f64)?;
        positive("resolutionTimeoutMs", self.resolution_timeout_ms as f64)?;

        let b = &self.bisection;
        in_range("bisection.minQuality", b.min_quality as f64, 0.0, 1.0)?;
        in_range("bisection.maxQuality", b.max_quality as f64, 0.0, 1.0)?;
        if b.min_quality >= b.max_quality {
            return Err(ConfigError::EmptyQualityRange {
                min: b.min_quality,
                max: b.max_quality,
            });
        }
        positive("bisection.precision", b.precision as f64)?;
        positive("bisection.maxIterations", b.max_iterations as f64)?;

        let a = &self.adaptive;
        positive("adaptive.maxAttempts", a.max_attempts as f64)?;
        in_range("adaptive.undershootRatio", a.undershoot_ratio, 0.0, 1.0)?;
        in_range("adaptive.raiseFactor", a.raise_factor as f64, 1.0, 10.0)?;
        in_range("adaptive.maxQuality", a.max_quality as f64, 0.01, 1.0)?;
        in_range("adaptive.firstShrinkFactor", a.first_shrink_factor as f64, 0.01, 0.99)?;
        in_range("adaptive.shrinkFactor", a.shrink_factor as f64, 0.01, 0.99)?;

        let r = &self.resolution;
        positive("resolution.maxAttempts", r.max_attempts as f64)?;
        in_range("resolution.minScale", r.min_scale, 0.0001, 1.0)?;
        in_range("resolution.maxScale", r.max_scale, 0.0001, 1.0)?;
        if r.min_scale > r.max_scale {
            return Err(ConfigError::EmptyScaleRange {
                min: r.min_scale,
                max: r.max_scale,
            });
        }
        in_range("resolution.steepenFactor", r.steepen_factor, 0.01, 1.0)?;
        in_range("resolution.undershootRatio", r.undershoot_ratio, 0.0, 1.0)?;
        in_range("resolution.webpQuality", r.webp_quality as f64, 0.01, 1.0)?;
        in_range("resolution.lossyQuality", r.lossy_quality as f64, 0.01, 1.0)?;

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field })
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
