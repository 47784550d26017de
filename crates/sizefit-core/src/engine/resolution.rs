//! Resolution search: shrink (and occasionally re-grow) the raster at a
//! fixed encoder quality until a candidate fits.
//!
//! Scale is always relative to the original dimensions and every resize
//! starts from the original raster, so repeated attempts never compound
//! resampling loss.

use crate::config::ResolutionConfig;
use crate::decode::{scaled_dimensions, DecodedRaster};
use crate::encode::EncodeCandidate;
use crate::format::ImageFormat;

use super::guard::{keep_largest, keep_smallest, Guarded};
use super::CompressError;

/// Result of a resolution search.
#[derive(Debug)]
pub(crate) enum ResolutionOutcome {
    Fit(EncodeCandidate),
    Exhausted {
        closest: Option<EncodeCandidate>,
        attempts: u32,
    },
}

/// Scale bookkeeping between attempts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScaleStep {
    /// Scale of the last attempt (1.0 before the first).
    pub scale: f64,
    /// Size of the last candidate (the seed size before the first).
    pub last_size: usize,
    /// Smallest scale known to overshoot.
    pub over_scale: Option<f64>,
    pub attempts: u32,
}

impl ScaleStep {
    pub(crate) fn new(seed_size: usize) -> Self {
        Self {
            scale: 1.0,
            last_size: seed_size.max(1),
            over_scale: None,
            attempts: 0,
        }
    }

    /// Next scale to try.
    ///
    /// Pixel count tracks encoded size roughly linearly, so the linear scale
    /// moves by `sqrt(budget / last_size)`. After an overshoot the step is
    /// steepened; a re-grow never reaches a scale already seen to overshoot.
    pub(crate) fn next_scale(&self, budget: usize, config: &ResolutionConfig) -> f64 {
        let mut factor = (budget as f64 / self.last_size as f64).sqrt();
        if self.attempts > 0 && self.last_size > budget {
            factor *= config.steepen_factor;
        }
        let mut next = self.scale * factor;
        if let Some(over) = self.over_scale {
            if next >= over {
                next = (self.scale + over) / 2.0;
            }
        }
        next.clamp(config.min_scale, config.max_scale)
    }

    pub(crate) fn record(&mut self, scale: f64, size: usize, budget: usize) {
        self.attempts += 1;
        self.scale = scale;
        self.last_size = size.max(1);
        if size > budget {
            self.over_scale = Some(self.over_scale.map_or(scale, |o| o.min(scale)));
        }
    }
}

/// Search for dimensions that fit `budget` at the format's fixed
/// resolution-search quality.
///
/// `seed_size` is the size the search starts from: the smallest quality
/// search candidate, or the source size when no quality search ran.
///
/// # Errors
///
/// Propagates resize/encode failures and deadline expiry.
pub(crate) fn resolution_search(
    guard: &Guarded<'_>,
    original: &DecodedRaster,
    format: ImageFormat,
    budget: usize,
    seed_size: usize,
    config: &ResolutionConfig,
) -> Result<ResolutionOutcome, CompressError> {
    let quality = config.quality_for(format);
    let mut step = ScaleStep::new(seed_size);
    let mut last_dims: Option<(u32, u32)> = None;
    let mut best: Option<EncodeCandidate> = None;
    let mut closest: Option<EncodeCandidate> = None;

    while step.attempts < config.max_attempts {
        let scale = step.next_scale(budget, config);
        let (width, height) = scaled_dimensions(original.width, original.height, scale);
        if last_dims == Some((width, height)) {
            break;
        }
        last_dims = Some((width, height));

        let candidate = {
            let resized = guard.resize(original, width, height)?;
            guard.encode(&resized, format, quality)?
        };
        let size = candidate.size();
        step.record(scale, size, budget);

        if candidate.fits(budget) {
            let undershoot = (size as f64) < budget as f64 * config.undershoot_ratio;
            let can_grow = scale < config.max_scale
                && width.max(height) >= config.min_upscale_edge
                && step.over_scale.map_or(true, |over| over - scale > 1e-3);
            best = keep_largest(best, candidate);
            if !(undershoot && can_grow) {
                break;
            }
        } else {
            closest = keep_smallest(closest, candidate);
            if scale <= config.min_scale {
                break;
            }
        }
    }

    log::debug!(
        "resolution search finished after {} attempts at scale {:.3}",
        step.attempts,
        step.scale
    );
    Ok(match best {
        Some(candidate) => ResolutionOutcome::Fit(candidate),
        None => ResolutionOutcome::Exhausted {
            closest,
            attempts: step.attempts,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Deadline, ManualClock};
    use crate::engine::testing::SyntheticCodec;

    #[test]
    fn test_first_step_uses_square_root() {
        let config = ResolutionConfig::default();
        let step = ScaleStep::new(40_000);
        let scale = step.next_scale(10_000, &config);
        assert!((scale - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_overshoot_steepens_step() {
        let config = ResolutionConfig::default();
        let mut step = ScaleStep::new(40_000);
        step.record(0.5, 12_100, 10_000);
        let scale = step.next_scale(10_000, &config);
        let plain = 0.5 * (10_000f64 / 12_100.0).sqrt();
        assert!((scale - plain * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_regrow_stays_below_overshooting_scale() {
        let config = ResolutionConfig::default();
        let mut step = ScaleStep::new(40_000);
        step.record(0.5, 12_000, 10_000);
        step.record(0.3, 1_000, 10_000);
        let scale = step.next_scale(10_000, &config);
        assert!(scale < 0.5);
        assert!(scale > 0.3);
    }

    #[test]
    fn test_scale_clamped_to_floor() {
        let config = ResolutionConfig::default();
        let step = ScaleStep::new(100_000_000);
        assert_eq!(step.next_scale(10, &config), config.min_scale);
    }

    #[test]
    fn test_scale_clamped_to_ceiling() {
        let config = ResolutionConfig::default();
        let step = ScaleStep::new(10);
        assert_eq!(step.next_scale(10_000, &config), config.max_scale);
    }

    #[test]
    fn test_search_fits_with_smaller_dimensions() {
        let codec = SyntheticCodec::new(400, 300);
        let clock = ManualClock::new();
        let guard = Guarded::new(&codec, Deadline::start(&clock, 20_000));
        let original = codec.decode_raster();
        let budget = 30_000;

        let outcome = resolution_search(
            &guard,
            &original,
            ImageFormat::Jpeg,
            budget,
            120_000,
            &ResolutionConfig::default(),
        )
        .unwrap();
        match outcome {
            ResolutionOutcome::Fit(c) => {
                assert!(c.fits(budget));
                assert!(c.width < 400 && c.height < 300);
                assert_eq!(c.quality, Some(0.8));
            }
            other => panic!("expected fit, got {:?}", other),
        }
        assert!(codec.encode_count() <= 5);
    }

    #[test]
    fn test_resizes_always_start_from_original() {
        let codec = SyntheticCodec::new(400, 300);
        let clock = ManualClock::new();
        let guard = Guarded::new(&codec, Deadline::start(&clock, 20_000));
        let original = codec.decode_raster();

        let _ = resolution_search(
            &guard,
            &original,
            ImageFormat::Webp,
            5_000,
            120_000,
            &ResolutionConfig::default(),
        )
        .unwrap();
        assert!(codec
            .resize_sources()
            .iter()
            .all(|&dims| dims == (400, 300)));
    }

    #[test]
    fn test_search_exhausts_at_floor() {
        let codec = SyntheticCodec::new(400, 300);
        let clock = ManualClock::new();
        let guard = Guarded::new(&codec, Deadline::start(&clock, 20_000));
        let original = codec.decode_raster();

        // At the 0.1 floor the raster is 40x30 -> 10 + 1200 * 0.8 bytes.
        let outcome = resolution_search(
            &guard,
            &original,
            ImageFormat::Jpeg,
            100,
            120_000,
            &ResolutionConfig::default(),
        )
        .unwrap();
        match outcome {
            ResolutionOutcome::Exhausted {
                closest: Some(c),
                attempts,
            } => {
                assert_eq!((c.width, c.height), (40, 30));
                assert!(attempts <= 5);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_search_respects_attempt_cap() {
        let codec = SyntheticCodec::new(400, 300);
        let clock = ManualClock::new();
        let guard = Guarded::new(&codec, Deadline::start(&clock, 20_000));
        let original = codec.decode_raster();
        let config = ResolutionConfig {
            max_attempts: 2,
            ..ResolutionConfig::default()
        };

        let _ = resolution_search(&guard, &original, ImageFormat::Jpeg, 100, 120_000, &config)
            .unwrap();
        assert!(codec.encode_count() <= 2);
    }

    #[test]
    fn test_search_times_out() {
        let codec = SyntheticCodec::new(400, 300);
        let clock = ManualClock::ticking(15_000);
        let parent = Guarded::new(&codec, Deadline::start(&clock, 60_000));
        let guard = parent.narrowed(20_000);
        let original = codec.decode_raster();

        let err = resolution_search(
            &guard,
            &original,
            ImageFormat::Jpeg,
            100,
            120_000,
            &ResolutionConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CompressError::Timeout(_)));
    }
}
