//! Quality search at the original dimensions.
//!
//! Two strategies share one outcome type:
//!
//! - **Bisection** narrows a `[low, high]` quality interval, keeping the
//!   largest candidate that fits.
//! - **Adaptive** starts from a per-format quality and moves it by
//!   multiplicative steps, raising it again when a fit undershoots badly.

use crate::config::{AdaptiveConfig, BisectionConfig};
use crate::decode::DecodedRaster;
use crate::encode::EncodeCandidate;
use crate::format::ImageFormat;

use super::guard::{keep_largest, keep_smallest, Guarded};
use super::CompressError;

/// Result of a quality search.
#[derive(Debug)]
pub(crate) enum QualityOutcome {
    /// A candidate within budget.
    Fit(EncodeCandidate),
    /// Nothing fit; the smallest overshooting candidate, if any, is kept
    /// for the resolution search and as an approximate fallback.
    NoFit { smallest: Option<EncodeCandidate> },
}

/// Bisection bookkeeping between encodes.
#[derive(Debug, Clone)]
pub(crate) struct BisectionState {
    pub low: f32,
    pub high: f32,
    pub iterations: u32,
    pub best: Option<EncodeCandidate>,
    pub smallest_over: Option<EncodeCandidate>,
}

impl BisectionState {
    pub(crate) fn new(config: &BisectionConfig) -> Self {
        Self {
            low: config.min_quality,
            high: config.max_quality,
            iterations: 0,
            best: None,
            smallest_over: None,
        }
    }

    pub(crate) fn midpoint(&self) -> f32 {
        (self.low + self.high) / 2.0
    }

    pub(crate) fn is_done(&self, config: &BisectionConfig) -> bool {
        self.iterations >= config.max_iterations || self.high - self.low < config.precision
    }

    /// Fold in the candidate encoded at `quality`.
    ///
    /// A fit raises `low`, an overshoot lowers `high`.
    pub(crate) fn advance(mut self, quality: f32, candidate: EncodeCandidate, budget: usize) -> Self {
        self.iterations += 1;
        if candidate.fits(budget) {
            self.low = quality;
            self.best = keep_largest(self.best.take(), candidate);
        } else {
            self.high = quality;
            self.smallest_over = keep_smallest(self.smallest_over.take(), candidate);
        }
        self
    }

    pub(crate) fn into_outcome(self) -> QualityOutcome {
        match self.best {
            Some(best) => QualityOutcome::Fit(best),
            None => QualityOutcome::NoFit {
                smallest: self.smallest_over,
            },
        }
    }
}

/// Bisect quality until the interval is narrower than the configured
/// precision or the iteration cap is hit.
///
/// # Errors
///
/// Propagates encode failures and deadline expiry.
pub(crate) fn bisection_search(
    guard: &Guarded<'_>,
    raster: &DecodedRaster,
    format: ImageFormat,
    budget: usize,
    config: &BisectionConfig,
) -> Result<QualityOutcome, CompressError> {
    let mut state = BisectionState::new(config);
    while !state.is_done(config) {
        let quality = state.midpoint();
        let candidate = guard.encode(raster, format, quality)?;
        state = state.advance(quality, candidate, budget);
    }
    log::debug!(
        "bisection finished after {} encodes in [{:.3}, {:.3}]",
        state.iterations,
        state.low,
        state.high
    );
    Ok(state.into_outcome())
}

/// Step quality multiplicatively from the format's starting point.
///
/// An overshoot lowers quality (more aggressively on the first attempt),
/// never below the format floor. A fit below `budget * undershoot_ratio`
/// raises quality again, but never to or past a quality already seen to
/// overshoot. If only overcorrected fits were found, the largest of them is
/// returned.
///
/// # Errors
///
/// Propagates encode failures and deadline expiry.
pub(crate) fn adaptive_search(
    guard: &Guarded<'_>,
    raster: &DecodedRaster,
    format: ImageFormat,
    budget: usize,
    config: &AdaptiveConfig,
) -> Result<QualityOutcome, CompressError> {
    let floor = format.quality_floor();
    let mut quality = format.initial_quality().min(config.max_quality);
    let mut ceiling: Option<f32> = None;
    let mut undershoot: Option<EncodeCandidate> = None;
    let mut smallest_over: Option<EncodeCandidate> = None;

    for attempt in 0..config.max_attempts {
        let candidate = guard.encode(raster, format, quality)?;

        if candidate.fits(budget) {
            if candidate.size() as f64 >= budget as f64 * config.undershoot_ratio {
                return Ok(QualityOutcome::Fit(candidate));
            }
            undershoot = keep_largest(undershoot, candidate);

            let mut raised = (quality * config.raise_factor).min(config.max_quality);
            if let Some(ceiling) = ceiling {
                raised = raised.min((quality + ceiling) / 2.0);
            }
            if raised - quality < 0.005 {
                break;
            }
            quality = raised;
        } else {
            ceiling = Some(ceiling.map_or(quality, |c| c.min(quality)));
            smallest_over = keep_smallest(smallest_over, candidate);
            if quality <= floor {
                break;
            }

            let factor = if attempt == 0 {
                config.first_shrink_factor
            } else {
                config.shrink_factor
            };
            let mut lowered = (quality * factor).max(floor);
            if let Some(fit_quality) = undershoot.as_ref().and_then(|c| c.quality) {
                lowered = lowered.max((fit_quality + quality) / 2.0);
            }
            if quality - lowered < 0.005 {
                break;
            }
            quality = lowered;
        }
    }

    Ok(match undershoot {
        Some(candidate) => QualityOutcome::Fit(candidate),
        None => QualityOutcome::NoFit {
            smallest: smallest_over,
        },
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn candidate(size: usize, quality: f32) -> EncodeCandidate {
        EncodeCandidate {
            bytes: vec![0u8; size],
            width: 1,
            height: 1,
            format: ImageFormat::Jpeg,
            quality: Some(quality),
        }
    }

    proptest! {
        /// Property: Folding any sequence of encodes keeps the interval
        /// ordered, the best candidate within budget and the smallest
        /// overshoot over it.
        #[test]
        fn prop_bisection_state_invariants(
            budget in 1usize..5_000,
            sizes in prop::collection::vec(1usize..10_000, 1..15),
        ) {
            let config = BisectionConfig::default();
            let mut state = BisectionState::new(&config);
            for size in sizes {
                let quality = state.midpoint();
                state = state.advance(quality, candidate(size, quality), budget);
                prop_assert!(state.low <= state.high);
            }
            if let Some(best) = &state.best {
                prop_assert!(best.fits(budget));
            }
            if let Some(over) = &state.smallest_over {
                prop_assert!(!over.fits(budget));
            }
        }

        /// Property: The midpoint always stays inside the configured range.
        #[test]
        fn prop_bisection_midpoint_in_range(
            fits in prop::collection::vec(any::<bool>(), 0..15),
        ) {
            let config = BisectionConfig::default();
            let mut state = BisectionState::new(&config);
            for fit in fits {
                let quality = state.midpoint();
                prop_assert!(quality >= config.min_quality && quality <= config.max_quality);
                let size = if fit { 10 } else { 1_000 };
                state = state.advance(quality, candidate(size, quality), 100);
            }
        }
    }
}
