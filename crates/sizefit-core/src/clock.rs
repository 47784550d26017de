//! Time sources and deadlines for the attempt guard.
//!
//! `std::time::Instant` is unavailable on `wasm32-unknown-unknown`, so the
//! engine reads time through the [`Clock`] trait: [`SystemClock`] natively,
//! a `Date.now()` clock in the browser bindings, and [`ManualClock`] in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use thiserror::Error;

/// A monotonic millisecond time source.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Deterministic clock for tests.
///
/// Time only moves through [`ManualClock::advance`], or by `tick_ms` on
/// every read when constructed with [`ManualClock::ticking`], which makes
/// each guarded step look like it took that long.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_us: AtomicU64,
    tick_us: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticking(tick_ms: u64) -> Self {
        Self {
            now_us: AtomicU64::new(0),
            tick_us: tick_ms * 1000,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_us.fetch_add(ms * 1000, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        let now = self.now_us.fetch_add(self.tick_us, Ordering::SeqCst);
        now as f64 / 1000.0
    }
}

/// The deadline expired before the stage named in the error could start.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("timed out after {elapsed_ms}ms (limit {limit_ms}ms) before {stage}")]
pub struct DeadlineExceeded {
    pub elapsed_ms: u64,
    pub limit_ms: u64,
    pub stage: &'static str,
}

/// A point in time after which guarded work must not start.
///
/// Checks are cooperative: the guard runs before every decode, resize and
/// encode, so an expired deadline is observed at the next step boundary.
#[derive(Clone, Copy)]
pub struct Deadline<'a> {
    clock: &'a dyn Clock,
    started_ms: f64,
    expires_ms: f64,
}

impl<'a> Deadline<'a> {
    /// Start a deadline `timeout_ms` from now.
    pub fn start(clock: &'a dyn Clock, timeout_ms: u64) -> Self {
        let now = clock.now_ms();
        Self {
            clock,
            started_ms: now,
            expires_ms: now + timeout_ms as f64,
        }
    }

    /// A nested deadline that expires after `timeout_ms` or when this one
    /// does, whichever comes first.
    pub fn child(&self, timeout_ms: u64) -> Deadline<'a> {
        let now = self.clock.now_ms();
        Deadline {
            clock: self.clock,
            started_ms: now,
            expires_ms: (now + timeout_ms as f64).min(self.expires_ms),
        }
    }

    /// Fail if the deadline has passed.
    pub fn check(&self, stage: &'static str) -> Result<(), DeadlineExceeded> {
        let now = self.clock.now_ms();
        if now >= self.expires_ms {
            return Err(DeadlineExceeded {
                elapsed_ms: (now - self.started_ms).max(0.0) as u64,
                limit_ms: (self.expires_ms - self.started_ms).max(0.0) as u64,
                stage,
            });
        }
        Ok(())
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.clock.now_ms() - self.started_ms
    }
}

impl std::fmt::Debug for Deadline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deadline")
            .field("started_ms", &self.started_ms)
            .field("expires_ms", &self.expires_ms)
            .finish()
    }
}
