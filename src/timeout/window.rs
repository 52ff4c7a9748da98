//! Randomization window (jitter) applied on top of a computed timeout.

use rand::Rng;

use super::error::TimeoutError;
use super::round_millis;

/// A symmetric jitter band, stored as the pair of multipliers `(1+f, 1-f)`
/// alongside the configured fraction `f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWindow {
    fraction: f64,
    max: f64,
    min: f64,
}

impl RandomWindow {
    /// Build a window from a fraction `f` with `0 < f < 1`.
    pub fn from_fraction(fraction: f64) -> Result<Self, TimeoutError> {
        // NaN fails both comparisons
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(TimeoutError::InvalidRandomWindow(fraction));
        }
        Ok(Self {
            fraction,
            max: 1.0 + fraction,
            min: 1.0 - fraction,
        })
    }

    /// Upper multiplier, `1 + f`.
    pub const fn max_multiplier(&self) -> f64 {
        self.max
    }

    /// Lower multiplier, `1 - f`.
    pub const fn min_multiplier(&self) -> f64 {
        self.min
    }

    /// The configured fraction `f`, exactly as given.
    pub const fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Inclusive `(lo, hi)` range a sample around `value` is drawn from.
    ///
    /// Both ends are at least 1 so a draw can never degenerate to a zero delay.
    pub fn bounds(&self, value: u64) -> (u64, u64) {
        let lo = round_millis(value as f64 * self.min).max(1);
        let hi = round_millis(value as f64 * self.max).max(lo);
        (lo, hi)
    }

    /// Draw a delay uniformly from [`bounds`](Self::bounds).
    pub fn sample<R: Rng + ?Sized>(&self, value: u64, rng: &mut R) -> u64 {
        let (lo, hi) = self.bounds(value);
        rng.gen_range(lo..=hi)
    }
}
