//! Timeout values with optional exponential backoff and jitter.
//!
//! # Data Flow
//! ```text
//! Timeout::new(base, options)      (validated, immutable configuration)
//!     → advance()                  (base once, then base * factor^n, capped)
//!     → current_value()            (jittered sample, never zero)
//!     → schedule(scheduler, ..)    (advance + sample + hand off to scheduler)
//!     → cancel(scheduler)          (forward stored handle, clear it)
//!     → reset()                    (back to base, timer untouched)
//! ```
//!
//! # Design Decisions
//! - Every operation returns a new value; nothing is shared or locked
//! - Rounding is half away from zero for both growth and jitter bounds
//! - Randomness is injected through `rand::Rng`

mod error;
mod value;
mod window;

pub use error::TimeoutError;
pub use value::{CancelOutcome, Timeout, TimeoutOptions};
pub use window::RandomWindow;

/// Round a real-valued duration to whole milliseconds, half away from zero.
///
/// Values beyond `u64::MAX` saturate; negative values and NaN become 0.
pub(crate) fn round_millis(value: f64) -> u64 {
    value.round() as u64
}
