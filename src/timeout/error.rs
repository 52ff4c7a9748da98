//! Construction errors for timeout values.

use thiserror::Error;

/// Errors raised while building a [`Timeout`](super::Timeout).
///
/// Construction either succeeds with a fully valid value or fails here;
/// out-of-range options are never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TimeoutError {
    /// The base duration was zero.
    #[error("base timeout must be a positive number of milliseconds")]
    ZeroBase,

    /// The backoff factor was not a finite number greater than 1.
    #[error("backoff factor must be a finite number greater than 1, got {0}")]
    InvalidBackoff(f64),

    /// The backoff ceiling was below the base duration.
    #[error("backoff ceiling {max}ms is below the base timeout {base}ms")]
    InvalidBackoffMax { max: u64, base: u64 },

    /// The jitter fraction was outside the open interval (0, 1).
    #[error("random window must be strictly between 0 and 1, got {0}")]
    InvalidRandomWindow(f64),
}
