//! Timer counters.
//!
//! # Metrics
//! - `timeout_timers_scheduled_total` (counter): callbacks handed to a scheduler
//! - `timeout_scheduled_delay_ms` (histogram): delay used per scheduled callback
//! - `timeout_timers_cancelled_total` (counter): cancellations by outcome
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding application installs a recorder.

use metrics::{counter, histogram};

/// Record a callback handed to a scheduler.
pub fn record_timer_scheduled(delay_ms: u64) {
    counter!("timeout_timers_scheduled_total").increment(1);
    histogram!("timeout_scheduled_delay_ms").record(delay_ms as f64);
}

/// Record a cancellation attempt by outcome label.
pub fn record_timer_cancelled(outcome: &'static str) {
    counter!("timeout_timers_cancelled_total", "outcome" => outcome).increment(1);
}
