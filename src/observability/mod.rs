//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Timeout::schedule / Timeout::cancel
//!     → logging (structured tracing events)
//!     → metrics.rs (counters and delay histogram)
//! ```
//!
//! # Design Decisions
//! - Library code only emits events; the binary installs the subscriber
//! - Metrics go through the `metrics` facade and cost nothing without a recorder

pub mod logging;
pub mod metrics;
