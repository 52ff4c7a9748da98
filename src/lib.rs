//! Configurable timeout values with exponential backoff, jitter and
//! scheduler-backed cancellation.

pub mod config;
pub mod observability;
pub mod scheduler;
pub mod timeout;

pub use config::AppConfig;
pub use scheduler::{Scheduler, SchedulerError, TimerCancel, TimerHandle, TokioScheduler};
pub use timeout::{CancelOutcome, RandomWindow, Timeout, TimeoutError, TimeoutOptions};
