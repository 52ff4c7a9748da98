//! Scheduler collaborator.
//!
//! # Data Flow
//! ```text
//! Timeout::schedule
//!     → Scheduler::schedule_after(target, message, delay) → TimerHandle
//!     → handle stored on the new Timeout value
//!
//! Timeout::cancel
//!     → Scheduler::cancel(handle) → TimerCancel
//!     → handle cleared
//! ```
//!
//! # Design Decisions
//! - The timeout value never fires callbacks itself; it only forwards handles
//! - Handles are opaque ids allocated by the scheduler
//! - Cancellation is best-effort: a timer that already fired reports `Inactive`

pub mod tokio_timer;

use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use tokio_timer::TokioScheduler;

/// Opaque reference to a pending scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wrap a scheduler-specific id.
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The scheduler-specific id.
    pub const fn into_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Result of asking the scheduler to cancel a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCancel {
    /// The callback was pending and will not fire.
    Cancelled { remaining: Duration },
    /// The callback already fired, was already cancelled, or the handle is unknown.
    Inactive,
}

/// Failures reported by a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// No async runtime is available to drive the timer.
    #[error("no async runtime available to drive timers")]
    NoRuntime,

    /// The callback target can no longer receive messages.
    #[error("callback target is closed")]
    TargetClosed,

    /// Scheduler-specific failure.
    #[error("scheduler error: {0}")]
    Other(String),
}

/// Capability to deliver a message after a delay and to cancel that delivery.
pub trait Scheduler {
    /// Recipient of scheduled messages.
    type Target;
    /// Payload delivered to the target.
    type Message;

    /// Deliver `message` to `target` no earlier than `delay` from now.
    fn schedule_after(
        &self,
        target: &Self::Target,
        message: Self::Message,
        delay: Duration,
    ) -> Result<TimerHandle, SchedulerError>;

    /// Prevent a pending delivery. Must tolerate stale handles.
    fn cancel(&self, handle: TimerHandle) -> Result<TimerCancel, SchedulerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_roundtrip_and_display() {
        let handle = TimerHandle::from_raw(7);
        assert_eq!(handle.into_raw(), 7);
        assert_eq!(handle.to_string(), "timer#7");
        assert!(TimerHandle::from_raw(1) < TimerHandle::from_raw(2));
    }
}
