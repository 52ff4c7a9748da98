//! Tokio-backed scheduler.
//!
//! # Responsibilities
//! - Spawn one task per scheduled message, sleeping until its deadline
//! - Track pending timers so they can be cancelled by handle
//! - Report remaining time on successful cancellation
//!
//! # Design Decisions
//! - Fire and cancel both remove the timer entry; whichever removes it wins
//! - Cancelling wakes the sleeping task so it exits without delivering
//! - Delivery to a dropped receiver is ignored at fire time

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use super::{Scheduler, SchedulerError, TimerCancel, TimerHandle};

struct PendingTimer {
    deadline: Instant,
    cancel_tx: oneshot::Sender<()>,
}

/// Scheduler delivering messages into an unbounded mpsc channel.
///
/// Clones share the same timer table.
pub struct TokioScheduler<M> {
    timers: Arc<DashMap<TimerHandle, PendingTimer>>,
    next_id: Arc<AtomicU64>,
    _message: std::marker::PhantomData<fn(M)>,
}

impl<M> TokioScheduler<M> {
    /// Create a scheduler with no pending timers.
    pub fn new() -> Self {
        Self {
            timers: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            _message: std::marker::PhantomData,
        }
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Whether `handle` still refers to a pending timer.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }
}

impl<M> Clone for TokioScheduler<M> {
    fn clone(&self) -> Self {
        Self {
            timers: Arc::clone(&self.timers),
            next_id: Arc::clone(&self.next_id),
            _message: std::marker::PhantomData,
        }
    }
}

impl<M> Default for TokioScheduler<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Send + 'static> Scheduler for TokioScheduler<M> {
    type Target = mpsc::UnboundedSender<M>;
    type Message = M;

    fn schedule_after(
        &self,
        target: &Self::Target,
        message: M,
        delay: Duration,
    ) -> Result<TimerHandle, SchedulerError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        if target.is_closed() {
            return Err(SchedulerError::TargetClosed);
        }

        let handle = TimerHandle::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let deadline = Instant::now() + delay;
        let (cancel_tx, cancel_rx) = oneshot::channel();

        // Registered before spawning so a zero delay cannot fire ahead of the entry.
        self.timers.insert(handle, PendingTimer { deadline, cancel_tx });

        let timers = Arc::clone(&self.timers);
        let target = target.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {
                    if timers.remove(&handle).is_some() {
                        if target.send(message).is_err() {
                            tracing::debug!(%handle, "Timer fired but target is gone");
                        }
                    }
                }
                _ = cancel_rx => {}
            }
        });

        Ok(handle)
    }

    fn cancel(&self, handle: TimerHandle) -> Result<TimerCancel, SchedulerError> {
        match self.timers.remove(&handle) {
            Some((_, timer)) => {
                let remaining = timer.deadline.saturating_duration_since(Instant::now());
                let _ = timer.cancel_tx.send(());
                Ok(TimerCancel::Cancelled { remaining })
            }
            None => Ok(TimerCancel::Inactive),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_delivers_after_delay() {
        let scheduler = TokioScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let start = Instant::now();
        let handle = scheduler
            .schedule_after(&tx, "tick", Duration::from_millis(20))
            .unwrap();
        assert!(scheduler.is_pending(handle));

        assert_eq!(rx.recv().await, Some("tick"));
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.cancel(handle).unwrap(), TimerCancel::Inactive);
    }

    #[tokio::test]
    async fn test_cancel_reports_remaining() {
        let scheduler = TokioScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<u32>();

        let handle = scheduler
            .schedule_after(&tx, 1, Duration::from_secs(5))
            .unwrap();
        match scheduler.cancel(handle).unwrap() {
            TimerCancel::Cancelled { remaining } => {
                assert!(remaining > Duration::ZERO);
                assert!(remaining <= Duration::from_secs(5));
            }
            other => panic!("unexpected cancel result: {other:?}"),
        }

        assert_eq!(scheduler.cancel(handle).unwrap(), TimerCancel::Inactive);
        drop(tx);
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn test_requires_runtime() {
        let scheduler = TokioScheduler::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let err = scheduler
            .schedule_after(&tx, (), Duration::from_millis(1))
            .unwrap_err();
        assert!(matches!(err, SchedulerError::NoRuntime));
    }

    #[tokio::test]
    async fn test_rejects_closed_target() {
        let scheduler = TokioScheduler::new();
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let err = scheduler
            .schedule_after(&tx, (), Duration::from_millis(1))
            .unwrap_err();
        assert!(matches!(err, SchedulerError::TargetClosed));
        assert_eq!(scheduler.pending(), 0);
    }
}
