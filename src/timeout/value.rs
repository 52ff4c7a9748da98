//! The timeout value and its state transitions.

use std::time::Duration;

use rand::Rng;

use super::error::TimeoutError;
use super::round_millis;
use super::window::RandomWindow;
use crate::config::TimeoutConfig;
use crate::observability::metrics;
use crate::scheduler::{Scheduler, SchedulerError, TimerCancel, TimerHandle};

/// Optional behaviour layered on top of the base duration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeoutOptions {
    /// Growth factor applied per advance. `None` keeps the timeout static.
    pub backoff: Option<f64>,
    /// Ceiling for backoff growth, in milliseconds.
    pub backoff_max: Option<u64>,
    /// Jitter fraction in the open interval (0, 1).
    pub random: Option<f64>,
}

impl TimeoutOptions {
    pub fn backoff(mut self, factor: f64) -> Self {
        self.backoff = Some(factor);
        self
    }

    pub fn backoff_max(mut self, max_ms: u64) -> Self {
        self.backoff_max = Some(max_ms);
        self
    }

    pub fn random(mut self, fraction: f64) -> Self {
        self.random = Some(fraction);
        self
    }

    /// Every problem with `base` and these options, in field order.
    pub(crate) fn problems(&self, base: u64) -> Vec<TimeoutError> {
        let mut problems = Vec::new();

        if base == 0 {
            problems.push(TimeoutError::ZeroBase);
        }
        if let Some(factor) = self.backoff {
            if !(factor.is_finite() && factor > 1.0) {
                problems.push(TimeoutError::InvalidBackoff(factor));
            }
        }
        if let Some(max) = self.backoff_max {
            if max < base {
                problems.push(TimeoutError::InvalidBackoffMax { max, base });
            }
        }
        if let Some(fraction) = self.random {
            if let Err(e) = RandomWindow::from_fraction(fraction) {
                problems.push(e);
            }
        }

        problems
    }
}

/// Result of [`Timeout::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The value held no timer handle; the scheduler was not consulted.
    NoTimerPending,
    /// The scheduler's answer for the stored handle.
    Timer(TimerCancel),
}

impl CancelOutcome {
    fn label(&self) -> &'static str {
        match self {
            CancelOutcome::NoTimerPending => "no_timer",
            CancelOutcome::Timer(TimerCancel::Cancelled { .. }) => "cancelled",
            CancelOutcome::Timer(TimerCancel::Inactive) => "inactive",
        }
    }
}

/// A timeout that can grow by exponential backoff and be randomized.
///
/// All durations are whole milliseconds. The value is plain data: each
/// operation returns a new `Timeout` and leaves the receiver untouched.
///
/// ```
/// use backoff_timeout::{Timeout, TimeoutOptions};
///
/// let t = Timeout::new(100, TimeoutOptions::default().backoff(1.25)).unwrap();
/// let t = t.advance();
/// assert_eq!(t.current_value(), 100);
/// let t = t.advance();
/// assert_eq!(t.current_value(), 125);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Timeout {
    base: u64,
    backoff: Option<f64>,
    backoff_round: u32,
    backoff_max: Option<u64>,
    random: Option<RandomWindow>,
    current: Option<u64>,
    timer: Option<TimerHandle>,
}

impl Timeout {
    /// Build a timeout of `base` milliseconds.
    pub fn new(base: u64, options: TimeoutOptions) -> Result<Self, TimeoutError> {
        if let Some(problem) = options.problems(base).into_iter().next() {
            return Err(problem);
        }

        let random = options
            .random
            .map(RandomWindow::from_fraction)
            .transpose()?;

        Ok(Self {
            base,
            backoff: options.backoff,
            backoff_round: 0,
            backoff_max: options.backoff_max,
            random,
            current: None,
            timer: None,
        })
    }

    /// A static timeout with neither backoff nor jitter.
    pub fn fixed(base: u64) -> Result<Self, TimeoutError> {
        Self::new(base, TimeoutOptions::default())
    }

    pub const fn base(&self) -> u64 {
        self.base
    }

    pub const fn backoff(&self) -> Option<f64> {
        self.backoff
    }

    pub const fn backoff_round(&self) -> u32 {
        self.backoff_round
    }

    pub const fn backoff_max(&self) -> Option<u64> {
        self.backoff_max
    }

    pub const fn random_window(&self) -> Option<RandomWindow> {
        self.random
    }

    /// Computed duration before jitter, `None` until the first advance.
    pub const fn current(&self) -> Option<u64> {
        self.current
    }

    /// Handle of the outstanding scheduled callback, if any.
    pub const fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    /// Forget any backoff progress. The timer handle is kept.
    #[must_use]
    pub fn reset(mut self) -> Self {
        self.backoff_round = 0;
        self.current = None;
        self
    }

    /// Step the backoff.
    ///
    /// The first advance after construction or [`reset`](Self::reset) yields
    /// the base duration; later ones yield `base * factor^round`, capped at the
    /// ceiling. Without a backoff factor this is a no-op.
    #[must_use]
    pub fn advance(mut self) -> Self {
        let Some(factor) = self.backoff else {
            return self;
        };
        let Some(current) = self.current else {
            self.current = Some(self.base);
            return self;
        };
        if Some(current) == self.backoff_max {
            return self;
        }

        self.backoff_round = self.backoff_round.saturating_add(1);
        let candidate = round_millis(self.base as f64 * factor.powf(f64::from(self.backoff_round)));
        self.current = Some(match self.backoff_max {
            Some(max) => candidate.min(max),
            None => candidate,
        });
        self
    }

    /// The delay to use now, drawn from `rng` when a random window is set.
    pub fn current_value_with<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        let value = self.current.unwrap_or(self.base);
        match &self.random {
            Some(window) => window.sample(value, rng),
            None => value,
        }
    }

    /// The delay to use now, using the thread-local generator for jitter.
    pub fn current_value(&self) -> u64 {
        self.current_value_with(&mut rand::thread_rng())
    }

    /// [`current_value`](Self::current_value) as a `Duration`.
    pub fn current_delay(&self) -> Duration {
        Duration::from_millis(self.current_value())
    }

    /// Advance, sample a delay and ask `scheduler` to deliver `message` to
    /// `target` after it.
    ///
    /// A previously scheduled callback is cancelled once the new one is in
    /// place. On error the new callback is not left pending, so the receiver
    /// still describes the scheduler's state. Returns the new value and the
    /// delay used, in milliseconds.
    pub fn schedule<S: Scheduler + ?Sized>(
        &self,
        scheduler: &S,
        target: &S::Target,
        message: S::Message,
    ) -> Result<(Self, u64), SchedulerError> {
        self.schedule_with(scheduler, target, message, &mut rand::thread_rng())
    }

    /// [`schedule`](Self::schedule) with an explicit random source.
    pub fn schedule_with<S, R>(
        &self,
        scheduler: &S,
        target: &S::Target,
        message: S::Message,
        rng: &mut R,
    ) -> Result<(Self, u64), SchedulerError>
    where
        S: Scheduler + ?Sized,
        R: Rng + ?Sized,
    {
        let mut next = self.clone().advance();
        let delay = next.current_value_with(rng);
        let handle = scheduler.schedule_after(target, message, Duration::from_millis(delay))?;

        if let Some(previous) = self.timer {
            match scheduler.cancel(previous) {
                Ok(result) => {
                    metrics::record_timer_cancelled(CancelOutcome::Timer(result).label());
                    tracing::debug!(handle = %previous, ?result, "Cancelled superseded timer");
                }
                Err(e) => {
                    // Roll back so the caller's value still describes the scheduler.
                    if let Ok(result) = scheduler.cancel(handle) {
                        metrics::record_timer_cancelled(CancelOutcome::Timer(result).label());
                    }
                    tracing::debug!(handle = %previous, error = %e, "Superseded timer could not be cancelled");
                    return Err(e);
                }
            }
        }
        next.timer = Some(handle);

        metrics::record_timer_scheduled(delay);
        tracing::debug!(
            %handle,
            delay_ms = delay,
            backoff_round = next.backoff_round,
            "Timer scheduled"
        );
        Ok((next, delay))
    }

    /// [`schedule`](Self::schedule), discarding the delay used.
    pub fn send_after<S: Scheduler + ?Sized>(
        &self,
        scheduler: &S,
        target: &S::Target,
        message: S::Message,
    ) -> Result<Self, SchedulerError> {
        self.schedule(scheduler, target, message).map(|(next, _)| next)
    }

    /// Cancel the outstanding callback, if any, and clear the handle.
    pub fn cancel<S: Scheduler + ?Sized>(
        &self,
        scheduler: &S,
    ) -> Result<(Self, CancelOutcome), SchedulerError> {
        let Some(handle) = self.timer else {
            return Ok((self.clone(), CancelOutcome::NoTimerPending));
        };

        let result = scheduler.cancel(handle)?;
        let outcome = CancelOutcome::Timer(result);
        metrics::record_timer_cancelled(outcome.label());
        tracing::debug!(%handle, ?result, "Timer cancelled");

        let mut next = self.clone();
        next.timer = None;
        Ok((next, outcome))
    }

    /// [`cancel`](Self::cancel), discarding the outcome.
    pub fn cancel_timer<S: Scheduler + ?Sized>(&self, scheduler: &S) -> Result<Self, SchedulerError> {
        self.cancel(scheduler).map(|(next, _)| next)
    }
}

impl TryFrom<&TimeoutConfig> for Timeout {
    type Error = TimeoutError;

    fn try_from(config: &TimeoutConfig) -> Result<Self, Self::Error> {
        Timeout::new(config.base_ms, config.options())
    }
}
