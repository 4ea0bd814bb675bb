use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Expired,
}

/// How a running timer finished.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FinishKind {
    /// The countdown reached zero.
    Expired,
    /// The user ended the interval early.
    Done,
}

/// Raised once per interval, when it expires or is marked done.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerEvent {
    pub kind: FinishKind,
    /// Time spent running; always within `[0, initial duration]`.
    pub elapsed: Duration,
}

impl TimerEvent {
    pub fn elapsed_seconds(&self) -> i64 {
        self.elapsed.as_secs() as i64
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("cannot {action} while the timer is {from:?}")]
    InvalidTransition {
        from: TimerStatus,
        action: &'static str,
    },
    #[error("timer duration must be greater than zero")]
    ZeroDuration,
}

/// Countdown timer anchored to an absolute deadline.
///
/// Remaining time is always recomputed as `deadline - now`, so late or
/// missed ticks never accumulate drift. Every method takes the current
/// instant explicitly.
#[derive(Debug, Clone)]
pub struct Timer {
    status: TimerStatus,
    initial: Duration,
    /// Frozen remaining time; only meaningful outside `Running`.
    remaining: Duration,
    deadline: Option<Instant>,
}

impl Timer {
    /// An idle timer that will count down from `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            status: TimerStatus::Idle,
            initial: duration,
            remaining: duration,
            deadline: None,
        }
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn initial(&self) -> Duration {
        self.initial
    }

    /// Time left at `now`.
    pub fn remaining(&self, now: Instant) -> Duration {
        match (self.status, self.deadline) {
            (TimerStatus::Running, Some(deadline)) => deadline.saturating_duration_since(now),
            _ => self.remaining,
        }
    }

    pub fn start(&mut self, duration: Duration, now: Instant) -> Result<(), TimerError> {
        if duration.is_zero() {
            return Err(TimerError::ZeroDuration);
        }
        match self.status {
            TimerStatus::Idle | TimerStatus::Expired => {
                self.status = TimerStatus::Running;
                self.initial = duration;
                self.remaining = duration;
                self.deadline = Some(now + duration);
                Ok(())
            }
            from => Err(TimerError::InvalidTransition {
                from,
                action: "start",
            }),
        }
    }

    pub fn pause(&mut self, now: Instant) -> Result<(), TimerError> {
        if self.status != TimerStatus::Running {
            return Err(TimerError::InvalidTransition {
                from: self.status,
                action: "pause",
            });
        }
        self.remaining = self.remaining(now);
        self.deadline = None;
        self.status = TimerStatus::Paused;
        Ok(())
    }

    pub fn resume(&mut self, now: Instant) -> Result<(), TimerError> {
        if self.status != TimerStatus::Paused {
            return Err(TimerError::InvalidTransition {
                from: self.status,
                action: "resume",
            });
        }
        self.deadline = Some(now + self.remaining);
        self.status = TimerStatus::Running;
        Ok(())
    }

    /// Back to `Idle` with a fresh duration; any pending deadline is dropped.
    pub fn reset(&mut self, duration: Duration) {
        *self = Self::new(duration);
    }

    /// Advances the countdown. Returns the expiry event the first time the
    /// remaining time reaches zero.
    pub fn tick(&mut self, now: Instant) -> Option<TimerEvent> {
        if self.status != TimerStatus::Running {
            return None;
        }

        let remaining = self.remaining(now);
        if !remaining.is_zero() {
            return None;
        }

        self.status = TimerStatus::Expired;
        self.remaining = Duration::ZERO;
        self.deadline = None;
        Some(TimerEvent {
            kind: FinishKind::Expired,
            elapsed: self.initial.saturating_sub(remaining),
        })
    }

    /// Ends a running or paused interval early and resets the timer.
    pub fn done(&mut self, now: Instant) -> Option<TimerEvent> {
        match self.status {
            TimerStatus::Running | TimerStatus::Paused => {
                let elapsed = self.initial.saturating_sub(self.remaining(now));
                self.reset(self.initial);
                Some(TimerEvent {
                    kind: FinishKind::Done,
                    elapsed,
                })
            }
            TimerStatus::Idle | TimerStatus::Expired => None,
        }
    }
}
