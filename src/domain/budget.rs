//! Wall-clock budget for one engine invocation.

use std::time::{Duration, Instant};

/// Source of the current time.
///
/// Production code uses [`SystemClock`]; tests inject clocks that advance
/// on every call so budget exhaustion is deterministic.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deadline relative to the start of one engine call.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionBudget {
    started: Instant,
    limit: Option<Duration>,
}

impl ExecutionBudget {
    /// Starts the budget now. `None` never runs out.
    pub fn start<C: Clock + ?Sized>(clock: &C, limit: Option<Duration>) -> Self {
        Self {
            started: clock.now(),
            limit,
        }
    }

    pub fn unlimited<C: Clock + ?Sized>(clock: &C) -> Self {
        Self::start(clock, None)
    }

    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }

    pub fn elapsed<C: Clock + ?Sized>(&self, clock: &C) -> Duration {
        clock.now().saturating_duration_since(self.started)
    }

    /// True once elapsed time has reached the limit.
    pub fn is_exhausted<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        match self.limit {
            Some(limit) => self.elapsed(clock) >= limit,
            None => false,
        }
    }
}
