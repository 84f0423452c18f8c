//! Periodic tickers driven by an explicit clock instead of timer callbacks.

use std::time::{Duration, Instant};

pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
#[cfg(test)]
#[derive(Default)]
pub struct ManualClock {
    now: std::cell::Cell<Duration>,
}

#[cfg(test)]
impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Fires once per `period` while running. Stopped tickers never fire.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    next_due: Option<Duration>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Ticker { period, next_due: None }
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Restarts the period from `now`, running or not.
    pub fn reset(&mut self, now: Duration) {
        self.next_due = Some(now + self.period);
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    /// When the ticker owes a firing at or before `now`.
    pub fn due_by(&self, now: Duration) -> Option<Duration> {
        self.next_due.filter(|&due| due <= now)
    }

    /// Consumes the pending firing and schedules the next one.
    pub fn fire(&mut self) {
        if let Some(due) = self.next_due {
            self.next_due = Some(due + self.period);
        }
    }
}
