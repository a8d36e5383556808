//! Time source and the deadline primitives every KioskView timer is built from.
//!
//! Nothing here sleeps or spawns. Owners poll with the current instant and the
//! GUI shell wakes itself up at the earliest pending deadline.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time from the OS monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Used by tests and the headless demo.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Cell::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.offset.get()
    }
}

/// A cancellable single-shot deadline.
#[derive(Debug, Default, Clone)]
pub struct OneShotTimer {
    deadline: Option<Instant>,
}

impl OneShotTimer {
    pub fn new() -> Self {
        Self { deadline: None }
    }

    /// Arms the timer, replacing any earlier deadline.
    pub fn start(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    /// Disarms the timer. Returns whether it was armed; cancelling twice is a no-op.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before expiry, zero once due.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Disarms and returns `true` if the deadline has been reached.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A debounced action: scheduling again before it fires replaces the pending
/// run (and its payload) and pushes the deadline out.
#[derive(Debug, Clone)]
pub struct Debouncer<T = ()> {
    delay: Duration,
    timer: OneShotTimer,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            timer: OneShotTimer::new(),
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&mut self, now: Instant, payload: T) {
        self.pending = Some(payload);
        self.timer.start(now, self.delay);
    }

    pub fn cancel(&mut self) -> bool {
        self.pending = None;
        self.timer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_running()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Returns the latest payload once the quiet period has elapsed.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<T> {
        if self.timer.fire_if_due(now) {
            self.pending.take()
        } else {
            None
        }
    }
}

/// Earliest of a set of optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}
