//! FILENAME: core/engine/src/notify.rs
//! PURPOSE: Debounce timer for the selection-changed callback.
//! CONTEXT: The controller owns one `Debouncer`. Every selection change re-arms
//! it; the host's event loop polls it and the callback fires once the quiet
//! period has elapsed. No threads, no background scheduling.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time, swappable for deterministic tests.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Single-shot trailing-edge debounce timer.
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
    clock: Rc<dyn Clock>,
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.window)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl Debouncer {
    pub fn new(window: Duration, clock: Rc<dyn Clock>) -> Self {
        Debouncer {
            window,
            deadline: None,
            clock,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn set_clock(&mut self, clock: Rc<dyn Clock>) {
        self.clock = clock;
    }

    /// Start (or restart) the quiet period.
    pub fn arm(&mut self) {
        self.deadline = Some(self.clock.now() + self.window);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consumes the pending event if its quiet period has elapsed.
    pub fn take_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if self.clock.now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Consumes the pending event regardless of the deadline.
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }
}
