//! Single-owner trailing-edge debouncer
//!
//! Every `arm` pushes the deadline to `now + window`. `poll` reports true
//! exactly once after the deadline passes, then disarms.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    /// (Re)arm the timer from `now`
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Fire if the quiet period has elapsed. Disarms on fire.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
