//! Quiescence tracking for bursty change signals.

use std::time::Duration;
use tokio::time::Instant;

/// Edge-triggered debounce: every signal pushes the deadline out by the
/// quiescence window, and the deadline fires once.
#[derive(Debug, Clone)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self { window, deadline: None }
    }

    /// Record a change signal at `now`, superseding any earlier deadline
    #[inline]
    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the deadline if it has passed
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }
}
