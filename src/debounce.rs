use std::time::{Duration, Instant};

/// Coalesces rapid repeated triggers into one delayed action. Each `submit`
/// replaces the pending value and pushes the deadline out by the full delay,
/// so a burst of N submits within the delay fires exactly once, with the last
/// value. Polled from the caller's event loop rather than timer-driven; a
/// torn-down loop simply never fires, which is the required best-effort
/// cancellation.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    due: Instant,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn submit(&mut self, value: T, now: Instant) {
        self.pending = Some(Pending {
            value,
            due: now + self.delay,
        });
    }

    /// Fires at most once per quiesced burst.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if now >= pending.due => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Next deadline, if anything is scheduled. Lets an event loop pick its
    /// sleep duration instead of busy-polling.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }
}
