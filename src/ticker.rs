use std::time::{Duration, Instant};

/// Fixed-interval timer driven by whoever owns the event loop.
/// It never sleeps; the owner asks it whether a tick is due.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self { interval, next_due: None }
    }

    /// The first tick is due immediately.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true at most once per call when the interval has elapsed.
    /// Missed intervals collapse into a single tick.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}
