//! Deadline-based timers
//!
//! These replace `setTimeout`-style callbacks: owners arm a timer with the
//! current instant and later ask whether it is due. Nothing here sleeps.

use std::time::{Duration, Instant};

/// One-shot timer
#[derive(Debug, Default, Clone)]
pub struct Timeout {
    deadline: Option<Instant>,
}

impl Timeout {
    pub fn new() -> Self {
        Self { deadline: None }
    }

    /// Arm (or re-arm) the timer to fire `after` from `now`
    pub fn set(&mut self, now: Instant, after: Duration) {
        self.deadline = Some(now + after);
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }

    pub fn is_set(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the deadline has passed
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Trailing-edge debounce: fires `wait` after the last trigger
#[derive(Debug, Clone)]
pub struct Debounce {
    wait: Duration,
    timer: Timeout,
}

impl Debounce {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            timer: Timeout::new(),
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.timer.set(now, self.wait);
    }

    pub fn cancel(&mut self) {
        self.timer.clear();
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_set()
    }

    pub fn fire_due(&mut self, now: Instant) -> bool {
        self.timer.fire_due(now)
    }
}

/// Leading + trailing throttle.
///
/// The first call in a window runs immediately; further calls inside the
/// window collapse into a single trailing run at the end of it.
#[derive(Debug, Clone)]
pub struct Throttle {
    wait: Duration,
    last_run: Option<Instant>,
    trailing: bool,
}

impl Throttle {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            last_run: None,
            trailing: false,
        }
    }

    /// Returns true if the caller should run now
    pub fn call(&mut self, now: Instant) -> bool {
        match self.last_run {
            Some(last) if now.saturating_duration_since(last) < self.wait => {
                self.trailing = true;
                false
            }
            _ => {
                self.last_run = Some(now);
                self.trailing = false;
                true
            }
        }
    }

    /// Returns true if a trailing run is due
    pub fn fire_due(&mut self, now: Instant) -> bool {
        let Some(last) = self.last_run else {
            return false;
        };
        if self.trailing && now.saturating_duration_since(last) >= self.wait {
            self.trailing = false;
            self.last_run = Some(now);
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        self.trailing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn timeout_fires_once() {
        let start = Instant::now();
        let mut timeout = Timeout::new();
        timeout.set(start, ms(100));

        assert!(!timeout.fire_due(start + ms(99)));
        assert!(timeout.fire_due(start + ms(100)));
        assert!(!timeout.fire_due(start + ms(500)));
    }

    #[test]
    fn debounce_waits_for_quiet() {
        let start = Instant::now();
        let mut debounce = Debounce::new(ms(100));

        debounce.trigger(start);
        debounce.trigger(start + ms(80));
        assert!(!debounce.fire_due(start + ms(150)));
        assert!(debounce.fire_due(start + ms(180)));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn throttle_runs_leading_then_one_trailing() {
        let start = Instant::now();
        let mut throttle = Throttle::new(ms(200));

        assert!(throttle.call(start));
        assert!(!throttle.call(start + ms(10)));
        assert!(!throttle.call(start + ms(50)));
        assert!(!throttle.fire_due(start + ms(150)));
        assert!(throttle.fire_due(start + ms(200)));
        assert!(!throttle.fire_due(start + ms(500)));
        assert!(throttle.call(start + ms(500)));
    }
}
