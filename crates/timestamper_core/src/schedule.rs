//! Clock sources and the repeating interval timer driving the stopwatch.
//!
//! # Responsibility
//! - Abstract monotonic time behind `Clock` so timing is testable.
//! - Own tick scheduling: arm, cancel, and report due ticks.
//!
//! # Invariants
//! - `cancel()` is synchronous and idempotent: once it returns, no tick that
//!   was pending is ever reported.
//! - A disarmed timer reports zero due ticks.
//! - Due ticks are reported exactly once.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock backed monotonic source for interactive use.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, at: Duration) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Repeating timer that fires every `interval` once armed.
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: Duration,
    next_due: Option<Duration>,
}

impl IntervalTimer {
    /// Creates a disarmed timer. A zero interval is bumped to one millisecond.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Arms the timer so the first tick is due one interval after `now`.
    ///
    /// Re-arming an armed timer keeps the existing schedule.
    pub fn arm(&mut self, now: Duration) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.interval);
        }
    }

    /// Disarms the timer, discarding every pending tick.
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Consumes and returns the number of ticks due at `now`.
    ///
    /// The schedule keeps its phase: the next tick stays on the grid of
    /// `arm time + k * interval`.
    pub fn take_due(&mut self, now: Duration) -> u32 {
        let Some(due) = self.next_due else {
            return 0;
        };
        if now < due {
            return 0;
        }

        let behind = (now - due).as_nanos() / self.interval.as_nanos();
        let fired = u32::try_from(behind.saturating_add(1)).unwrap_or(u32::MAX);
        let next = self
            .interval
            .checked_mul(fired)
            .and_then(|span| due.checked_add(span))
            .filter(|next| *next > now)
            .unwrap_or_else(|| now.saturating_add(self.interval));
        self.next_due = Some(next);
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, IntervalTimer, ManualClock};
    use std::time::Duration;

    #[test]
    fn disarmed_timer_reports_no_ticks() {
        let mut timer = IntervalTimer::new(Duration::from_secs(1));
        assert_eq!(timer.take_due(Duration::from_secs(10)), 0);
    }

    #[test]
    fn due_ticks_are_reported_once() {
        let mut timer = IntervalTimer::new(Duration::from_secs(1));
        timer.arm(Duration::ZERO);

        assert_eq!(timer.take_due(Duration::from_millis(999)), 0);
        assert_eq!(timer.take_due(Duration::from_millis(3500)), 3);
        assert_eq!(timer.take_due(Duration::from_millis(3500)), 0);
        assert_eq!(timer.take_due(Duration::from_secs(4)), 1);
    }

    #[test]
    fn long_gap_is_counted_in_one_step_and_keeps_phase() {
        let mut timer = IntervalTimer::new(Duration::from_millis(1));
        timer.arm(Duration::from_micros(500));

        let ten_hours = Duration::from_secs(10 * 60 * 60);
        assert_eq!(timer.take_due(ten_hours), 35_999_999);
        assert_eq!(timer.take_due(ten_hours + Duration::from_micros(499)), 0);
        assert_eq!(timer.take_due(ten_hours + Duration::from_micros(500)), 1);
    }

    #[test]
    fn tick_landing_exactly_on_now_is_delivered() {
        let mut timer = IntervalTimer::new(Duration::from_millis(100));
        timer.arm(Duration::ZERO);

        assert_eq!(timer.take_due(Duration::from_millis(300)), 3);
        assert_eq!(timer.take_due(Duration::from_millis(399)), 0);
        assert_eq!(timer.take_due(Duration::from_millis(400)), 1);
    }

    #[test]
    fn cancel_discards_pending_ticks_and_is_idempotent() {
        let mut timer = IntervalTimer::new(Duration::from_millis(100));
        timer.arm(Duration::ZERO);
        timer.cancel();
        timer.cancel();

        assert!(!timer.is_armed());
        assert_eq!(timer.take_due(Duration::from_secs(5)), 0);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let shared = clock.clone();
        clock.advance(Duration::from_secs(2));
        assert_eq!(shared.now(), Duration::from_secs(2));
    }
}
