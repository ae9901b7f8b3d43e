//! Interval scheduling for the render loop's periodic tasks.
//!
//! Time comes from a [`Clock`] as a `Duration` since an arbitrary origin, so
//! the same scheduler runs against the real monotonic clock in production and
//! against a [`ManualClock`] in tests.
//!
//! Scheduling is cooperative: the caller asks which tasks are due, runs them
//! one after another, then asks again. A task that fell behind fires once
//! and is rescheduled one interval after "now"; missed ticks are never
//! replayed as a backlog.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Shortest interval accepted; a zero interval would spin the loop.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Source of monotonic time.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time based on [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Virtual clock advanced by hand.
///
/// Clones share the same time, so a test can keep one handle while the
/// render loop owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<Mutex<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug)]
struct Scheduled<T> {
    task: T,
    interval: Duration,
    next_due: Duration,
}

/// Set of named periodic tasks with independent intervals.
#[derive(Debug)]
pub struct IntervalScheduler<T> {
    tasks: Vec<Scheduled<T>>,
}

impl<T> Default for IntervalScheduler<T> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<T: Copy> IntervalScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` to fire every `interval`, first at `now + interval`.
    pub fn every(&mut self, task: T, interval: Duration, now: Duration) {
        let interval = interval.max(MIN_INTERVAL);
        self.tasks.push(Scheduled { task, interval, next_due: now + interval });
    }

    /// Tasks due at `now`, earliest deadline first (registration order on ties).
    ///
    /// Each returned task is rescheduled before this returns.
    pub fn due(&mut self, now: Duration) -> Vec<T> {
        let mut fired: Vec<(Duration, usize)> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, s)| s.next_due <= now)
            .map(|(idx, s)| (s.next_due, idx))
            .collect();
        fired.sort();

        fired
            .into_iter()
            .map(|(_, idx)| {
                let scheduled = &mut self.tasks[idx];
                scheduled.next_due += scheduled.interval;
                // Behind schedule: skip the missed ticks
                if scheduled.next_due <= now {
                    scheduled.next_due = now + scheduled.interval;
                }
                scheduled.task
            })
            .collect()
    }

    /// Earliest upcoming deadline, `None` if nothing is registered.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.tasks.iter().map(|s| s.next_due).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Task {
        Slow,
        Fast,
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn scheduler() -> IntervalScheduler<Task> {
        let mut s = IntervalScheduler::new();
        s.every(Task::Slow, ms(100), Duration::ZERO);
        s.every(Task::Fast, ms(50), Duration::ZERO);
        s
    }

    #[test]
    fn test_nothing_due_before_first_interval() {
        let mut s = scheduler();
        assert!(s.due(ms(0)).is_empty());
        assert!(s.due(ms(49)).is_empty());
        assert_eq!(s.next_deadline(), Some(ms(50)));
    }

    #[test]
    fn test_virtual_clock_counts() {
        let clock = ManualClock::new();
        let mut s = scheduler();
        let mut fired = Vec::new();

        for _ in 0..10 {
            clock.advance(ms(10));
            fired.extend(s.due(clock.now()));
        }

        assert_eq!(fired, vec![Task::Fast, Task::Slow, Task::Fast]);
        assert_eq!(s.next_deadline(), Some(ms(150)));
    }

    #[test]
    fn test_tie_uses_registration_order() {
        let mut s = scheduler();
        assert_eq!(s.due(ms(50)), vec![Task::Fast]);
        assert_eq!(s.due(ms(100)), vec![Task::Slow, Task::Fast]);
    }

    #[test]
    fn test_overrun_is_not_replayed() {
        let mut s = scheduler();
        // Loop stalled for a full second: each task fires once, not 10-20 times
        assert_eq!(s.due(ms(1000)), vec![Task::Fast, Task::Slow]);
        assert!(s.due(ms(1000)).is_empty());
        assert_eq!(s.due(ms(1050)), vec![Task::Fast]);
        assert_eq!(s.due(ms(1100)), vec![Task::Slow, Task::Fast]);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let mut s = IntervalScheduler::new();
        s.every(Task::Fast, Duration::ZERO, Duration::ZERO);
        assert_eq!(s.next_deadline(), Some(MIN_INTERVAL));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(ms(25));
        assert_eq!(other.now(), ms(25));
    }
}
