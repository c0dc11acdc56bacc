//! Deadline bookkeeping for a set of periodic tick sources.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::{Clock, TickSourceId};

#[derive(Debug, Clone, Copy)]
struct Timer {
    interval: Duration,
    next: Instant,
}

/// A [`Clock`] that only tracks deadlines. The caller sleeps until
/// [`next_deadline`](Self::next_deadline) and collects [`due`](Self::due) ids.
#[derive(Debug, Default)]
pub struct IntervalClock {
    timers: BTreeMap<TickSourceId, Timer>,
}

impl IntervalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule relative to an explicit instant.
    pub fn schedule_from(&mut self, source: TickSourceId, interval_ms: u64, now: Instant) {
        let interval = Duration::from_millis(interval_ms.max(1));
        self.timers.insert(
            source,
            Timer {
                interval,
                next: now + interval,
            },
        );
    }

    /// Earliest pending deadline, if any source is scheduled.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.values().map(|t| t.next).min()
    }

    /// Sources whose deadline has passed, in id order.
    ///
    /// Each due source is reported once per call and its deadline moves
    /// forward by exactly one interval, so a late caller catches up one tick
    /// at a time instead of skipping ticks.
    pub fn due(&mut self, now: Instant) -> Vec<TickSourceId> {
        self.timers
            .iter_mut()
            .filter(|(_, timer)| timer.next <= now)
            .map(|(id, timer)| {
                timer.next += timer.interval;
                *id
            })
            .collect()
    }

    /// Current interval of a source.
    pub fn interval(&self, source: TickSourceId) -> Option<Duration> {
        self.timers.get(&source).map(|t| t.interval)
    }

    /// Whether no source is scheduled.
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
    }
}

impl Clock for IntervalClock {
    fn schedule(&mut self, source: TickSourceId, interval_ms: u64) {
        self.schedule_from(source, interval_ms, Instant::now());
    }

    fn cancel(&mut self, source: TickSourceId) {
        self.timers.remove(&source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: TickSourceId = TickSourceId(1);
    const B: TickSourceId = TickSourceId(2);

    #[test]
    fn nothing_due_before_deadline() {
        let now = Instant::now();
        let mut clock = IntervalClock::new();
        clock.schedule_from(A, 100, now);
        assert!(clock.due(now + Duration::from_millis(50)).is_empty());
        assert_eq!(clock.due(now + Duration::from_millis(100)), vec![A]);
    }

    #[test]
    fn late_caller_catches_up_one_tick_per_call() {
        let now = Instant::now();
        let mut clock = IntervalClock::new();
        clock.schedule_from(A, 10, now);
        let late = now + Duration::from_millis(35);
        assert_eq!(clock.due(late), vec![A]);
        assert_eq!(clock.due(late), vec![A]);
        assert_eq!(clock.due(late), vec![A]);
        assert!(clock.due(late).is_empty());
    }

    #[test]
    fn reschedule_replaces_interval() {
        let now = Instant::now();
        let mut clock = IntervalClock::new();
        clock.schedule_from(A, 500, now);
        clock.schedule_from(A, 1000, now);
        assert_eq!(clock.interval(A), Some(Duration::from_millis(1000)));
        assert_eq!(clock.next_deadline(), Some(now + Duration::from_millis(1000)));
    }

    #[test]
    fn independent_sources() {
        let now = Instant::now();
        let mut clock = IntervalClock::new();
        clock.schedule_from(A, 10, now);
        clock.schedule_from(B, 30, now);
        assert_eq!(clock.next_deadline(), Some(now + Duration::from_millis(10)));
        assert_eq!(clock.due(now + Duration::from_millis(30)), vec![A, B]);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut clock = IntervalClock::new();
        clock.schedule(A, 10);
        clock.cancel(A);
        clock.cancel(A);
        assert!(clock.is_idle());
        assert!(clock.next_deadline().is_none());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let now = Instant::now();
        let mut clock = IntervalClock::new();
        clock.schedule_from(A, 0, now);
        assert_eq!(clock.interval(A), Some(Duration::from_millis(1)));
    }
}
