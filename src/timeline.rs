//! Cancelable timers on a virtual clock.
//!
//! A [`Timeline`] owns every pending timer of one engine instance. The clock
//! only moves when the frame loop calls [`Timeline::advance`], so a paused
//! host (no frames) pauses every timer with it. Due events are drained with
//! [`Timeline::pop_due`] in due order; events scheduled while draining are
//! seen by the same drain if they are already due.
//!
//! [`Timeline::cancel_all`] is the teardown path: it drops every pending
//! timer and seals the timeline so later `schedule` calls are ignored.

use std::time::Duration;

/// Handle to a scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Scheduled<E> {
    id: TimerId,
    due: Duration,
    event: E,
}

/// Pending timers and the virtual clock they run on.
#[derive(Debug)]
pub struct Timeline<E> {
    now: Duration,
    next_id: u64,
    pending: Vec<Scheduled<E>>,
    sealed: bool,
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timeline<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            pending: Vec::new(),
            sealed: false,
        }
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers still pending.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether [`cancel_all`](Self::cancel_all) has run.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Fire `event` once `delay` has elapsed on this timeline.
    ///
    /// On a sealed timeline the event is dropped immediately.
    pub fn schedule(&mut self, delay: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        if !self.sealed {
            self.pending.push(Scheduled {
                id,
                due: self.now + delay,
                event,
            });
        }
        id
    }

    /// Cancel one timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.id != id);
        self.pending.len() != before
    }

    /// Cancel every pending timer and refuse new ones. Idempotent.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
        self.sealed = true;
    }

    /// Move the clock forward.
    pub fn advance(&mut self, dt: Duration) {
        if !self.sealed {
            self.now += dt;
        }
    }

    /// Remove and return the earliest event that is due, if any.
    ///
    /// Ties are broken by scheduling order.
    pub fn pop_due(&mut self) -> Option<E> {
        let now = self.now;
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= now)
            .min_by_key(|(_, s)| (s.due, s.id.0))
            .map(|(index, _)| index)?;
        Some(self.pending.swap_remove(index).event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn drain(timeline: &mut Timeline<&'static str>) -> Vec<&'static str> {
        std::iter::from_fn(|| timeline.pop_due()).collect()
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(300), "late");
        timeline.schedule(ms(100), "early");
        timeline.schedule(ms(100), "early-second");

        timeline.advance(ms(50));
        assert!(drain(&mut timeline).is_empty());

        timeline.advance(ms(300));
        assert_eq!(drain(&mut timeline), vec!["early", "early-second", "late"]);
        assert_eq!(timeline.pending(), 0);
    }

    #[test]
    fn test_cancel_single() {
        let mut timeline = Timeline::new();
        let id = timeline.schedule(ms(10), "a");
        timeline.schedule(ms(10), "b");
        assert!(timeline.cancel(id));
        assert!(!timeline.cancel(id));

        timeline.advance(ms(20));
        assert_eq!(drain(&mut timeline), vec!["b"]);
    }

    #[test]
    fn test_cancel_all_seals() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(10), "a");
        timeline.cancel_all();
        timeline.cancel_all();
        timeline.schedule(ms(0), "after");

        timeline.advance(ms(100));
        assert!(drain(&mut timeline).is_empty());
        assert!(timeline.is_sealed());
        assert_eq!(timeline.now(), Duration::ZERO);
    }

    #[test]
    fn test_schedule_while_draining() {
        let mut timeline = Timeline::new();
        timeline.schedule(ms(10), 1u32);
        timeline.advance(ms(10));

        let first = timeline.pop_due();
        assert_eq!(first, Some(1));
        timeline.schedule(Duration::ZERO, 2);
        assert_eq!(timeline.pop_due(), Some(2));
        assert_eq!(timeline.pop_due(), None);
    }
}
