//! Virtual clock and cancellable timer queue.
//!
//! Every controller that sequences anything in time owns one `TimerQueue` and
//! is advanced explicitly by its host. Time is integer milliseconds so stage
//! and watchdog arithmetic is exact.
//!
//! Drive loop used by the controllers:
//!
//! ```
//! use site_motion_core::TimerQueue;
//!
//! let mut q: TimerQueue<&str> = TimerQueue::new(0);
//! q.schedule(10, "a");
//! while let Some(fired) = q.pop_due(16) {
//!     assert_eq!(fired.event, "a");
//! }
//! q.settle(16);
//! assert_eq!(q.now(), 16);
//! ```

use crate::ids::{IdAllocator, TimerId};

/// Milliseconds on the virtual clock.
pub type Millis = u64;

#[derive(Debug, Clone)]
struct Entry<E> {
    id: TimerId,
    due: Millis,
    seq: u64,
    period: Option<Millis>,
    event: E,
}

/// A timer that came due during an advance.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<E> {
    pub id: TimerId,
    pub at: Millis,
    pub event: E,
}

#[derive(Debug)]
pub struct TimerQueue<E> {
    now: Millis,
    seq: u64,
    ids: IdAllocator,
    pending: Vec<Entry<E>>,
}

impl<E: Clone> TimerQueue<E> {
    pub fn new(now: Millis) -> Self {
        Self {
            now,
            seq: 0,
            ids: IdAllocator::new(),
            pending: Vec::new(),
        }
    }

    #[inline]
    pub fn now(&self) -> Millis {
        self.now
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|e| e.id == id)
    }

    fn next_seq(&mut self) -> u64 {
        let s = self.seq;
        self.seq = self.seq.wrapping_add(1);
        s
    }

    /// One-shot timer firing `delay` ms from now.
    pub fn schedule(&mut self, delay: Millis, event: E) -> TimerId {
        let id = self.ids.alloc_timer();
        let seq = self.next_seq();
        self.pending.push(Entry {
            id,
            due: self.now.saturating_add(delay),
            seq,
            period: None,
            event,
        });
        id
    }

    /// Repeating timer, first firing one period from now. A zero period is
    /// treated as 1 ms so an advance always terminates.
    pub fn schedule_every(&mut self, period: Millis, event: E) -> TimerId {
        let period = period.max(1);
        let id = self.ids.alloc_timer();
        let seq = self.next_seq();
        self.pending.push(Entry {
            id,
            due: self.now.saturating_add(period),
            seq,
            period: Some(period),
            event,
        });
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|e| e.id != id);
        self.pending.len() != before
    }

    /// Cancel everything; returns how many timers were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn next_due(&self) -> Option<Millis> {
        self.pending.iter().map(|e| e.due).min()
    }

    /// Pop the earliest timer due at or before `until` (ties fire in
    /// scheduling order) and move the clock to its due time. Repeating timers
    /// are re-armed one period later under the same id.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired<E>> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;

        let due = self.pending[idx].due;
        self.now = self.now.max(due);

        let fired = match self.pending[idx].period {
            Some(period) => {
                let seq = self.next_seq();
                let entry = &mut self.pending[idx];
                entry.due = due.saturating_add(period);
                entry.seq = seq;
                Fired {
                    id: entry.id,
                    at: due,
                    event: entry.event.clone(),
                }
            }
            None => {
                let entry = self.pending.swap_remove(idx);
                Fired {
                    id: entry.id,
                    at: due,
                    event: entry.event,
                }
            }
        };
        log::trace!("timer {:?} fired at {}ms", fired.id, fired.at);
        Some(fired)
    }

    /// Move the clock forward to `until` once every due timer was popped.
    #[inline]
    pub fn settle(&mut self, until: Millis) {
        self.now = self.now.max(until);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(q: &mut TimerQueue<u8>, until: Millis) -> Vec<(Millis, u8)> {
        let mut out = Vec::new();
        while let Some(f) = q.pop_due(until) {
            out.push((f.at, f.event));
        }
        q.settle(until);
        out
    }

    #[test]
    fn fires_in_due_then_schedule_order() {
        let mut q = TimerQueue::new(0);
        q.schedule(30, 3);
        q.schedule(10, 1);
        q.schedule(10, 2);
        assert_eq!(drain(&mut q, 100), vec![(10, 1), (10, 2), (30, 3)]);
        assert_eq!(q.now(), 100);
        assert!(q.is_empty());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut q = TimerQueue::new(0);
        let a = q.schedule(5, 1);
        q.schedule(6, 2);
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert_eq!(drain(&mut q, 10), vec![(6, 2)]);
    }

    #[test]
    fn interval_rearms_until_cancelled() {
        let mut q = TimerQueue::new(0);
        let id = q.schedule_every(16, 7);
        assert_eq!(drain(&mut q, 50), vec![(16, 7), (32, 7), (48, 7)]);
        assert!(q.is_pending(id));
        assert_eq!(q.next_due(), Some(64));
        q.cancel(id);
        assert!(drain(&mut q, 1000).is_empty());
    }

    #[test]
    fn timers_scheduled_mid_advance_fire_in_same_window() {
        let mut q = TimerQueue::new(0);
        q.schedule(10, 1);
        let mut seen = Vec::new();
        while let Some(f) = q.pop_due(100) {
            seen.push((f.at, f.event));
            if f.event == 1 {
                // delay is relative to the fired timer's due time
                q.schedule(20, 2);
            }
        }
        assert_eq!(seen, vec![(10, 1), (30, 2)]);
    }

    #[test]
    fn nothing_fires_before_due() {
        let mut q = TimerQueue::new(100);
        q.schedule(50, 1);
        assert!(drain(&mut q, 149).is_empty());
        assert_eq!(drain(&mut q, 150), vec![(150, 1)]);
    }
}
