//! Throttles for continuous gestures and the deferred hold timer queue.
//!
//! Everything here runs on event time. A throttle compares the timestamp
//! of the incoming event with the timestamp of its last fire; the timer
//! queue is drained by the engine up to a given timestamp.

use std::collections::HashMap;

use log::trace;

use crate::engine::SurfaceId;

/// Minimum-interval gate on repeat firing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Throttle {
    last: Option<f64>,
}

impl Throttle {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Permits a fire when none happened yet, or `ts` is strictly past
    /// `last + frequency`. Records `ts` when permitted.
    pub fn try_fire(&mut self, ts: f64, frequency: f64) -> bool {
        match self.last {
            Some(last) if ts <= last + frequency => {
                trace!("throttled: ts={ts} last={last} freq={frequency}");
                false
            }
            _ => {
                self.last = Some(ts);
                true
            }
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    surface: SurfaceId,
    deadline: f64,
}

/// Single-shot deferred tasks. Cancelling is always safe: a handle that
/// already fired or was cancelled is simply not found.
#[derive(Debug, Default)]
pub struct TimerQueue {
    next: u64,
    pending: HashMap<TimerHandle, Pending>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, surface: SurfaceId, deadline: f64) -> TimerHandle {
        self.next += 1;
        let handle = TimerHandle(self.next);
        self.pending.insert(handle, Pending { surface, deadline });
        trace!("timer {handle:?} scheduled for {surface} at {deadline}");
        handle
    }

    /// Returns whether the timer was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    pub fn cancel_surface(&mut self, surface: SurfaceId) {
        self.pending.retain(|_, p| p.surface != surface);
    }

    /// Removes and returns every timer due at `now`, earliest first.
    pub fn take_due(&mut self, now: f64) -> Vec<(SurfaceId, TimerHandle)> {
        let mut due: Vec<(f64, TimerHandle, SurfaceId)> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(h, p)| (p.deadline, *h, p.surface))
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (_, h, _) in &due {
            self.pending.remove(h);
        }
        due.into_iter().map(|(_, h, s)| (s, h)).collect()
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.pending
            .values()
            .map(|p| p.deadline)
            .min_by(|a, b| a.total_cmp(b))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttle_first_fire_always_passes() {
        let mut t = Throttle::new();
        assert!(t.try_fire(0.0, 100.0));
        assert_eq!(t.last, Some(0.0));
    }

    #[test]
    fn throttle_needs_strictly_more_than_frequency() {
        let mut t = Throttle::new();
        assert!(t.try_fire(1000.0, 10.0));
        assert!(!t.try_fire(1005.0, 10.0));
        assert!(!t.try_fire(1010.0, 10.0));
        assert!(t.try_fire(1011.0, 10.0));
        assert_eq!(t.last, Some(1011.0));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut q = TimerQueue::new();
        let h = q.schedule(SurfaceId::new(1), 400.0);
        assert!(q.cancel(h));
        assert!(!q.cancel(h));
        assert!(q.take_due(1000.0).is_empty());
    }

    #[test]
    fn take_due_orders_by_deadline_and_removes() {
        let mut q = TimerQueue::new();
        let late = q.schedule(SurfaceId::new(1), 500.0);
        let early = q.schedule(SurfaceId::new(2), 300.0);
        let future = q.schedule(SurfaceId::new(3), 900.0);

        let due = q.take_due(500.0);
        assert_eq!(
            due,
            vec![(SurfaceId::new(2), early), (SurfaceId::new(1), late)]
        );
        assert!(!q.cancel(early));
        assert!(q.pending.contains_key(&future));
        assert_eq!(q.next_deadline(), Some(900.0));
    }

    #[test]
    fn cancel_surface_drops_only_that_surface() {
        let mut q = TimerQueue::new();
        q.schedule(SurfaceId::new(1), 10.0);
        let keep = q.schedule(SurfaceId::new(2), 10.0);
        q.cancel_surface(SurfaceId::new(1));
        assert_eq!(q.len(), 1);
        assert!(q.pending.contains_key(&keep));
    }
}
