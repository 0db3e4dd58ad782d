//! Per-surface interaction state for one press cycle.

use crate::event::{Point, PointerEvent};
use crate::schedule::{Throttle, TimerHandle};

/// A hold timer in flight, with the press event it will report.
#[derive(Debug, Clone)]
pub struct PendingHold {
    pub handle: TimerHandle,
    pub event: PointerEvent,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    /// A press is down.
    pub active: bool,
    /// Movement exceeded the tap tolerance this cycle. Never goes back to
    /// false before the cycle ends.
    pub moved: bool,
    /// Swipe candidacy was given up for this cycle.
    pub swipe_locked: bool,
    pub zooming: bool,

    pub start: Point,
    pub current: Point,

    pub press_started_at: f64,
    pub last_touch_start: Option<f64>,
    pub last_touch_end: Option<f64>,

    pub hold: Option<PendingHold>,
    /// The hold timer of the current cycle ran to completion.
    pub hold_fired: bool,

    pub rollover: Throttle,
    pub drag: Throttle,
    pub zoom: Throttle,

    pub initial_pinch_distance: Option<f64>,

    // snapshotted at press start
    pub has_swipe: bool,
    pub has_zoom: bool,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters a fresh cycle at `start`. Throttle history and the dedup
    /// timestamps survive across cycles.
    pub fn begin_press(&mut self, start: Point, timestamp: f64, has_swipe: bool, has_zoom: bool) {
        self.active = true;
        self.moved = false;
        self.swipe_locked = false;
        self.zooming = false;
        self.initial_pinch_distance = None;
        self.hold_fired = false;
        self.start = start;
        self.current = Point::ORIGIN;
        self.press_started_at = timestamp;
        self.has_swipe = has_swipe;
        self.has_zoom = has_zoom;
    }

    /// Leaves the active cycle, handing back any hold timer still pending
    /// so the caller can cancel it.
    pub fn end_press(&mut self) -> Option<TimerHandle> {
        self.active = false;
        self.hold.take().map(|h| h.handle)
    }

    /// Cancel path: drops the cycle and rewinds the start point.
    pub fn reset(&mut self) -> Option<TimerHandle> {
        let pending = self.end_press();
        self.moved = false;
        self.start = Point::ORIGIN;
        pending
    }

    pub fn hold_pending(&self) -> bool {
        self.hold.is_some()
    }

    /// Displacement from the press point, per axis.
    pub fn displacement(&self) -> (f64, f64) {
        (
            (self.start.x - self.current.x).abs(),
            (self.start.y - self.current.y).abs(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SurfaceId;
    use crate::event::Phase;
    use crate::schedule::TimerQueue;

    #[test]
    fn begin_press_resets_cycle_flags() {
        let mut st = InteractionState::new();
        st.moved = true;
        st.swipe_locked = true;
        st.zooming = true;
        st.initial_pinch_distance = Some(3.0);
        st.begin_press(Point::new(5.0, 6.0), 100.0, true, false);

        assert!(st.active);
        assert!(!st.moved);
        assert!(!st.swipe_locked);
        assert!(!st.zooming);
        assert_eq!(st.initial_pinch_distance, None);
        assert_eq!(st.start, Point::new(5.0, 6.0));
        assert_eq!(st.current, Point::ORIGIN);
        assert!(st.has_swipe);
        assert!(!st.has_zoom);
    }

    #[test]
    fn reset_returns_pending_hold_and_clears() {
        let mut q = TimerQueue::new();
        let mut st = InteractionState::new();
        st.begin_press(Point::new(5.0, 6.0), 0.0, false, false);
        st.moved = true;
        let handle = q.schedule(SurfaceId::new(1), 400.0);
        st.hold = Some(PendingHold {
            handle,
            event: PointerEvent::mouse(Phase::Start, 0.0, 5.0, 6.0),
        });

        assert_eq!(st.reset(), Some(handle));
        assert!(!st.active);
        assert!(!st.moved);
        assert!(!st.hold_pending());
        assert_eq!(st.start, Point::ORIGIN);
        assert_eq!(st.reset(), None);
    }
}
