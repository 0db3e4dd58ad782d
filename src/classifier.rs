//! Press → move → release state machine for a single surface.
//!
//! The classifier mutates the surface's [`InteractionState`] and reports
//! which gestures the engine should dispatch, in order. It never invokes
//! callbacks itself.

use log::debug;

use crate::config::Options;
use crate::engine::SurfaceId;
use crate::event::{Point, PointerEvent};
use crate::gestures::{Direction, Gesture, GestureParam};
use crate::registry::Registry;
use crate::schedule::{TimerHandle, TimerQueue};
use crate::state::{InteractionState, PendingHold};
use crate::zoom::{self, ZoomInterest};

/// Window in which an event of the other input kind is taken to be the
/// synthetic echo of a touch interaction.
pub const DEDUP_WINDOW_MS: f64 = 350.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Emission {
    pub gesture: Gesture,
    pub param: GestureParam,
}

impl Emission {
    fn plain(gesture: Gesture) -> Self {
        Self {
            gesture,
            param: GestureParam::None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub emissions: Vec<Emission>,
    /// Pressed-class transition: `Some(true)` to add, `Some(false)` to remove.
    pub pressed: Option<bool>,
}

impl Outcome {
    fn emit(&mut self, gesture: Gesture) {
        self.emissions.push(Emission::plain(gesture));
    }

    fn emit_with(&mut self, gesture: Gesture, param: GestureParam) {
        self.emissions.push(Emission { gesture, param });
    }
}

pub struct Classifier<'a> {
    pub id: SurfaceId,
    pub state: &'a mut InteractionState,
    pub registry: &'a Registry,
    pub options: &'a Options,
    pub timers: &'a mut TimerQueue,
}

impl Classifier<'_> {
    pub fn press(&mut self, ev: &PointerEvent) -> Outcome {
        let ts = ev.timestamp;
        if ev.is_touch() {
            self.state.last_touch_start = Some(ts);
        }

        if ev.is_mouse() && self.echoes_touch(ts) {
            debug!("{}: dropping synthetic mouse press at {ts}", self.id);
            return Outcome::default();
        }

        if self.state.active {
            return Outcome::default();
        }

        let mut out = Outcome {
            pressed: Some(true),
            ..Default::default()
        };

        self.state.begin_press(
            ev.coords(),
            ts,
            self.registry.has_swipe(),
            self.registry.has_zoom(),
        );

        if self.registry.has(Gesture::Hold) {
            let handle = self
                .timers
                .schedule(self.id, ts + self.options.touch_hold_tolerance);
            self.state.hold = Some(PendingHold {
                handle,
                event: ev.clone(),
            });
        }

        debug!("{}: press at {:?}", self.id, self.state.start);
        out.emit(Gesture::Press);
        out
    }

    pub fn moved(&mut self, ev: &PointerEvent) -> Outcome {
        let mut out = Outcome::default();
        if self.state.active {
            self.sample(ev, false, &mut out);
        } else if ev.within_bounds && self.registry.has(Gesture::Rollover) {
            self.sample(ev, true, &mut out);
        }
        out
    }

    fn sample(&mut self, ev: &PointerEvent, rollover_only: bool, out: &mut Outcome) {
        let ts = ev.timestamp;
        let cur = ev.coords();
        let moved_again = cur != self.state.current;
        self.state.current = cur;

        if !rollover_only {
            let (dx, dy) = self.state.displacement();
            if !self.state.moved {
                let tol = self.options.tap_tolerance;
                if dx > tol || dy > tol {
                    self.state.moved = true;
                    self.cancel_hold();
                    debug!("{}: drag started", self.id);
                    out.emit(Gesture::DragOnce);
                }
            } else if self.state.has_swipe
                && !self.state.swipe_locked
                && in_swipe_cone(dx, dy, self.options.swipe_cone_size)
            {
                let tol = self.options.swipe_tolerance;
                self.state.swipe_locked = dx < tol && dy < tol;
                if self.state.swipe_locked {
                    debug!("{}: swipe locked out", self.id);
                }
            }
        }

        if moved_again
            && self.registry.has(Gesture::Rollover)
            && self
                .state
                .rollover
                .try_fire(ts, self.options.roll_over_frequency)
        {
            out.emit(Gesture::Rollover);
        }

        if rollover_only {
            return;
        }

        if self.state.moved
            && moved_again
            && self.registry.has(Gesture::Drag)
            && self.state.drag.try_fire(ts, self.options.drag_frequency)
        {
            out.emit(Gesture::Drag);
        }

        if self.state.has_zoom && self.state.zoom.try_fire(ts, self.options.zoom_frequency) {
            let interest = ZoomInterest {
                zoom: self.registry.has(Gesture::Zoom),
                in_out: self.registry.has_zoom_in_out(),
            };
            let z = zoom::track(self.state, &ev.changed_touches, self.options, interest);
            if let Some(factor) = z.factor {
                out.emit_with(Gesture::Zoom, GestureParam::Factor(factor));
            }
            if let Some(step) = z.step {
                out.emit(step);
            }
        }
    }

    pub fn release(&mut self, ev: &mut PointerEvent) -> Outcome {
        if !self.state.active {
            return Outcome::default();
        }

        let ts = ev.timestamp;
        if ev.is_touch() {
            self.state.last_touch_end = Some(ts);
        }
        if ev.is_mouse() && self.echoes_touch_end(ts) {
            debug!("{}: dropping synthetic mouse release at {ts}", self.id);
            return Outcome::default();
        }

        let hold_fired = self.state.hold_fired;
        if let Some(handle) = self.state.end_press() {
            self.timers.cancel(handle);
        }

        let mut out = Outcome {
            pressed: Some(false),
            ..Default::default()
        };
        out.emit(Gesture::Release);

        if !self.state.moved {
            let held_for = ts - self.state.press_started_at;
            if self.registry.has(Gesture::LongTap) && held_for > self.options.long_tap_time_interval
            {
                ev.prevent_default();
                out.emit(Gesture::LongTap);
            } else if self.registry.has(Gesture::Hold) && hold_fired {
                // hold already reported this press
                ev.prevent_default();
            } else {
                out.emit(Gesture::Tap);
            }
        } else if self.state.has_swipe && !self.state.swipe_locked {
            let (dx, dy) = self.state.displacement();
            let tol = self.options.swipe_tolerance;
            if dx > tol || dy > tol {
                let dir = swipe_direction(self.state.start, self.state.current);
                let directed = Gesture::Swipe(Some(dir));
                let gesture = if self.registry.has(directed) {
                    directed
                } else {
                    Gesture::Swipe(None)
                };
                debug!("{}: swipe {dir}", self.id);
                out.emit_with(gesture, GestureParam::Direction(dir));
            }
        }

        out
    }

    pub fn cancel(&mut self) -> Outcome {
        let was_active = self.state.active;
        if let Some(handle) = self.state.reset() {
            self.timers.cancel(handle);
        }
        if was_active {
            debug!("{}: press cancelled", self.id);
        }
        Outcome {
            emissions: Vec::new(),
            pressed: was_active.then_some(false),
        }
    }

    fn cancel_hold(&mut self) {
        if let Some(pending) = self.state.hold.take() {
            self.timers.cancel(pending.handle);
        }
    }

    fn echoes_touch(&self, ts: f64) -> bool {
        within_window(self.state.last_touch_start, ts) || self.echoes_touch_end(ts)
    }

    fn echoes_touch_end(&self, ts: f64) -> bool {
        within_window(self.state.last_touch_end, ts)
    }
}

/// Consumes the pending hold if `handle` is still the current one and
/// returns the press event it should be reported with.
pub fn hold_elapsed(state: &mut InteractionState, handle: TimerHandle) -> Option<PointerEvent> {
    match &state.hold {
        Some(p) if p.handle == handle => {
            let pending = state.hold.take()?;
            state.hold_fired = true;
            Some(pending.event)
        }
        _ => None,
    }
}

fn within_window(last: Option<f64>, ts: f64) -> bool {
    last.is_some_and(|t| ts - t < DEDUP_WINDOW_MS)
}

/// Directional-purity gate. A zero displacement on either axis is never
/// in the cone.
pub fn in_swipe_cone(dx: f64, dy: f64, cone: f64) -> bool {
    if dx == 0.0 || dy == 0.0 {
        return false;
    }
    dx / dy > cone && dy / dx > cone
}

/// Direction of the dominant axis; ties go horizontal.
pub fn swipe_direction(start: Point, current: Point) -> Direction {
    let dx = (start.x - current.x).abs();
    let dy = (start.y - current.y).abs();
    if dx >= dy {
        if start.x > current.x {
            Direction::Left
        } else {
            Direction::Right
        }
    } else if start.y > current.y {
        Direction::Top
    } else {
        Direction::Bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Phase;

    #[test]
    fn cone_rejects_axis_aligned_zero() {
        assert!(!in_swipe_cone(0.0, 50.0, 0.75));
        assert!(!in_swipe_cone(50.0, 0.0, 0.75));
        assert!(!in_swipe_cone(0.0, 0.0, 0.75));
    }

    #[test]
    fn cone_accepts_diagonal_only() {
        assert!(in_swipe_cone(40.0, 40.0, 0.75));
        assert!(in_swipe_cone(40.0, 35.0, 0.75));
        assert!(!in_swipe_cone(150.0, 10.0, 0.75));
    }

    #[test]
    fn direction_follows_dominant_axis() {
        let o = Point::ORIGIN;
        assert_eq!(swipe_direction(o, Point::new(150.0, 10.0)), Direction::Right);
        assert_eq!(swipe_direction(o, Point::new(10.0, 150.0)), Direction::Bottom);
        assert_eq!(swipe_direction(o, Point::new(-150.0, 10.0)), Direction::Left);
        assert_eq!(swipe_direction(o, Point::new(120.0, -150.0)), Direction::Top);
    }

    #[test]
    fn stale_hold_handle_is_ignored() {
        let mut q = TimerQueue::new();
        let mut st = InteractionState::new();
        let old = q.schedule(SurfaceId::new(1), 1.0);
        let current = q.schedule(SurfaceId::new(1), 2.0);
        st.hold = Some(PendingHold {
            handle: current,
            event: PointerEvent::touch(Phase::Start, 0.0, vec![Point::ORIGIN]),
        });

        assert!(hold_elapsed(&mut st, old).is_none());
        assert!(!st.hold_fired);
        assert!(hold_elapsed(&mut st, current).is_some());
        assert!(st.hold_fired);
        assert!(hold_elapsed(&mut st, current).is_none());
    }

    #[test]
    fn dedup_window_is_exclusive() {
        assert!(within_window(Some(1000.0), 1349.0));
        assert!(!within_window(Some(1000.0), 1350.0));
        assert!(!within_window(None, 0.0));
    }
}
