//! Turns low-level device frames into [`PointerEvent`]s.
//!
//! [`TouchTracker`] follows multitouch slots and reports one touch event per
//! `SYN_REPORT` frame; [`MouseTracker`] integrates relative motion and the
//! left button. The caller supplies the frame timestamp.

use crate::event::{Phase, Point, PointerEvent};

#[derive(Debug, Clone, Default)]
struct SlotState {
    tracking_id: i32, // -1 = inactive
    x: f64,
    y: f64,
    active: bool,
    // position changed since last frame
    dirty: bool,
}

#[derive(Debug)]
pub struct TouchTracker {
    slots: Vec<SlotState>,
    cur_slot: usize,
    prev_active: usize,
    last_points: Vec<Point>,
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TouchTracker {
    pub fn new() -> Self {
        Self {
            slots: vec![SlotState::default(); 10],
            cur_slot: 0,
            prev_active: 0,
            last_points: Vec::new(),
        }
    }

    pub fn on_slot(&mut self, slot: i32) {
        self.cur_slot = slot.clamp(0, self.slots.len() as i32 - 1) as usize;
    }

    pub fn on_tracking_id(&mut self, tracking_id: i32) {
        let s = &mut self.slots[self.cur_slot];
        if tracking_id < 0 {
            s.tracking_id = -1;
            s.active = false;
        } else {
            // new contact keeps the last known position until the device reports one
            *s = SlotState {
                tracking_id,
                x: s.x,
                y: s.y,
                active: true,
                dirty: true,
            };
        }
    }

    pub fn on_pos_x(&mut self, raw: i32) {
        let s = &mut self.slots[self.cur_slot];
        s.x = raw as f64;
        s.dirty = true;
    }

    pub fn on_pos_y(&mut self, raw: i32) {
        let s = &mut self.slots[self.cur_slot];
        s.y = raw as f64;
        s.dirty = true;
    }

    /// Closes the current frame at `timestamp`.
    pub fn frame(&mut self, timestamp: f64) -> Option<PointerEvent> {
        let points: Vec<Point> = self
            .slots
            .iter()
            .filter(|s| s.active && s.tracking_id >= 0)
            .map(|s| Point::new(s.x, s.y))
            .collect();
        let any_dirty = self.slots.iter().any(|s| s.active && s.dirty);
        for s in &mut self.slots {
            s.dirty = false;
        }

        let prev = self.prev_active;
        self.prev_active = points.len();

        let event = match (prev, points.len()) {
            (0, 0) => None,
            (0, _) => Some(PointerEvent::touch(Phase::Start, timestamp, points.clone())),
            // touchend carries no current touches, only the ones lifted
            (_, 0) => Some(
                PointerEvent::touch(Phase::End, timestamp, Vec::new())
                    .with_changed_touches(self.last_points.clone()),
            ),
            _ if any_dirty || prev != points.len() => {
                Some(PointerEvent::touch(Phase::Move, timestamp, points.clone()))
            }
            _ => None,
        };
        self.last_points = points;
        event
    }
}

#[derive(Debug)]
pub struct MouseTracker {
    pos: Point,
    pressed: bool,
    pending_button: Option<bool>,
    moved: bool,
}

impl Default for MouseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseTracker {
    pub fn new() -> Self {
        Self {
            pos: Point::ORIGIN,
            pressed: false,
            pending_button: None,
            moved: false,
        }
    }

    pub fn on_rel_x(&mut self, delta: i32) {
        self.pos.x += delta as f64;
        self.moved = true;
    }

    pub fn on_rel_y(&mut self, delta: i32) {
        self.pos.y += delta as f64;
        self.moved = true;
    }

    pub fn on_left_button(&mut self, down: bool) {
        self.pending_button = Some(down);
    }

    /// Motion is reported before a button change in the same frame.
    pub fn frame(&mut self, timestamp: f64) -> Vec<PointerEvent> {
        let mut out = Vec::new();
        if std::mem::take(&mut self.moved) {
            out.push(PointerEvent::mouse(
                Phase::Move,
                timestamp,
                self.pos.x,
                self.pos.y,
            ));
        }
        if let Some(down) = self.pending_button.take() {
            if down != self.pressed {
                self.pressed = down;
                let phase = if down { Phase::Start } else { Phase::End };
                out.push(PointerEvent::mouse(phase, timestamp, self.pos.x, self.pos.y));
            }
        }
        out
    }
}
