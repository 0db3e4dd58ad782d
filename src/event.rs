//! Pointer input as the engine sees it.
//!
//! A [`PointerEvent`] is a normalized mouse or touch sample. Hosts build one
//! per low-level event and hand it to the engine together with the surface
//! it was delivered to.

/// Which device family produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Move,
    End,
    Cancel,
    /// Pointer entered the surface (mouse only, drives the pressed class).
    Enter,
    /// Pointer left the surface.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    pub kind: InputKind,
    pub phase: Phase,
    /// Milliseconds in the host's event clock. Throttles and timers only
    /// ever compare against this, never against the system clock.
    pub timestamp: f64,
    /// Mouse position. Unused for touch events.
    pub position: Point,
    /// Touch points currently down.
    pub touches: Vec<Point>,
    /// Touch points that changed in this event; the zoom tracker reads these.
    pub changed_touches: Vec<Point>,
    /// The event originated on a child of the surface rather than the
    /// surface itself.
    pub from_descendant: bool,
    /// The pointer is inside the surface bounds.
    pub within_bounds: bool,
    pub cancelable: bool,
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl PointerEvent {
    fn new(kind: InputKind, phase: Phase, timestamp: f64) -> Self {
        Self {
            kind,
            phase,
            timestamp,
            position: Point::ORIGIN,
            touches: Vec::new(),
            changed_touches: Vec::new(),
            from_descendant: false,
            within_bounds: true,
            cancelable: true,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn mouse(phase: Phase, timestamp: f64, x: f64, y: f64) -> Self {
        let mut ev = Self::new(InputKind::Mouse, phase, timestamp);
        ev.position = Point::new(x, y);
        ev
    }

    /// A touch event; `touches` doubles as the changed list, which is what
    /// single-finger sources deliver.
    pub fn touch(phase: Phase, timestamp: f64, touches: Vec<Point>) -> Self {
        let mut ev = Self::new(InputKind::Touch, phase, timestamp);
        ev.changed_touches = touches.clone();
        ev.touches = touches;
        ev
    }

    pub fn with_changed_touches(mut self, changed: Vec<Point>) -> Self {
        self.changed_touches = changed;
        self
    }

    pub fn with_descendant_target(mut self) -> Self {
        self.from_descendant = true;
        self
    }

    pub fn outside_bounds(mut self) -> Self {
        self.within_bounds = false;
        self
    }

    pub fn non_cancelable(mut self) -> Self {
        self.cancelable = false;
        self
    }

    pub fn is_mouse(&self) -> bool {
        self.kind == InputKind::Mouse
    }

    pub fn is_touch(&self) -> bool {
        self.kind == InputKind::Touch
    }

    /// Sampled position: the mouse position, or the first touch point.
    /// A touch event with no points reads as the origin.
    pub fn coords(&self) -> Point {
        match self.kind {
            InputKind::Mouse => self.position,
            InputKind::Touch => self.touches.first().copied().unwrap_or_default(),
        }
    }

    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}
