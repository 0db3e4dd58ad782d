//! Surface arena and event routing.
//!
//! The engine owns one [`Surface`] per attached region, keyed by a
//! [`SurfaceId`] handle. Hosts attach a surface, subscribe callbacks, then
//! feed it every pointer event delivered to that surface. Hold timers run
//! on event time: they fire when [`GestureEngine::advance`] is called, or
//! implicitly before any later event is handled.

use std::collections::HashMap;
use std::fmt;

use log::{debug, info, trace};

use crate::classifier::{self, Classifier, Outcome};
use crate::config::Options;
use crate::dispatch::dispatch;
use crate::error::{Error, Result};
use crate::event::{Phase, PointerEvent};
use crate::gestures::{Binding, Gesture, GestureParam};
use crate::registry::Registry;
use crate::schedule::TimerQueue;
use crate::state::InteractionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

#[derive(Debug)]
pub struct Surface {
    pub options: Options,
    pub state: InteractionState,
    pub registry: Registry,
}

/// Called with (surface, class, add) when the pressed class should change.
pub type ClassHook = dyn FnMut(SurfaceId, &str, bool);

#[derive(Default)]
pub struct GestureEngine {
    surfaces: HashMap<SurfaceId, Surface>,
    timers: TimerQueue,
    next_id: u64,
    class_hook: Option<Box<ClassHook>>,
}

impl GestureEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, options: Options) -> Result<SurfaceId> {
        options.validate()?;
        self.next_id += 1;
        let id = SurfaceId(self.next_id);
        self.surfaces.insert(
            id,
            Surface {
                options,
                state: InteractionState::new(),
                registry: Registry::new(),
            },
        );
        info!("attached {id}");
        Ok(id)
    }

    /// Drops the surface with its subscriptions and any pending hold timer.
    /// Returns false when the surface was not attached.
    pub fn detach(&mut self, id: SurfaceId) -> bool {
        self.timers.cancel_surface(id);
        let existed = self.surfaces.remove(&id).is_some();
        if existed {
            info!("detached {id}");
        }
        existed
    }

    pub fn options(&self, id: SurfaceId) -> Result<&Options> {
        Ok(&self.surface(id)?.options)
    }

    /// Replaces the surface options. Takes effect from the next event;
    /// an in-flight hold timer keeps its deadline.
    pub fn set_options(&mut self, id: SurfaceId, options: Options) -> Result<()> {
        options.validate()?;
        self.surface_mut(id)?.options = options;
        Ok(())
    }

    pub fn state(&self, id: SurfaceId) -> Option<&InteractionState> {
        self.surfaces.get(&id).map(|s| &s.state)
    }

    pub fn is_pressed(&self, id: SurfaceId) -> bool {
        self.state(id).is_some_and(|s| s.active)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Earliest pending hold deadline across all surfaces.
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.next_deadline()
    }

    pub fn set_class_hook<F>(&mut self, hook: F)
    where
        F: FnMut(SurfaceId, &str, bool) + 'static,
    {
        self.class_hook = Some(Box::new(hook));
    }

    pub fn subscribe<F>(&mut self, id: SurfaceId, binding: &Binding, callback: F) -> Result<()>
    where
        F: FnMut(&GestureParam, &PointerEvent) + 'static,
    {
        let surface = self.surface_mut(id)?;
        surface.registry.subscribe(binding, callback);
        debug!(
            "{id}: subscribed {:?} ({} total)",
            binding.targets,
            surface.registry.len()
        );
        Ok(())
    }

    /// Subscribes with a directive-style declaration such as `swipe.left.stop`.
    pub fn subscribe_str<F>(&mut self, id: SurfaceId, binding: &str, callback: F) -> Result<()>
    where
        F: FnMut(&GestureParam, &PointerEvent) + 'static,
    {
        let binding: Binding = binding.parse()?;
        self.subscribe(id, &binding, callback)
    }

    /// Classifies one event delivered to `id` and dispatches what it
    /// produced. Hold timers due at the event's timestamp fire first.
    pub fn handle(&mut self, id: SurfaceId, event: &mut PointerEvent) -> Result<()> {
        if !self.surfaces.contains_key(&id) {
            return Err(Error::UnknownSurface(id));
        }
        self.advance(event.timestamp);

        let Self {
            surfaces,
            timers,
            class_hook,
            ..
        } = self;
        let surface = surfaces.get_mut(&id).ok_or(Error::UnknownSurface(id))?;

        if event.is_mouse() && surface.options.disable_click {
            trace!("{id}: mouse input disabled");
            return Ok(());
        }
        if !event.within_bounds && !accepts_outside(event.phase, &surface.options) {
            trace!("{id}: {:?} outside bounds ignored", event.phase);
            return Ok(());
        }

        let mut classifier = Classifier {
            id,
            state: &mut surface.state,
            registry: &surface.registry,
            options: &surface.options,
            timers,
        };

        let outcome = match event.phase {
            Phase::Start => classifier.press(event),
            Phase::Move => classifier.moved(event),
            Phase::End => classifier.release(event),
            Phase::Cancel => classifier.cancel(),
            Phase::Enter => Outcome {
                pressed: Some(true),
                ..Default::default()
            },
            Phase::Leave => Outcome {
                pressed: Some(false),
                ..Default::default()
            },
        };

        if let Some(add) = outcome.pressed {
            toggle_class(class_hook, id, &surface.options.touch_class, add);
        }
        for emission in &outcome.emissions {
            debug!("{id}: {} at {}", emission.gesture, event.timestamp);
            dispatch(&surface.registry, emission.gesture, &emission.param, event);
        }
        Ok(())
    }

    /// Fires every hold timer due at `now`. Returns how many fired.
    pub fn advance(&mut self, now: f64) -> usize {
        if self.timers.is_empty() {
            return 0;
        }
        let mut fired = 0;
        for (id, handle) in self.timers.take_due(now) {
            let Some(surface) = self.surfaces.get_mut(&id) else {
                continue;
            };
            let Some(mut event) = classifier::hold_elapsed(&mut surface.state, handle) else {
                continue;
            };
            debug!("{id}: {} at {now}", Gesture::Hold);
            dispatch(
                &surface.registry,
                Gesture::Hold,
                &GestureParam::None,
                &mut event,
            );
            fired += 1;
        }
        if fired > 0 {
            trace!("{fired} hold timer(s) fired, {} pending", self.timers.len());
        }
        fired
    }

    fn surface(&self, id: SurfaceId) -> Result<&Surface> {
        self.surfaces.get(&id).ok_or(Error::UnknownSurface(id))
    }

    fn surface_mut(&mut self, id: SurfaceId) -> Result<&mut Surface> {
        self.surfaces.get_mut(&id).ok_or(Error::UnknownSurface(id))
    }
}

impl fmt::Debug for GestureEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureEngine")
            .field("surfaces", &self.surfaces)
            .field("timers", &self.timers)
            .field("class_hook", &self.class_hook.is_some())
            .finish()
    }
}

/// Without `drag_outside` the surface only hears about moves and releases
/// inside its own bounds. Presses and enters always have to land inside.
/// A cancel or leave is delivered wherever the pointer is.
fn accepts_outside(phase: Phase, options: &Options) -> bool {
    match phase {
        Phase::Move | Phase::End => options.drag_outside,
        Phase::Cancel | Phase::Leave => true,
        Phase::Start | Phase::Enter => false,
    }
}

fn toggle_class(hook: &mut Option<Box<ClassHook>>, id: SurfaceId, class: &str, add: bool) {
    if class.is_empty() {
        return;
    }
    if let Some(hook) = hook.as_mut() {
        hook(id, class, add);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Point;

    #[test]
    fn unknown_surface_is_an_error() {
        let mut engine = GestureEngine::new();
        let mut ev = PointerEvent::mouse(Phase::Start, 0.0, 0.0, 0.0);
        assert!(matches!(
            engine.handle(SurfaceId::new(42), &mut ev),
            Err(Error::UnknownSurface(_))
        ));
        assert!(!engine.detach(SurfaceId::new(42)));
    }

    #[test]
    fn attach_rejects_invalid_options() {
        let mut engine = GestureEngine::new();
        let opts = Options {
            tap_tolerance: f64::NAN,
            ..Options::default()
        };
        assert!(matches!(
            engine.attach(opts),
            Err(Error::InvalidOption {
                name: "tap_tolerance",
                ..
            })
        ));
    }

    #[test]
    fn detach_cancels_pending_hold() {
        let mut engine = GestureEngine::new();
        let id = engine.attach(Options::default()).unwrap();
        engine.subscribe_str(id, "hold", |_, _| {}).unwrap();
        let mut ev = PointerEvent::touch(Phase::Start, 0.0, vec![Point::new(1.0, 1.0)]);
        engine.handle(id, &mut ev).unwrap();
        assert_eq!(engine.next_deadline(), Some(400.0));

        assert!(engine.detach(id));
        assert_eq!(engine.next_deadline(), None);
        assert_eq!(engine.surface_count(), 0);
    }

    #[test]
    fn surfaces_are_independent() {
        let mut engine = GestureEngine::new();
        let a = engine.attach(Options::default()).unwrap();
        let b = engine.attach(Options::default()).unwrap();
        assert_ne!(a, b);

        let mut ev = PointerEvent::mouse(Phase::Start, 0.0, 5.0, 5.0);
        engine.handle(a, &mut ev).unwrap();
        assert!(engine.is_pressed(a));
        assert!(!engine.is_pressed(b));
    }
}
