//! Per-surface callback registry.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::event::PointerEvent;
use crate::gestures::{Binding, Direction, Gesture, GestureParam, Modifiers};

pub type Callback = dyn FnMut(&GestureParam, &PointerEvent);

/// One registered callback. A binding that expands into several targets
/// (`swipe.left.right`) shares the same callback across all of them.
pub struct Subscription {
    pub modifiers: Modifiers,
    callback: Rc<RefCell<Callback>>,
}

impl Subscription {
    pub(crate) fn invoke(&self, param: &GestureParam, event: &PointerEvent) {
        (&mut *self.callback.borrow_mut())(param, event);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("modifiers", &self.modifiers)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    subs: HashMap<Gesture, Vec<Subscription>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, binding: &Binding, callback: F)
    where
        F: FnMut(&GestureParam, &PointerEvent) + 'static,
    {
        let callback: Rc<RefCell<Callback>> = Rc::new(RefCell::new(callback));
        for target in &binding.targets {
            self.subs.entry(*target).or_default().push(Subscription {
                modifiers: binding.modifiers,
                callback: Rc::clone(&callback),
            });
        }
    }

    /// Subscriptions for `gesture` in registration order.
    pub fn get(&self, gesture: Gesture) -> &[Subscription] {
        self.subs.get(&gesture).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, gesture: Gesture) -> bool {
        !self.get(gesture).is_empty()
    }

    pub fn has_swipe(&self) -> bool {
        self.has(Gesture::Swipe(None))
            || Direction::ALL
                .iter()
                .any(|d| self.has(Gesture::Swipe(Some(*d))))
    }

    pub fn has_zoom(&self) -> bool {
        self.has(Gesture::Zoom) || self.has_zoom_in_out()
    }

    pub fn has_zoom_in_out(&self) -> bool {
        self.has(Gesture::ZoomIn) || self.has(Gesture::ZoomOut)
    }

    /// Total subscriptions across all gestures.
    pub(crate) fn len(&self) -> usize {
        self.subs.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &GestureParam, _: &PointerEvent) {}

    #[test]
    fn empty_registry_has_nothing() {
        let r = Registry::new();
        assert!(!r.has(Gesture::Tap));
        assert!(!r.has_swipe());
        assert!(!r.has_zoom());
        assert!(r.get(Gesture::Tap).is_empty());
    }

    #[test]
    fn directional_swipe_counts_as_swipe_subscriber() {
        let mut r = Registry::new();
        r.subscribe(&"swipe.top".parse().unwrap(), noop);
        assert!(r.has_swipe());
        assert!(!r.has(Gesture::Swipe(None)));
        assert!(r.has(Gesture::Swipe(Some(Direction::Top))));
    }

    #[test]
    fn zoom_in_out_counts_as_zoom_subscriber() {
        let mut r = Registry::new();
        r.subscribe(&"zoom-out".parse().unwrap(), noop);
        assert!(r.has_zoom());
        assert!(r.has_zoom_in_out());
        assert!(!r.has(Gesture::Zoom));
    }

    #[test]
    fn expanded_binding_registers_each_target() {
        let mut r = Registry::new();
        assert_eq!(r.len(), 0);
        r.subscribe(&"swipe.left.right".parse().unwrap(), noop);
        r.subscribe(&"tap".parse().unwrap(), noop);
        assert_eq!(r.len(), 3);
        assert_eq!(r.get(Gesture::Swipe(Some(Direction::Right))).len(), 1);
    }
}
