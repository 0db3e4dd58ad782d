use log::trace;

use crate::event::PointerEvent;
use crate::gestures::{Gesture, GestureParam};
use crate::registry::Registry;

/// Runs every subscription of `gesture` in registration order and returns
/// how many callbacks were invoked.
///
/// `stop` and `prevent` act on the event even for a subscription that
/// `self` then skips.
pub fn dispatch(
    registry: &Registry,
    gesture: Gesture,
    param: &GestureParam,
    event: &mut PointerEvent,
) -> usize {
    let subs = registry.get(gesture);
    if subs.is_empty() {
        return 0;
    }

    let mut invoked = 0;
    for sub in subs {
        if sub.modifiers.stop {
            event.stop_propagation();
        }
        if sub.modifiers.prevent {
            event.prevent_default();
        }
        if sub.modifiers.self_only && event.from_descendant {
            trace!("{gesture}: skipping self-only subscriber");
            continue;
        }
        sub.invoke(param, event);
        invoked += 1;
    }
    invoked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Phase;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(
        log: &Rc<RefCell<Vec<String>>>,
        tag: &'static str,
    ) -> impl FnMut(&GestureParam, &PointerEvent) + 'static {
        let log = Rc::clone(log);
        move |param, _| log.borrow_mut().push(format!("{tag}:{param:?}"))
    }

    #[test]
    fn no_subscribers_is_a_no_op() {
        let r = Registry::new();
        let mut ev = PointerEvent::mouse(Phase::End, 0.0, 0.0, 0.0);
        assert_eq!(dispatch(&r, Gesture::Tap, &GestureParam::None, &mut ev), 0);
        assert!(!ev.default_prevented);
    }

    #[test]
    fn runs_in_registration_order_with_param() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut r = Registry::new();
        r.subscribe(&"zoom".parse().unwrap(), recorder(&log, "a"));
        r.subscribe(&"zoom".parse().unwrap(), recorder(&log, "b"));

        let mut ev = PointerEvent::touch(Phase::Move, 0.0, vec![]);
        let n = dispatch(&r, Gesture::Zoom, &GestureParam::Factor(1.5), &mut ev);
        assert_eq!(n, 2);
        assert_eq!(*log.borrow(), vec!["a:Factor(1.5)", "b:Factor(1.5)"]);
    }

    #[test]
    fn self_only_skips_descendant_events_but_still_applies_modifiers() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut r = Registry::new();
        r.subscribe(&"tap.self.prevent.stop".parse().unwrap(), recorder(&log, "self"));
        r.subscribe(&"tap".parse().unwrap(), recorder(&log, "any"));

        let mut ev = PointerEvent::mouse(Phase::End, 0.0, 0.0, 0.0).with_descendant_target();
        let n = dispatch(&r, Gesture::Tap, &GestureParam::None, &mut ev);
        assert_eq!(n, 1);
        assert_eq!(*log.borrow(), vec!["any:None"]);
        assert!(ev.default_prevented);
        assert!(ev.propagation_stopped);
    }
}
