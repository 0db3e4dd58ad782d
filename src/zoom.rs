//! Two-point pinch tracking.
//!
//! The baseline distance is re-established on every other qualifying
//! sample: after a comparison the tracker drops out of the zooming state,
//! so the next two-point sample becomes the new baseline. `zoom` therefore
//! reacts to the change between consecutive sample pairs, not to the
//! change since the fingers first landed.

use log::debug;

use crate::config::Options;
use crate::event::Point;
use crate::gestures::Gesture;
use crate::state::InteractionState;

/// What a zoom sample decided.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoomOutcome {
    /// `zoom` fires with this factor.
    pub factor: Option<f64>,
    /// `zoom-in` or `zoom-out` fires.
    pub step: Option<Gesture>,
}

/// Which zoom gestures have subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ZoomInterest {
    pub zoom: bool,
    pub in_out: bool,
}

pub fn track(
    state: &mut InteractionState,
    changed: &[Point],
    opts: &Options,
    interest: ZoomInterest,
) -> ZoomOutcome {
    let [a, b] = changed else {
        state.zooming = false;
        return ZoomOutcome::default();
    };
    let distance = a.distance_to(b);

    let baseline = match state.initial_pinch_distance {
        Some(d) if state.zooming => d,
        _ => {
            state.zooming = true;
            state.initial_pinch_distance = Some(distance);
            return ZoomOutcome::default();
        }
    };
    state.zooming = false;

    // zero baseline: both fingers on the same spot, nothing to compare against
    if baseline <= 0.0 {
        debug!("zoom: degenerate baseline, skipping sample");
        return ZoomOutcome::default();
    }

    let mut outcome = ZoomOutcome::default();
    let factor = distance / baseline;

    if interest.zoom && (factor - 1.0).abs() > opts.zoom_distance / baseline {
        outcome.factor = Some(factor);
    }

    if interest.in_out && (distance - baseline).abs() > opts.zoom_in_out_distance {
        outcome.step = Some(if distance > baseline {
            Gesture::ZoomIn
        } else {
            Gesture::ZoomOut
        });
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOTH: ZoomInterest = ZoomInterest {
        zoom: true,
        in_out: true,
    };

    fn pair(d: f64) -> Vec<Point> {
        vec![Point::new(0.0, 0.0), Point::new(d, 0.0)]
    }

    #[test]
    fn first_sample_sets_baseline_only() {
        let mut st = InteractionState::new();
        let out = track(&mut st, &pair(50.0), &Options::default(), BOTH);
        assert_eq!(out, ZoomOutcome::default());
        assert!(st.zooming);
        assert_eq!(st.initial_pinch_distance, Some(50.0));
    }

    #[test]
    fn factor_fires_past_zoom_distance() {
        let mut st = InteractionState::new();
        let opts = Options::default();
        track(&mut st, &pair(50.0), &opts, BOTH);
        let out = track(&mut st, &pair(65.0), &opts, BOTH);
        let factor = out.factor.expect("zoom should fire");
        assert!((factor - 1.3).abs() < 1e-9);
        assert_eq!(out.step, None);
        assert!(!st.zooming);
    }

    #[test]
    fn small_change_does_not_fire() {
        let mut st = InteractionState::new();
        let opts = Options::default();
        track(&mut st, &pair(50.0), &opts, BOTH);
        // |55/50 - 1| = 0.1, not above 10/50
        let out = track(&mut st, &pair(55.0), &opts, BOTH);
        assert_eq!(out.factor, None);
    }

    #[test]
    fn in_out_steps_need_large_change() {
        let mut st = InteractionState::new();
        let opts = Options::default();
        track(&mut st, &pair(200.0), &opts, BOTH);
        let out = track(&mut st, &pair(50.0), &opts, BOTH);
        assert_eq!(out.step, Some(Gesture::ZoomOut));

        track(&mut st, &pair(50.0), &opts, BOTH);
        let out = track(&mut st, &pair(151.0), &opts, BOTH);
        assert_eq!(out.step, Some(Gesture::ZoomIn));
    }

    #[test]
    fn rebaselines_after_each_comparison() {
        let mut st = InteractionState::new();
        let opts = Options::default();
        track(&mut st, &pair(50.0), &opts, BOTH);
        track(&mut st, &pair(65.0), &opts, BOTH);
        // third sample becomes the new baseline rather than comparing to 50
        let out = track(&mut st, &pair(90.0), &opts, BOTH);
        assert_eq!(out, ZoomOutcome::default());
        assert_eq!(st.initial_pinch_distance, Some(90.0));
    }

    #[test]
    fn wrong_point_count_aborts() {
        let mut st = InteractionState::new();
        let opts = Options::default();
        track(&mut st, &pair(50.0), &opts, BOTH);
        let three = vec![Point::ORIGIN, Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
        assert_eq!(track(&mut st, &three, &opts, BOTH), ZoomOutcome::default());
        assert!(!st.zooming);
    }

    #[test]
    fn zero_baseline_is_skipped() {
        let mut st = InteractionState::new();
        let opts = Options::default();
        track(&mut st, &pair(0.0), &opts, BOTH);
        let out = track(&mut st, &pair(80.0), &opts, BOTH);
        assert_eq!(out, ZoomOutcome::default());
    }

    #[test]
    fn uninterested_gestures_stay_quiet() {
        let mut st = InteractionState::new();
        let opts = Options::default();
        let only_steps = ZoomInterest {
            zoom: false,
            in_out: true,
        };
        track(&mut st, &pair(50.0), &opts, only_steps);
        let out = track(&mut st, &pair(65.0), &opts, only_steps);
        assert_eq!(out, ZoomOutcome::default());
    }
}
