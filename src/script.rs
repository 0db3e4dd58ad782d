//! Recorded pointer sessions.
//!
//! A script is JSON lines, one pointer event per line:
//!
//! ```text
//! # finger down, drag right, lift
//! {"t": 0,   "kind": "touch", "phase": "start", "touches": [[10, 10]]}
//! {"t": 40,  "kind": "touch", "phase": "move",  "touches": [[90, 12]]}
//! {"t": 80,  "kind": "touch", "phase": "move",  "touches": [[160, 14]]}
//! {"t": 90,  "kind": "touch", "phase": "end"}
//! {"t": 900, "advance": true}
//! ```
//!
//! Mouse lines carry `x`/`y`. Touch lines carry `touches` and optionally
//! `changed` (defaults to `touches`). `outside`, `child` and
//! `cancelable` map onto the matching [`PointerEvent`] flags. An
//! `advance` line only moves the clock so pending hold timers can fire.
//! Blank lines and lines starting with `#` are skipped.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use crate::event::{Phase, Point, PointerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KindRecord {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PhaseRecord {
    Start,
    Move,
    End,
    Cancel,
    Enter,
    Leave,
}

#[derive(Debug, Deserialize)]
struct LineRecord {
    t: f64,
    #[serde(default)]
    advance: bool,
    kind: Option<KindRecord>,
    phase: Option<PhaseRecord>,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(default)]
    touches: Vec<(f64, f64)>,
    changed: Option<Vec<(f64, f64)>>,
    #[serde(default)]
    outside: bool,
    #[serde(default)]
    child: bool,
    cancelable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Event(PointerEvent),
    Advance(f64),
}

impl LineRecord {
    fn into_step(self) -> Result<Step> {
        if self.advance {
            return Ok(Step::Advance(self.t));
        }
        let kind = self.kind.ok_or_else(|| anyhow!("missing \"kind\""))?;
        let phase = match self.phase.ok_or_else(|| anyhow!("missing \"phase\""))? {
            PhaseRecord::Start => Phase::Start,
            PhaseRecord::Move => Phase::Move,
            PhaseRecord::End => Phase::End,
            PhaseRecord::Cancel => Phase::Cancel,
            PhaseRecord::Enter => Phase::Enter,
            PhaseRecord::Leave => Phase::Leave,
        };

        let mut ev = match kind {
            KindRecord::Mouse => PointerEvent::mouse(phase, self.t, self.x, self.y),
            KindRecord::Touch => {
                let touches: Vec<Point> = self.touches.into_iter().map(Point::from).collect();
                let mut ev = PointerEvent::touch(phase, self.t, touches);
                if let Some(changed) = self.changed {
                    ev = ev.with_changed_touches(changed.into_iter().map(Point::from).collect());
                }
                ev
            }
        };
        ev.within_bounds = !self.outside;
        ev.from_descendant = self.child;
        if let Some(c) = self.cancelable {
            ev.cancelable = c;
        }
        Ok(Step::Event(ev))
    }
}

pub fn parse_line(line: &str) -> Result<Option<Step>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let rec: LineRecord = serde_json::from_str(line)?;
    rec.into_step().map(Some)
}

pub fn parse_script(text: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(step) = parse_line(line).with_context(|| format!("line {}", i + 1))? {
            steps.push(step);
        }
    }
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_mixed_script() {
        let steps = parse_script(
            r#"
            # comment
            {"t": 0, "kind": "mouse", "phase": "start", "x": 3, "y": 4}
            {"t": 5, "kind": "touch", "phase": "move", "touches": [[1, 2], [3, 4]], "changed": [[3, 4]], "child": true}

            {"t": 900, "advance": true}
            "#,
        )
        .unwrap();
        assert_eq!(steps.len(), 3);

        let Step::Event(mouse) = &steps[0] else {
            panic!("expected event");
        };
        assert_eq!(mouse.coords(), Point::new(3.0, 4.0));
        assert_eq!(mouse.phase, Phase::Start);

        let Step::Event(touch) = &steps[1] else {
            panic!("expected event");
        };
        assert_eq!(touch.touches.len(), 2);
        assert_eq!(touch.changed_touches, vec![Point::new(3.0, 4.0)]);
        assert!(touch.from_descendant);

        assert_eq!(steps[2], Step::Advance(900.0));
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse_script("\n{\"t\": 1, \"phase\": \"start\"}\n").unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("line 2"), "{msg}");
        assert!(msg.contains("kind"), "{msg}");
    }

    #[test]
    fn outside_and_cancelable_flags() {
        let step = parse_line(
            r#"{"t": 1, "kind": "mouse", "phase": "end", "outside": true, "cancelable": false}"#,
        )
        .unwrap()
        .unwrap();
        let Step::Event(ev) = step else {
            panic!("expected event");
        };
        assert!(!ev.within_bounds);
        assert!(!ev.cancelable);
    }
}
