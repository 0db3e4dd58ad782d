//! Gesture vocabulary and subscription bindings.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Top,
    Bottom,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Top,
        Direction::Bottom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Top => "top",
            Direction::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "top" => Ok(Direction::Top),
            "bottom" => Ok(Direction::Bottom),
            other => Err(Error::UnknownGesture(format!("swipe.{other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Press,
    Release,
    Tap,
    LongTap,
    Hold,
    DragOnce,
    Drag,
    /// `None` is the undirected `swipe`; `Some` is `swipe.<direction>`.
    Swipe(Option<Direction>),
    Rollover,
    Zoom,
    ZoomIn,
    ZoomOut,
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Press => "press",
            Gesture::Release => "release",
            Gesture::Tap => "tap",
            Gesture::LongTap => "longtap",
            Gesture::Hold => "hold",
            Gesture::DragOnce => "drag.once",
            Gesture::Drag => "drag",
            Gesture::Swipe(None) => "swipe",
            Gesture::Swipe(Some(Direction::Left)) => "swipe.left",
            Gesture::Swipe(Some(Direction::Right)) => "swipe.right",
            Gesture::Swipe(Some(Direction::Top)) => "swipe.top",
            Gesture::Swipe(Some(Direction::Bottom)) => "swipe.bottom",
            Gesture::Rollover => "rollover",
            Gesture::Zoom => "zoom",
            Gesture::ZoomIn => "zoom-in",
            Gesture::ZoomOut => "zoom-out",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Gesture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let g = match s {
            "press" => Gesture::Press,
            "release" => Gesture::Release,
            "tap" => Gesture::Tap,
            "longtap" => Gesture::LongTap,
            "hold" => Gesture::Hold,
            "drag.once" => Gesture::DragOnce,
            "drag" => Gesture::Drag,
            "swipe" => Gesture::Swipe(None),
            "rollover" => Gesture::Rollover,
            "zoom" => Gesture::Zoom,
            "zoom-in" | "zoom.in" => Gesture::ZoomIn,
            "zoom-out" | "zoom.out" => Gesture::ZoomOut,
            other => match other.strip_prefix("swipe.") {
                Some(dir) => Gesture::Swipe(Some(dir.parse()?)),
                None => return Err(Error::UnknownGesture(other.to_string())),
            },
        };
        Ok(g)
    }
}

/// Parameter handed to a callback alongside the triggering event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureParam {
    None,
    Direction(Direction),
    Factor(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub stop: bool,
    pub prevent: bool,
    pub self_only: bool,
}

/// A parsed subscription declaration such as `swipe.left.right.stop` or
/// `tap.prevent.self`.
///
/// The first segment names the gesture (`drag.once`, `zoom.in` and
/// `zoom.out` take two). Remaining segments are modifiers or, for swipe,
/// direction qualifiers. An empty declaration means `tap`.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub targets: Vec<Gesture>,
    pub modifiers: Modifiers,
}

impl Binding {
    pub fn new(gesture: Gesture) -> Self {
        Self {
            targets: vec![gesture],
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl FromStr for Binding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.split('.').peekable();
        let head = parts.next().unwrap_or("");

        let gesture = match (head, parts.peek().copied()) {
            ("", _) => Gesture::Tap,
            ("drag", Some("once")) => {
                parts.next();
                Gesture::DragOnce
            }
            ("zoom", Some("in")) => {
                parts.next();
                Gesture::ZoomIn
            }
            ("zoom", Some("out")) => {
                parts.next();
                Gesture::ZoomOut
            }
            (name, _) => name.parse()?,
        };

        let mut modifiers = Modifiers::default();
        let mut directions = Vec::new();
        for part in parts {
            match part {
                "stop" => modifiers.stop = true,
                "prevent" => modifiers.prevent = true,
                "self" => modifiers.self_only = true,
                "left" | "right" | "top" | "bottom" => {
                    if gesture != Gesture::Swipe(None) {
                        return Err(Error::MisplacedDirection {
                            binding: s.to_string(),
                            qualifier: part.to_string(),
                        });
                    }
                    let dir: Direction = part.parse()?;
                    if !directions.contains(&dir) {
                        directions.push(dir);
                    }
                }
                other => {
                    return Err(Error::UnknownModifier {
                        binding: s.to_string(),
                        modifier: other.to_string(),
                    });
                }
            }
        }

        let targets = if directions.is_empty() {
            vec![gesture]
        } else {
            directions.into_iter().map(|d| Gesture::Swipe(Some(d))).collect()
        };

        Ok(Self { targets, modifiers })
    }
}
