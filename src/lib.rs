//! Pointer gesture classification.
//!
//! Feed raw mouse or touch samples for a surface into a [`GestureEngine`]
//! and it reports press, release, tap, longtap, hold, drag, swipe,
//! rollover and two-finger zoom gestures to the callbacks subscribed on
//! that surface.
//!
//! ```
//! use gesturectl::{GestureEngine, Options, Phase, PointerEvent};
//!
//! let mut engine = GestureEngine::new();
//! let surface = engine.attach(Options::default()).unwrap();
//! engine
//!     .subscribe_str(surface, "tap", |_, ev| println!("tap at {:?}", ev.coords()))
//!     .unwrap();
//!
//! let mut down = PointerEvent::mouse(Phase::Start, 0.0, 10.0, 10.0);
//! let mut up = PointerEvent::mouse(Phase::End, 80.0, 10.0, 10.0);
//! engine.handle(surface, &mut down).unwrap();
//! engine.handle(surface, &mut up).unwrap();
//! ```

pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod event;
pub mod gestures;
pub mod input;
pub mod registry;
pub mod schedule;
pub mod script;
pub mod state;
pub mod tracker;
pub mod zoom;

pub use config::{Options, Profile};
pub use engine::{GestureEngine, SurfaceId};
pub use error::{Error, Result};
pub use event::{InputKind, Phase, Point, PointerEvent};
pub use gestures::{Binding, Direction, Gesture, GestureParam, Modifiers};
