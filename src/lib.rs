//! # polled-input
//!
//! Turns per-tick keyboard and pointer readings into semantic input events.
//!
//! ## Features
//!
//! - Click, double click, drag and drag-done detection with a configurable
//!   drag variance and double-click window
//! - Key down / key lost / keys released tracking over whole key sets, with
//!   modifier folding and key repeat
//! - Subscribers may subscribe or unsubscribe anyone from inside a callback
//! - Optional "wait for neutral state" mode that defers subscription changes
//!   until nothing is held
//! - Time comes from an injectable clock, so every timing rule is testable
//!
//! ## Quick Start
//!
//! ```
//! use polled_input::{Key, KeyEvent, KeyInput, KeySnapshot};
//! use std::rc::Rc;
//!
//! let mut keys = KeyInput::new();
//! let handler = Rc::new(|event: &KeyEvent| {
//!     if let KeyEvent::KeyDown { focus: Some(key), modifiers, .. } = event {
//!         println!("{key:?} down with {modifiers:?}");
//!     }
//! });
//! keys.subscribe(&handler);
//!
//! // Once per frame, with whatever the device reports as held:
//! keys.poll(&KeySnapshot::from([Key::ShiftLeft, Key::A])).unwrap();
//! keys.poll(&KeySnapshot::empty()).unwrap();
//! ```
//!
//! ## Architecture
//!
//! Each engine ([`KeyInput`], [`PointerInput`]) owns a small state machine
//! (see [`fsm`]) and a [`SubscriberRegistry`]. A poll stores the new snapshot,
//! runs the current state once, collects the events it raises and then
//! delivers them synchronously, in subscription order. The registry holds
//! subscribers weakly; dropping the last `Rc` to a handler unsubscribes it.
//! Engines are single-threaded and share nothing with each other.

pub mod channel;
pub mod clock;
pub mod error;
pub mod event;
pub mod fsm;
pub mod handler;
pub mod keyboard;
pub mod keycode;
pub mod modifier;
pub mod pointer;
pub mod snapshot;
pub mod subscription;

// Re-exports
pub use clock::{ElapsedTime, ManualClock, Stopwatch};
pub use error::{Error, Result};
pub use event::{Button, KeyEvent, PointerEvent};
pub use handler::{KeyHandler, PointerHandler};
pub use keyboard::{KeyConfig, KeyDelta, KeyInput, KeySetDiff, KeyState};
pub use keycode::Key;
pub use modifier::{ModifierChange, ModifierMask};
pub use pointer::{PointerConfig, PointerInput, PointerState};
pub use snapshot::{ButtonState, KeySnapshot, PointerSnapshot};
pub use subscription::{PendingSubscription, SubscriberRegistry, SubscriptionKind};
