//! Subscriber traits for key and pointer events.
//!
//! Each trait has one method per event kind, all defaulting to no-ops, so a
//! subscriber only overrides what it cares about. The engines call
//! [`KeyHandler::handle_event`] / [`PointerHandler::handle_event`], whose
//! default bodies route every variant to its method with an exhaustive match.
//!
//! Closures taking the event enum implement the traits directly:
//!
//! ```
//! use polled_input::{KeyEvent, KeyHandler};
//! use std::rc::Rc;
//!
//! let handler: Rc<dyn KeyHandler> = Rc::new(|event: &KeyEvent| {
//!     if let KeyEvent::KeyDown { focus: Some(key), .. } = event {
//!         println!("pressed {key:?}");
//!     }
//! });
//! # let _ = handler;
//! ```

use crate::event::{Button, KeyEvent, PointerEvent};
use crate::keycode::Key;
use crate::modifier::ModifierMask;
use crate::snapshot::PointerSnapshot;

/// Receives events from a [`KeyInput`](crate::KeyInput).
pub trait KeyHandler {
    /// A key went down. `focus` is the key this call is about, or `None`
    /// when only modifiers changed.
    fn key_down(&self, _keys: &[Key], _focus: Option<Key>, _modifiers: ModifierMask) {}

    /// Keys were released while others are still held.
    fn key_lost(&self, _keys: &[Key], _modifiers: ModifierMask) {}

    /// The focus key is repeating.
    fn key_repeat(&self, _focus: Key, _modifiers: ModifierMask) {}

    /// All keys were released.
    fn keys_released(&self) {}

    /// Route an event to the matching method.
    fn handle_event(&self, event: &KeyEvent) {
        match event {
            KeyEvent::KeyDown {
                keys,
                focus,
                modifiers,
            } => self.key_down(keys, *focus, *modifiers),
            KeyEvent::KeyLost { keys, modifiers } => self.key_lost(keys, *modifiers),
            KeyEvent::KeyRepeat { focus, modifiers } => self.key_repeat(*focus, *modifiers),
            KeyEvent::KeysReleased => self.keys_released(),
        }
    }
}

/// Implement KeyHandler for closures.
impl<F> KeyHandler for F
where
    F: Fn(&KeyEvent),
{
    fn handle_event(&self, event: &KeyEvent) {
        self(event);
    }
}

/// Receives events from a [`PointerInput`](crate::PointerInput).
///
/// Button events carry the [`Button`] they concern instead of having one
/// method per button.
pub trait PointerHandler {
    /// The wheel moved by `delta` since the previous poll.
    fn scroll_wheel_move(&self, _state: &PointerSnapshot, _delta: i32) {}

    /// The pointer moved with nothing held.
    fn moving(&self, _state: &PointerSnapshot, _previous: &PointerSnapshot) {}

    fn down(&self, _button: Button, _state: &PointerSnapshot) {}

    /// Raised before [`click`](Self::click) or [`drag_done`](Self::drag_done).
    /// Not raised for the release that ends a double click.
    fn up(&self, _button: Button, _state: &PointerSnapshot, _origin: &PointerSnapshot) {}

    fn click(&self, _button: Button, _state: &PointerSnapshot, _origin: &PointerSnapshot) {}

    fn double_click(&self, _button: Button, _state: &PointerSnapshot, _origin: &PointerSnapshot) {}

    /// Raised on every poll the pointer moves while dragging.
    fn dragging(&self, _button: Button, _state: &PointerSnapshot, _origin: &PointerSnapshot) {}

    fn drag_done(&self, _button: Button, _state: &PointerSnapshot, _origin: &PointerSnapshot) {}

    /// Route an event to the matching method.
    fn handle_event(&self, event: &PointerEvent) {
        match event {
            PointerEvent::ScrollWheelMove { state, delta } => self.scroll_wheel_move(state, *delta),
            PointerEvent::Moving { state, previous } => self.moving(state, previous),
            PointerEvent::Down { button, state } => self.down(*button, state),
            PointerEvent::Up {
                button,
                state,
                origin,
            } => self.up(*button, state, origin),
            PointerEvent::Click {
                button,
                state,
                origin,
            } => self.click(*button, state, origin),
            PointerEvent::DoubleClick {
                button,
                state,
                origin,
            } => self.double_click(*button, state, origin),
            PointerEvent::Dragging {
                button,
                state,
                origin,
            } => self.dragging(*button, state, origin),
            PointerEvent::DragDone {
                button,
                state,
                origin,
            } => self.drag_done(*button, state, origin),
        }
    }
}

/// Implement PointerHandler for closures.
impl<F> PointerHandler for F
where
    F: Fn(&PointerEvent),
{
    fn handle_event(&self, event: &PointerEvent) {
        self(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct ClickCounter {
        clicks: RefCell<Vec<Button>>,
        releases: RefCell<u32>,
    }

    impl PointerHandler for ClickCounter {
        fn click(&self, button: Button, _state: &PointerSnapshot, _origin: &PointerSnapshot) {
            self.clicks.borrow_mut().push(button);
        }
    }

    impl KeyHandler for ClickCounter {
        fn keys_released(&self) {
            *self.releases.borrow_mut() += 1;
        }
    }

    #[test]
    fn test_default_handle_event_routes_to_methods() {
        let counter = ClickCounter::default();
        let state = PointerSnapshot::at(0, 0);

        PointerHandler::handle_event(
            &counter,
            &PointerEvent::Click {
                button: Button::Right,
                state,
                origin: state,
            },
        );
        PointerHandler::handle_event(
            &counter,
            &PointerEvent::Down {
                button: Button::Left,
                state,
            },
        );
        KeyHandler::handle_event(&counter, &KeyEvent::KeysReleased);

        assert_eq!(*counter.clicks.borrow(), vec![Button::Right]);
        assert_eq!(*counter.releases.borrow(), 1);
    }

    #[test]
    fn test_closure_handler_receives_event() {
        let seen = RefCell::new(Vec::new());
        let handler = |event: &KeyEvent| seen.borrow_mut().push(event.clone());

        KeyHandler::handle_event(&handler, &KeyEvent::KeysReleased);

        assert_eq!(*seen.borrow(), vec![KeyEvent::KeysReleased]);
    }
}
