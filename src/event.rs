//! Semantic events raised by the engines.

use crate::keycode::Key;
use crate::modifier::ModifierMask;
use crate::snapshot::PointerSnapshot;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Button {
    Left,
    Right,
    Middle,
}

impl Button {
    /// All buttons in precedence order: when several are pressed on the same
    /// poll, the first one listed wins.
    pub const ALL: [Button; 3] = [Button::Left, Button::Right, Button::Middle];

    pub(crate) fn index(self) -> usize {
        match self {
            Button::Left => 0,
            Button::Right => 1,
            Button::Middle => 2,
        }
    }
}

/// An event raised by the key engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KeyEvent {
    /// A key went down. Raised once per newly pressed key with that key as
    /// `focus`; `keys` is the whole filtered set held at the time.
    KeyDown {
        keys: Vec<Key>,
        focus: Option<Key>,
        modifiers: ModifierMask,
    },
    /// One or more keys were released while others are still held.
    KeyLost {
        keys: Vec<Key>,
        modifiers: ModifierMask,
    },
    /// The focus key has been held past the repeat delay.
    KeyRepeat { focus: Key, modifiers: ModifierMask },
    /// Everything was released.
    KeysReleased,
}

/// An event raised by the pointer engine.
///
/// `state` is the snapshot the event refers to and `origin` the snapshot at
/// the moment the button went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PointerEvent {
    /// The wheel counter changed by `delta` since the previous poll.
    ScrollWheelMove { state: PointerSnapshot, delta: i32 },
    /// The pointer moved with no button held.
    Moving {
        state: PointerSnapshot,
        previous: PointerSnapshot,
    },
    Down {
        button: Button,
        state: PointerSnapshot,
    },
    Up {
        button: Button,
        state: PointerSnapshot,
        origin: PointerSnapshot,
    },
    Click {
        button: Button,
        state: PointerSnapshot,
        origin: PointerSnapshot,
    },
    /// Raised on the second press itself; the release that follows is silent.
    DoubleClick {
        button: Button,
        state: PointerSnapshot,
        origin: PointerSnapshot,
    },
    Dragging {
        button: Button,
        state: PointerSnapshot,
        origin: PointerSnapshot,
    },
    DragDone {
        button: Button,
        state: PointerSnapshot,
        origin: PointerSnapshot,
    },
}

impl PointerEvent {
    /// The button this event concerns, if any.
    pub fn button(&self) -> Option<Button> {
        match self {
            PointerEvent::ScrollWheelMove { .. } | PointerEvent::Moving { .. } => None,
            PointerEvent::Down { button, .. }
            | PointerEvent::Up { button, .. }
            | PointerEvent::Click { button, .. }
            | PointerEvent::DoubleClick { button, .. }
            | PointerEvent::Dragging { button, .. }
            | PointerEvent::DragDone { button, .. } => Some(*button),
        }
    }

    /// Short name of the event kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PointerEvent::ScrollWheelMove { .. } => "ScrollWheelMove",
            PointerEvent::Moving { .. } => "Moving",
            PointerEvent::Down { .. } => "Down",
            PointerEvent::Up { .. } => "Up",
            PointerEvent::Click { .. } => "Click",
            PointerEvent::DoubleClick { .. } => "DoubleClick",
            PointerEvent::Dragging { .. } => "Dragging",
            PointerEvent::DragDone { .. } => "DragDone",
        }
    }
}

impl KeyEvent {
    /// Short name of the event kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            KeyEvent::KeyDown { .. } => "KeyDown",
            KeyEvent::KeyLost { .. } => "KeyLost",
            KeyEvent::KeyRepeat { .. } => "KeyRepeat",
            KeyEvent::KeysReleased => "KeysReleased",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_event_button() {
        let state = PointerSnapshot::at(1, 2);
        let click = PointerEvent::Click {
            button: Button::Middle,
            state,
            origin: state,
        };
        assert_eq!(click.button(), Some(Button::Middle));
        assert_eq!(click.kind(), "Click");

        let scroll = PointerEvent::ScrollWheelMove { state, delta: -120 };
        assert_eq!(scroll.button(), None);
    }

    #[test]
    fn test_button_precedence_order() {
        assert_eq!(Button::ALL, [Button::Left, Button::Right, Button::Middle]);
        assert_eq!(Button::Middle.index(), 2);
    }
}
