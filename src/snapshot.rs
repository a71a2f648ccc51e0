//! Immutable per-tick device readings.
//!
//! The host polls its device once per tick and hands the reading to an engine.
//! Two consecutive snapshots are compared field by field.

use crate::event::Button;
use crate::keycode::Key;
use crate::modifier::ModifierMask;
use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whether a pointer button is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ButtonState {
    #[default]
    Released,
    Pressed,
}

impl ButtonState {
    pub fn is_pressed(self) -> bool {
        self == ButtonState::Pressed
    }
}

impl From<bool> for ButtonState {
    fn from(pressed: bool) -> Self {
        if pressed {
            ButtonState::Pressed
        } else {
            ButtonState::Released
        }
    }
}

/// Pointer position, absolute wheel counter and button states at one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointerSnapshot {
    /// X coordinate in pixels.
    pub x: i32,
    /// Y coordinate in pixels.
    pub y: i32,
    /// Absolute scroll-wheel counter; only differences between polls matter.
    pub wheel: i32,
    pub left: ButtonState,
    pub right: ButtonState,
    pub middle: ButtonState,
}

impl PointerSnapshot {
    /// A snapshot at `(x, y)` with no buttons held and the wheel at zero.
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    /// Copy of this snapshot with `button` held.
    pub fn pressed(mut self, button: Button) -> Self {
        *self.button_mut(button) = ButtonState::Pressed;
        self
    }

    /// Copy of this snapshot with `button` released.
    pub fn released(mut self, button: Button) -> Self {
        *self.button_mut(button) = ButtonState::Released;
        self
    }

    /// Copy of this snapshot with the wheel counter set to `wheel`.
    pub fn with_wheel(mut self, wheel: i32) -> Self {
        self.wheel = wheel;
        self
    }

    /// Copy of this snapshot moved to `(x, y)`, buttons and wheel unchanged.
    pub fn moved_to(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn button(&self, button: Button) -> ButtonState {
        match button {
            Button::Left => self.left,
            Button::Right => self.right,
            Button::Middle => self.middle,
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.button(button).is_pressed()
    }

    /// Check whether two snapshots share the same position.
    pub fn same_position(&self, other: &PointerSnapshot) -> bool {
        self.x == other.x && self.y == other.y
    }

    fn button_mut(&mut self, button: Button) -> &mut ButtonState {
        match button {
            Button::Left => &mut self.left,
            Button::Right => &mut self.right,
            Button::Middle => &mut self.middle,
        }
    }
}

/// The set of keys held at one poll.
///
/// Duplicates reported by the device collapse, and iteration always follows
/// [`Key`] order so events are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeySnapshot {
    pressed: BTreeSet<Key>,
}

impl KeySnapshot {
    /// A snapshot with nothing held.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(pressed: impl IntoIterator<Item = Key>) -> Self {
        Self {
            pressed: pressed.into_iter().collect(),
        }
    }

    /// Held keys in [`Key`] order.
    pub fn pressed(&self) -> impl Iterator<Item = Key> + '_ {
        self.pressed.iter().copied()
    }

    pub fn contains(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    /// Shift / Ctrl / Alt bits present among the held keys.
    pub fn modifiers(&self) -> ModifierMask {
        self.pressed
            .iter()
            .fold(ModifierMask::NONE, |mask, key| mask | key.modifier())
    }
}

impl FromIterator<Key> for KeySnapshot {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<const N: usize> From<[Key; N]> for KeySnapshot {
    fn from(keys: [Key; N]) -> Self {
        Self::new(keys)
    }
}
