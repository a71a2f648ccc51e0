//! Key codes reported in a key-matrix snapshot.

use crate::modifier::ModifierMask;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A physical key.
///
/// Keys are ordered by declaration, which is the order they are enumerated
/// in events regardless of how the device reported them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Key {
    // Editing
    Backspace,
    Tab,
    Enter,
    Pause,
    CapsLock,
    Escape,
    Space,
    PageUp,
    PageDown,
    End,
    Home,
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    PrintScreen,
    Insert,
    Delete,

    // Digits (top row)
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    MetaLeft,
    MetaRight,
    ContextMenu,

    // Numpad
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadMultiply,
    NumpadAdd,
    NumpadSubtract,
    NumpadDecimal,
    NumpadDivide,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    NumLock,
    ScrollLock,

    // Modifiers
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    AltLeft,
    AltRight,

    // Punctuation
    Semicolon,
    Equal,
    Comma,
    Minus,
    Period,
    Slash,
    Grave,
    BracketLeft,
    Backslash,
    BracketRight,
    Quote,

    /// A key without a named variant, identified by its raw device code.
    Other(u16),
}

impl Key {
    /// The modifier bit this key contributes, or an empty mask for ordinary keys.
    ///
    /// Meta keys are not modifiers here; they are tracked like any other key.
    pub fn modifier(&self) -> ModifierMask {
        match self {
            Key::ShiftLeft | Key::ShiftRight => ModifierMask::SHIFT,
            Key::ControlLeft | Key::ControlRight => ModifierMask::CTRL,
            Key::AltLeft | Key::AltRight => ModifierMask::ALT,
            _ => ModifierMask::empty(),
        }
    }

    /// Check if this is a Shift, Control or Alt key.
    pub fn is_modifier(&self) -> bool {
        !self.modifier().is_empty()
    }
}
