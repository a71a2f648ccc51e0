//! Modifier bitmask and modifier-transition classification.

use crate::error::{Error, Result};

bitflags::bitflags! {
    /// Shift / Ctrl / Alt state derived from a key snapshot.
    ///
    /// Only populated while modifiers are not being treated as ordinary keys.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ModifierMask: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
    }
}

impl ModifierMask {
    /// No modifier held.
    pub const NONE: Self = Self::empty();
}

/// How a change in held modifiers should be treated by the key machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierChange {
    /// Treated like a key press: raise a key-down style event.
    Added,
    /// Treated like a key release: raise a key-lost style event.
    Lost,
}

/// Classify a transition from `last` to `new` held modifiers.
///
/// The comparison works on the bits common to both masks. Combinations that
/// match no branch are reported as [`Error::InvalidModifierState`] instead of
/// being guessed at.
pub fn classify_modifier_change(new: ModifierMask, last: ModifierMask) -> Result<ModifierChange> {
    let diff = new & last;

    if diff.is_empty() || (diff & new) == (diff & last) {
        Ok(ModifierChange::Added)
    } else if (diff & new) == diff {
        Ok(ModifierChange::Lost)
    } else if (diff & last) == diff {
        Ok(ModifierChange::Added)
    } else {
        Err(Error::InvalidModifierState { new, last })
    }
}
