//! Poll-to-poll diffing of the held key set.

use super::KeyConfig;
use crate::keycode::Key;
use crate::modifier::ModifierMask;
use crate::snapshot::KeySnapshot;

/// Result of comparing one poll's key set against the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyDelta {
    /// Held keys after removing unmanaged keys and, unless modifiers are
    /// treated as keys, modifier keys.
    pub filtered: Vec<Key>,
    /// Keys in `filtered` that were not held on the previous poll.
    pub newly_pressed: Vec<Key>,
    /// The filtered set is smaller than on the previous poll.
    pub lost_any: bool,
    pub modifiers: ModifierMask,
    pub last_modifiers: ModifierMask,
    /// Most recently added key, cleared when a key is released.
    pub focus: Option<Key>,
}

impl KeyDelta {
    /// The filtered set is empty. Modifiers may still be held.
    pub fn no_keys_held(&self) -> bool {
        self.filtered.is_empty()
    }

    pub fn has_added_keys(&self) -> bool {
        !self.newly_pressed.is_empty()
    }

    pub fn modifiers_changed(&self) -> bool {
        self.modifiers != self.last_modifiers
    }
}

/// Tracks the previous filtered key set between polls.
///
/// Inert until [`start`](Self::start) seeds it; [`stop`](Self::stop) makes it
/// inert again.
#[derive(Debug, Clone, Default)]
pub struct KeySetDiff {
    active: bool,
    previous: Vec<Key>,
    modifiers: ModifierMask,
    focus: Option<Key>,
}

impl KeySetDiff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the key filter to `snapshot` without touching any diff state.
    ///
    /// Returns the filtered keys in [`Key`] order and the modifier mask, which
    /// is always empty while modifiers are treated as keys.
    pub fn filter(snapshot: &KeySnapshot, config: &KeyConfig) -> (Vec<Key>, ModifierMask) {
        let mut modifiers = ModifierMask::NONE;
        let mut filtered = Vec::with_capacity(snapshot.len());

        for key in snapshot.pressed() {
            if config.is_unmanaged(key) {
                continue;
            }
            if !config.treat_modifiers_as_keys() && key.is_modifier() {
                modifiers |= key.modifier();
                continue;
            }
            filtered.push(key);
        }

        (filtered, modifiers)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Seed the previous set from `snapshot`. The seeded keys are reported by
    /// the caller, so the focus becomes the last of them.
    pub fn start(&mut self, snapshot: &KeySnapshot, config: &KeyConfig) -> KeyDelta {
        let (filtered, modifiers) = Self::filter(snapshot, config);
        self.active = true;
        self.previous = filtered.clone();
        self.modifiers = modifiers;
        self.focus = filtered.last().copied();

        KeyDelta {
            filtered,
            newly_pressed: Vec::new(),
            lost_any: false,
            modifiers,
            last_modifiers: modifiers,
            focus: self.focus,
        }
    }

    pub fn stop(&mut self) {
        self.active = false;
        self.previous.clear();
        self.modifiers = ModifierMask::NONE;
        self.focus = None;
    }

    /// Compare `snapshot` with the previous poll and advance.
    ///
    /// While inert, reports the filtered set with no changes.
    pub fn update(&mut self, snapshot: &KeySnapshot, config: &KeyConfig) -> KeyDelta {
        let (filtered, modifiers) = Self::filter(snapshot, config);

        if !self.active {
            return KeyDelta {
                filtered,
                newly_pressed: Vec::new(),
                lost_any: false,
                modifiers,
                last_modifiers: modifiers,
                focus: None,
            };
        }

        let newly_pressed: Vec<Key> = filtered
            .iter()
            .copied()
            .filter(|key| !self.previous.contains(key))
            .collect();
        let released_any = self.previous.iter().any(|key| !filtered.contains(key));
        let lost_any = filtered.len() < self.previous.len();

        if let Some(&last) = newly_pressed.last() {
            self.focus = Some(last);
        } else if released_any {
            self.focus = None;
        }

        let last_modifiers = std::mem::replace(&mut self.modifiers, modifiers);
        self.previous = filtered.clone();

        KeyDelta {
            filtered,
            newly_pressed,
            lost_any,
            modifiers,
            last_modifiers,
            focus: self.focus,
        }
    }

    pub fn focus(&self) -> Option<Key> {
        self.focus
    }

    /// Drop the focus key, e.g. after a modifier-only change.
    pub fn clear_focus(&mut self) {
        self.focus = None;
    }
}
