//! Key state machine: Unpressed, KeyDown, KeyLost, KeyRepeat.

use super::KeyConfig;
use super::diff::{KeyDelta, KeySetDiff};
use crate::error::Result;
use crate::event::KeyEvent;
use crate::fsm::{State, Transitions};
use crate::keycode::Key;
use crate::modifier::{ModifierChange, classify_modifier_change};
use crate::snapshot::KeySnapshot;
use std::time::Duration;

/// Current state of a [`KeyInput`](super::KeyInput).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// No managed key is held, though a modifier may be.
    Unpressed,
    /// Keys are held; `last_change` is when the held set last changed.
    KeyDown { last_change: Duration },
    /// Some keys were released while others are still held.
    KeyLost,
    /// The focus key is repeating; fires when `remaining` runs out.
    KeyRepeat {
        remaining: Duration,
        last_tick: Duration,
    },
}

impl State for KeyState {
    fn name(&self) -> &'static str {
        match self {
            KeyState::Unpressed => "Unpressed",
            KeyState::KeyDown { .. } => "KeyDown",
            KeyState::KeyLost => "KeyLost",
            KeyState::KeyRepeat { .. } => "KeyRepeat",
        }
    }

    fn is_neutral(&self) -> bool {
        matches!(self, KeyState::Unpressed)
    }
}

/// Everything the key states read and write besides the state value itself.
#[derive(Debug, Default)]
pub(crate) struct KeyCore {
    pub(crate) config: KeyConfig,
    pub(crate) diff: KeySetDiff,
    pub(crate) snapshot: KeySnapshot,
    pub(crate) delta: KeyDelta,
    pub(crate) now: Duration,
}

impl KeyCore {
    pub(crate) fn new(config: KeyConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    fn refresh(&mut self) {
        self.delta = self.diff.update(&self.snapshot, &self.config);
    }

    fn key_down(&self, focus: Option<Key>, events: &mut Vec<KeyEvent>) {
        events.push(KeyEvent::KeyDown {
            keys: self.delta.filtered.clone(),
            focus,
            modifiers: self.delta.modifiers,
        });
    }

    fn key_lost(&self, events: &mut Vec<KeyEvent>) {
        events.push(KeyEvent::KeyLost {
            keys: self.delta.filtered.clone(),
            modifiers: self.delta.modifiers,
        });
    }

    fn newly_pressed_down(&self, events: &mut Vec<KeyEvent>) {
        for &key in &self.delta.newly_pressed {
            self.key_down(Some(key), events);
        }
    }

    /// A modifier-only change always resets the focus.
    fn modifier_change(&mut self) -> Result<ModifierChange> {
        self.diff.clear_focus();
        classify_modifier_change(self.delta.modifiers, self.delta.last_modifiers)
    }

    fn repeat_tick(&self, remaining: &mut Duration, last_tick: &mut Duration, events: &mut Vec<KeyEvent>) {
        *remaining = remaining.saturating_sub(self.now.saturating_sub(*last_tick));
        *last_tick = self.now;

        if remaining.is_zero() {
            if let Some(focus) = self.diff.focus() {
                events.push(KeyEvent::KeyRepeat {
                    focus,
                    modifiers: self.delta.modifiers,
                });
            }
            *remaining = self.config.repeat_frequency();
        }
    }

    fn execute_unpressed(&self) -> Option<KeyState> {
        let (filtered, modifiers) = KeySetDiff::filter(&self.snapshot, &self.config);
        (!filtered.is_empty() || !modifiers.is_empty()).then_some(KeyState::KeyDown {
            last_change: self.now,
        })
    }

    fn execute_key_down(
        &mut self,
        last_change: &mut Duration,
        events: &mut Vec<KeyEvent>,
    ) -> Result<Option<KeyState>> {
        self.refresh();

        if self.delta.no_keys_held() {
            return Ok(Some(KeyState::Unpressed));
        }
        if self.delta.lost_any && !self.delta.has_added_keys() {
            return Ok(Some(KeyState::KeyLost));
        }
        if self.delta.has_added_keys() {
            self.newly_pressed_down(events);
            *last_change = self.now;
            return Ok(None);
        }
        if self.delta.modifiers_changed() {
            *last_change = self.now;
            return Ok(match self.modifier_change()? {
                ModifierChange::Added => {
                    self.key_down(None, events);
                    None
                }
                ModifierChange::Lost => Some(KeyState::KeyLost),
            });
        }

        let held_for = self.now.saturating_sub(*last_change);
        let repeat = self.config.key_repeat_enabled()
            && self.diff.focus().is_some()
            && held_for >= self.config.repeat_delay();

        Ok(repeat.then_some(KeyState::KeyRepeat {
            remaining: Duration::ZERO,
            last_tick: self.now,
        }))
    }

    fn execute_key_lost(&mut self, events: &mut Vec<KeyEvent>) -> Result<Option<KeyState>> {
        self.refresh();

        if self.delta.no_keys_held() {
            return Ok(Some(KeyState::Unpressed));
        }
        if self.delta.lost_any && !self.delta.has_added_keys() {
            self.key_lost(events);
            return Ok(None);
        }
        if self.delta.has_added_keys() {
            return Ok(Some(self.key_down_state()));
        }
        if self.delta.modifiers_changed() {
            return Ok(match self.modifier_change()? {
                ModifierChange::Added => Some(self.key_down_state()),
                ModifierChange::Lost => {
                    self.key_lost(events);
                    None
                }
            });
        }
        Ok(None)
    }

    fn execute_key_repeat(
        &mut self,
        remaining: &mut Duration,
        last_tick: &mut Duration,
        events: &mut Vec<KeyEvent>,
    ) -> Result<Option<KeyState>> {
        self.refresh();

        if self.delta.no_keys_held() {
            return Ok(Some(KeyState::Unpressed));
        }
        if self.delta.lost_any && !self.delta.has_added_keys() {
            return Ok(Some(KeyState::KeyLost));
        }
        if self.delta.has_added_keys() {
            return Ok(Some(self.key_down_state()));
        }
        if self.delta.modifiers_changed() {
            return Ok(Some(match self.modifier_change()? {
                ModifierChange::Added => self.key_down_state(),
                ModifierChange::Lost => KeyState::KeyLost,
            }));
        }

        self.repeat_tick(remaining, last_tick, events);
        Ok(None)
    }

    fn key_down_state(&self) -> KeyState {
        KeyState::KeyDown {
            last_change: self.now,
        }
    }
}

impl Transitions<KeyState> for KeyCore {
    type Event = KeyEvent;

    fn execute(&mut self, state: &mut KeyState, events: &mut Vec<KeyEvent>) -> Result<Option<KeyState>> {
        match state {
            KeyState::Unpressed => Ok(self.execute_unpressed()),
            KeyState::KeyDown { last_change } => self.execute_key_down(last_change, events),
            KeyState::KeyLost => self.execute_key_lost(events),
            KeyState::KeyRepeat {
                remaining,
                last_tick,
            } => self.execute_key_repeat(remaining, last_tick, events),
        }
    }

    fn enter(&mut self, state: KeyState, from: KeyState, events: &mut Vec<KeyEvent>) -> KeyState {
        match state {
            KeyState::Unpressed => {
                self.diff.stop();
                events.push(KeyEvent::KeysReleased);
                KeyState::Unpressed
            }
            KeyState::KeyDown { .. } => {
                if from.is_neutral() {
                    // Everything held is new: one event per key, focus moving along.
                    self.delta = self.diff.start(&self.snapshot, &self.config);
                    if self.delta.filtered.is_empty() {
                        self.key_down(None, events);
                    }
                    for &key in &self.delta.filtered {
                        self.key_down(Some(key), events);
                    }
                } else {
                    self.newly_pressed_down(events);
                }
                self.key_down_state()
            }
            KeyState::KeyLost => {
                self.key_lost(events);
                KeyState::KeyLost
            }
            KeyState::KeyRepeat { .. } => {
                let mut remaining = Duration::ZERO;
                let mut last_tick = self.now;
                self.repeat_tick(&mut remaining, &mut last_tick, events);
                KeyState::KeyRepeat {
                    remaining,
                    last_tick,
                }
            }
        }
    }
}
