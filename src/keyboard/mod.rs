//! Key-matrix engine.
//!
//! [`KeyInput`] turns the set of keys held at each poll into
//! [`KeyEvent`](crate::event::KeyEvent)s:
//! a `KeyDown` per newly pressed key, `KeyLost` when some keys are released,
//! `KeyRepeat` while the focus key is held, and `KeysReleased` once nothing is
//! held. Modifier keys are folded into a
//! [`ModifierMask`](crate::modifier::ModifierMask) unless configured to count
//! as ordinary keys.

mod diff;
mod machine;

pub use diff::{KeyDelta, KeySetDiff};
pub use machine::KeyState;

use crate::clock::{ElapsedTime, Stopwatch};
use crate::error::Result;
use crate::fsm::StateMachine;
use crate::handler::KeyHandler;
use crate::keycode::Key;
use crate::snapshot::KeySnapshot;
use crate::subscription::SubscriberRegistry;
use machine::KeyCore;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default hold time before a key starts repeating.
pub const DEFAULT_REPEAT_DELAY_MS: u32 = 1000;
/// Default interval between repeats.
pub const DEFAULT_REPEAT_FREQUENCY_MS: u32 = 50;

/// Tunables for a [`KeyInput`].
///
/// Durations are whole milliseconds. Setters reject zero and keep the
/// previous value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct KeyConfig {
    treat_modifiers_as_keys: bool,
    unmanaged_keys: BTreeSet<Key>,
    repeat_delay_ms: u32,
    repeat_frequency_ms: u32,
    key_repeat_enabled: bool,
    wait_for_neutral_state: bool,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            treat_modifiers_as_keys: false,
            unmanaged_keys: BTreeSet::new(),
            repeat_delay_ms: DEFAULT_REPEAT_DELAY_MS,
            repeat_frequency_ms: DEFAULT_REPEAT_FREQUENCY_MS,
            key_repeat_enabled: true,
            wait_for_neutral_state: false,
        }
    }
}

impl KeyConfig {
    pub fn treat_modifiers_as_keys(&self) -> bool {
        self.treat_modifiers_as_keys
    }

    pub fn set_treat_modifiers_as_keys(&mut self, treat: bool) {
        self.treat_modifiers_as_keys = treat;
    }

    pub fn with_treat_modifiers_as_keys(mut self, treat: bool) -> Self {
        self.set_treat_modifiers_as_keys(treat);
        self
    }

    /// Keys the engine ignores entirely.
    pub fn unmanaged_keys(&self) -> &BTreeSet<Key> {
        &self.unmanaged_keys
    }

    pub fn is_unmanaged(&self, key: Key) -> bool {
        self.unmanaged_keys.contains(&key)
    }

    pub fn set_unmanaged_keys(&mut self, keys: impl IntoIterator<Item = Key>) {
        self.unmanaged_keys = keys.into_iter().collect();
    }

    pub fn add_unmanaged_key(&mut self, key: Key) {
        self.unmanaged_keys.insert(key);
    }

    pub fn remove_unmanaged_key(&mut self, key: Key) {
        self.unmanaged_keys.remove(&key);
    }

    pub fn with_unmanaged_keys(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.set_unmanaged_keys(keys);
        self
    }

    pub fn repeat_delay_ms(&self) -> u32 {
        self.repeat_delay_ms
    }

    pub fn repeat_delay(&self) -> Duration {
        Duration::from_millis(self.repeat_delay_ms.into())
    }

    pub fn set_repeat_delay_ms(&mut self, ms: u32) {
        if ms == 0 {
            log::warn!("ignoring zero key repeat delay, keeping {}ms", self.repeat_delay_ms);
            return;
        }
        self.repeat_delay_ms = ms;
    }

    pub fn with_repeat_delay_ms(mut self, ms: u32) -> Self {
        self.set_repeat_delay_ms(ms);
        self
    }

    pub fn repeat_frequency_ms(&self) -> u32 {
        self.repeat_frequency_ms
    }

    pub fn repeat_frequency(&self) -> Duration {
        Duration::from_millis(self.repeat_frequency_ms.into())
    }

    pub fn set_repeat_frequency_ms(&mut self, ms: u32) {
        if ms == 0 {
            log::warn!(
                "ignoring zero key repeat frequency, keeping {}ms",
                self.repeat_frequency_ms
            );
            return;
        }
        self.repeat_frequency_ms = ms;
    }

    pub fn with_repeat_frequency_ms(mut self, ms: u32) -> Self {
        self.set_repeat_frequency_ms(ms);
        self
    }

    pub fn key_repeat_enabled(&self) -> bool {
        self.key_repeat_enabled
    }

    pub fn set_key_repeat_enabled(&mut self, enabled: bool) {
        self.key_repeat_enabled = enabled;
    }

    pub fn with_key_repeat_enabled(mut self, enabled: bool) -> Self {
        self.set_key_repeat_enabled(enabled);
        self
    }

    /// Hold subscription changes until nothing is pressed.
    pub fn wait_for_neutral_state(&self) -> bool {
        self.wait_for_neutral_state
    }

    pub fn set_wait_for_neutral_state(&mut self, wait: bool) {
        self.wait_for_neutral_state = wait;
    }

    pub fn with_wait_for_neutral_state(mut self, wait: bool) -> Self {
        self.set_wait_for_neutral_state(wait);
        self
    }

    /// Replace zero durations, e.g. from a deserialized file, with defaults.
    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }

    pub(crate) fn sanitize(&mut self) {
        if self.repeat_delay_ms == 0 {
            log::warn!("key repeat delay of 0ms replaced with {DEFAULT_REPEAT_DELAY_MS}ms");
            self.repeat_delay_ms = DEFAULT_REPEAT_DELAY_MS;
        }
        if self.repeat_frequency_ms == 0 {
            log::warn!("key repeat frequency of 0ms replaced with {DEFAULT_REPEAT_FREQUENCY_MS}ms");
            self.repeat_frequency_ms = DEFAULT_REPEAT_FREQUENCY_MS;
        }
    }
}

/// Polled key-matrix engine.
///
/// Call [`poll`](Self::poll) once per tick with the keys currently held.
/// Events are delivered synchronously to subscribers, in subscription order,
/// before `poll` returns.
pub struct KeyInput {
    clock: Rc<dyn ElapsedTime>,
    epoch: Duration,
    machine: StateMachine<KeyState>,
    core: KeyCore,
    previous: KeySnapshot,
    subscribers: Rc<SubscriberRegistry<dyn KeyHandler>>,
    update_number: u32,
}

impl KeyInput {
    /// Engine timed by the wall clock, with default settings.
    pub fn new() -> Self {
        Self::with_clock(Stopwatch::start())
    }

    pub fn with_clock(clock: impl ElapsedTime + 'static) -> Self {
        Self::with_config(clock, KeyConfig::default())
    }

    pub fn with_config(clock: impl ElapsedTime + 'static, config: KeyConfig) -> Self {
        let clock: Rc<dyn ElapsedTime> = Rc::new(clock);
        let config = config.sanitized();
        let subscribers = Rc::new(SubscriberRegistry::new(clock.clone()));
        subscribers.set_wait_for_neutral_state(config.wait_for_neutral_state());

        Self {
            epoch: clock.elapsed(),
            clock,
            machine: StateMachine::new(KeyState::Unpressed),
            core: KeyCore::new(config),
            previous: KeySnapshot::empty(),
            subscribers,
            update_number: 0,
        }
    }

    /// Feed one poll's reading through the state machine.
    ///
    /// On error nothing from this poll has been dispatched.
    pub fn poll(&mut self, snapshot: &KeySnapshot) -> Result<()> {
        self.update_number = self.update_number.wrapping_add(1);
        self.core.config.sanitize();
        self.settle_subscribers();

        self.previous = std::mem::replace(&mut self.core.snapshot, snapshot.clone());
        self.core.now = self.now();

        let mut events = Vec::new();
        if let Err(err) = self.machine.update(&mut self.core, &mut events) {
            log::error!("key poll {} aborted: {err}", self.update_number);
            return Err(err);
        }

        for event in &events {
            log::trace!("key event: {event:?}");
            self.subscribers.dispatch(|handler| handler.handle_event(event));
        }

        if self.machine.is_neutral() {
            self.subscribers.reached_neutral_state();
        }
        Ok(())
    }

    /// Return to `Unpressed` without raising `KeysReleased`.
    ///
    /// The poll counter and the engine's notion of time restart; subscribers
    /// are kept.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.core.diff.stop();
        self.core.delta = KeyDelta::default();
        self.core.snapshot = KeySnapshot::empty();
        self.previous = KeySnapshot::empty();
        self.epoch = self.clock.elapsed();
        self.core.now = Duration::ZERO;
        self.update_number = 0;
        log::debug!("key input reset");
    }

    pub fn subscribe<T: KeyHandler + 'static>(&self, handler: &Rc<T>) {
        let handler: Rc<dyn KeyHandler> = handler.clone();
        self.subscribers.subscribe(&handler);
    }

    pub fn unsubscribe<T: KeyHandler + 'static>(&self, handler: &Rc<T>) {
        let handler: Rc<dyn KeyHandler> = handler.clone();
        self.subscribers.unsubscribe(&handler);
    }

    /// Shared handle to the subscriber registry.
    ///
    /// Handlers may hold on to it to subscribe or unsubscribe from inside a
    /// callback.
    pub fn subscribers(&self) -> Rc<SubscriberRegistry<dyn KeyHandler>> {
        self.subscribers.clone()
    }

    pub fn wait_for_neutral_state(&self) -> bool {
        self.core.config.wait_for_neutral_state()
    }

    /// Turning this off applies queued subscription changes right away.
    pub fn set_wait_for_neutral_state(&mut self, wait: bool) {
        self.core.config.set_wait_for_neutral_state(wait);
        self.subscribers.set_wait_for_neutral_state(wait);
    }

    pub fn config(&self) -> &KeyConfig {
        &self.core.config
    }

    /// Changes take effect on the next poll, which also replaces zero
    /// repeat durations with their defaults.
    pub fn config_mut(&mut self) -> &mut KeyConfig {
        &mut self.core.config
    }

    /// Polls since construction or the last reset. Wraps at `u32::MAX`.
    pub fn update_number(&self) -> u32 {
        self.update_number
    }

    pub fn state(&self) -> KeyState {
        self.machine.current()
    }

    pub fn current_state_name(&self) -> &'static str {
        self.machine.current_state_name()
    }

    pub fn is_neutral(&self) -> bool {
        self.machine.is_neutral()
    }

    /// The key that would repeat if held, if any.
    pub fn focus(&self) -> Option<Key> {
        self.core.diff.focus()
    }

    pub fn current_snapshot(&self) -> &KeySnapshot {
        &self.core.snapshot
    }

    pub fn previous_snapshot(&self) -> &KeySnapshot {
        &self.previous
    }

    /// Time since construction or the last reset.
    pub fn now(&self) -> Duration {
        self.clock.elapsed().saturating_sub(self.epoch)
    }

    fn settle_subscribers(&self) {
        self.subscribers
            .set_wait_for_neutral_state(self.core.config.wait_for_neutral_state());
        if self.machine.is_neutral() {
            self.subscribers.reached_neutral_state();
        }
    }
}

impl Default for KeyInput {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KeyInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyInput")
            .field("state", &self.machine.current())
            .field("update_number", &self.update_number)
            .field("config", &self.core.config)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}
