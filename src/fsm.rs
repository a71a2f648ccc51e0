//! Minimal finite-state-machine scaffold used by both engines.
//!
//! A machine owns the current state value. The owning engine supplies the
//! behaviour through [`Transitions`]: `execute` runs once per poll and may
//! request a new state, after which the machine runs `exit` on the old state
//! and `enter` on the new one, in that order. Events produced along the way
//! are appended to a buffer the engine dispatches once the step succeeds.

use crate::error::Result;
use std::fmt;

/// A state value. States may carry per-state data.
pub trait State: Copy + fmt::Debug {
    /// Diagnostic name of the state.
    fn name(&self) -> &'static str;

    /// Whether this is the engine's quiescent state.
    fn is_neutral(&self) -> bool;
}

/// Per-engine behaviour driven by a [`StateMachine`].
pub trait Transitions<S: State> {
    type Event;

    /// Run the current state's per-poll logic. Returning `Some` requests a
    /// transition.
    fn execute(&mut self, state: &mut S, events: &mut Vec<Self::Event>) -> Result<Option<S>>;

    /// Called on the new state after a transition. Returns the state as it
    /// should be stored, with any per-state data initialised.
    fn enter(&mut self, state: S, from: S, events: &mut Vec<Self::Event>) -> S;

    /// Called on the old state before a transition.
    fn exit(&mut self, _state: S, _events: &mut Vec<Self::Event>) {}
}

/// Holds the current and previous state of one machine.
#[derive(Debug, Clone)]
pub struct StateMachine<S: State> {
    initial: S,
    current: S,
    previous: S,
}

impl<S: State> StateMachine<S> {
    /// Create a machine sitting in `initial`. No `enter` is run.
    pub fn new(initial: S) -> Self {
        Self {
            initial,
            current: initial,
            previous: initial,
        }
    }

    pub fn current(&self) -> S {
        self.current
    }

    pub fn previous(&self) -> S {
        self.previous
    }

    pub fn current_state_name(&self) -> &'static str {
        self.current.name()
    }

    pub fn is_neutral(&self) -> bool {
        self.current.is_neutral()
    }

    /// Run one poll's worth of the current state.
    pub fn update<T>(&mut self, owner: &mut T, events: &mut Vec<T::Event>) -> Result<()>
    where
        T: Transitions<S>,
    {
        let mut state = self.current;
        let next = owner.execute(&mut state, events)?;
        self.current = state;

        if let Some(next) = next {
            self.change_state(owner, next, events);
        }
        Ok(())
    }

    /// Exit the current state and enter `next`.
    pub fn change_state<T>(&mut self, owner: &mut T, next: S, events: &mut Vec<T::Event>)
    where
        T: Transitions<S>,
    {
        let from = self.current;
        owner.exit(from, events);
        self.current = owner.enter(next, from, events);
        self.previous = from;
        log::debug!("state change: {} -> {}", from.name(), self.current.name());
    }

    /// Return to the initial state without running `exit` or `enter`.
    pub fn reset(&mut self) {
        self.current = self.initial;
        self.previous = self.initial;
    }
}
