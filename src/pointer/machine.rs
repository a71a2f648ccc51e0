//! Pointer state machine: Stationary, Moving, and a Down/Dragging pair per button.

use super::PointerConfig;
use crate::error::Result;
use crate::event::{Button, PointerEvent};
use crate::fsm::{State, Transitions};
use crate::snapshot::PointerSnapshot;
use std::time::Duration;

/// Current state of a [`PointerInput`](super::PointerInput).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerState {
    Stationary,
    Moving,
    /// `Button` is held and the pointer is still within the drag variance.
    Down(Button),
    Dragging(Button),
}

impl State for PointerState {
    fn name(&self) -> &'static str {
        match self {
            PointerState::Stationary => "Stationary",
            PointerState::Moving => "Moving",
            PointerState::Down(Button::Left) => "LeftDown",
            PointerState::Down(Button::Right) => "RightDown",
            PointerState::Down(Button::Middle) => "MiddleDown",
            PointerState::Dragging(Button::Left) => "LeftDragging",
            PointerState::Dragging(Button::Right) => "RightDragging",
            PointerState::Dragging(Button::Middle) => "MiddleDragging",
        }
    }

    fn is_neutral(&self) -> bool {
        matches!(self, PointerState::Stationary)
    }
}

/// Double-click bookkeeping for one button. Survives state changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ClickLatch {
    /// When the press that may start a double click happened.
    pub(crate) armed_at: Option<Duration>,
    /// The current press completed a double click; its release is silent.
    pub(crate) suppress_release: bool,
}

#[derive(Debug, Default)]
pub(crate) struct PointerCore {
    pub(crate) config: PointerConfig,
    pub(crate) current: PointerSnapshot,
    pub(crate) previous: PointerSnapshot,
    pub(crate) drag_origin: PointerSnapshot,
    pub(crate) latches: [ClickLatch; 3],
    pub(crate) now: Duration,
}

impl PointerCore {
    pub(crate) fn new(config: PointerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Wheel movement is reported on every poll whatever the state.
    pub(crate) fn check_scroll_wheel(&self, events: &mut Vec<PointerEvent>) {
        let delta = self.current.wheel.wrapping_sub(self.previous.wheel);
        if delta != 0 {
            events.push(PointerEvent::ScrollWheelMove {
                state: self.current,
                delta,
            });
        }
    }

    /// First enabled button held, in [`Button::ALL`] order.
    fn pressed_button(&self) -> Option<Button> {
        Button::ALL
            .into_iter()
            .find(|&button| self.config.is_button_enabled(button) && self.current.is_pressed(button))
    }

    fn has_moved(&self) -> bool {
        !self.current.same_position(&self.previous)
    }

    fn is_starting_drag(&self) -> bool {
        let variance = self.config.drag_variance();
        self.current.x.abs_diff(self.drag_origin.x) > variance
            || self.current.y.abs_diff(self.drag_origin.y) > variance
    }

    fn execute_down(&mut self, button: Button, events: &mut Vec<PointerEvent>) -> Option<PointerState> {
        let released = !self.current.is_pressed(button);
        let latch = &mut self.latches[button.index()];

        if latch.suppress_release {
            if released {
                latch.suppress_release = false;
                return Some(PointerState::Stationary);
            }
            return None;
        }

        if released {
            let origin = self.drag_origin;
            events.push(PointerEvent::Up {
                button,
                state: origin,
                origin,
            });
            events.push(PointerEvent::Click {
                button,
                state: origin,
                origin,
            });
            return Some(PointerState::Stationary);
        }

        self.is_starting_drag().then_some(PointerState::Dragging(button))
    }

    fn execute_dragging(&self, button: Button, events: &mut Vec<PointerEvent>) -> Option<PointerState> {
        if !self.current.is_pressed(button) {
            events.push(PointerEvent::Up {
                button,
                state: self.current,
                origin: self.drag_origin,
            });
            events.push(PointerEvent::DragDone {
                button,
                state: self.current,
                origin: self.drag_origin,
            });
            return Some(PointerState::Stationary);
        }

        if self.has_moved() {
            self.dragging(button, events);
        }
        None
    }

    fn enter_down(&mut self, button: Button, events: &mut Vec<PointerEvent>) {
        self.drag_origin = self.current;
        let now = self.now;
        let window = self.config.double_click_window();
        let latch = &mut self.latches[button.index()];

        match latch.armed_at {
            Some(armed_at) if now.saturating_sub(armed_at) <= window => {
                latch.armed_at = None;
                latch.suppress_release = true;
                events.push(PointerEvent::DoubleClick {
                    button,
                    state: self.drag_origin,
                    origin: self.drag_origin,
                });
            }
            _ => {
                latch.armed_at = Some(now);
                events.push(PointerEvent::Down {
                    button,
                    state: self.current,
                });
            }
        }
    }

    fn moving(&self, events: &mut Vec<PointerEvent>) {
        events.push(PointerEvent::Moving {
            state: self.current,
            previous: self.previous,
        });
    }

    fn dragging(&self, button: Button, events: &mut Vec<PointerEvent>) {
        events.push(PointerEvent::Dragging {
            button,
            state: self.current,
            origin: self.drag_origin,
        });
    }
}

impl Transitions<PointerState> for PointerCore {
    type Event = PointerEvent;

    fn execute(
        &mut self,
        state: &mut PointerState,
        events: &mut Vec<PointerEvent>,
    ) -> Result<Option<PointerState>> {
        Ok(match *state {
            PointerState::Stationary => match self.pressed_button() {
                Some(button) => Some(PointerState::Down(button)),
                None => self.has_moved().then_some(PointerState::Moving),
            },
            PointerState::Moving => match self.pressed_button() {
                Some(button) => Some(PointerState::Down(button)),
                None if !self.has_moved() => Some(PointerState::Stationary),
                None => {
                    self.moving(events);
                    None
                }
            },
            PointerState::Down(button) => self.execute_down(button, events),
            PointerState::Dragging(button) => self.execute_dragging(button, events),
        })
    }

    fn enter(
        &mut self,
        state: PointerState,
        _from: PointerState,
        events: &mut Vec<PointerEvent>,
    ) -> PointerState {
        match state {
            PointerState::Stationary => {}
            PointerState::Moving => self.moving(events),
            PointerState::Down(button) => self.enter_down(button, events),
            PointerState::Dragging(button) => self.dragging(button, events),
        }
        state
    }
}
