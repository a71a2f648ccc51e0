//! Pointer engine.
//!
//! [`PointerInput`] compares consecutive [`PointerSnapshot`]s and raises
//! moves, presses, clicks, double clicks and drags. Only one button is tracked
//! at a time; when several go down on the same poll the first enabled one in
//! [`Button::ALL`] order wins. Scroll wheel movement is reported on every poll
//! regardless of what the buttons are doing.

mod machine;

pub use machine::PointerState;

use crate::clock::{ElapsedTime, Stopwatch};
use crate::error::Result;
use crate::event::Button;
use crate::fsm::StateMachine;
use crate::handler::PointerHandler;
use crate::snapshot::PointerSnapshot;
use crate::subscription::SubscriberRegistry;
use machine::{ClickLatch, PointerCore};
use std::rc::Rc;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default pixel tolerance before a held button turns into a drag.
pub const DEFAULT_DRAG_VARIANCE: u32 = 10;
/// Default maximum time between the presses of a double click.
pub const DEFAULT_DOUBLE_CLICK_WINDOW_MS: u32 = 400;

/// Tunables for a [`PointerInput`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct PointerConfig {
    drag_variance: u32,
    double_click_window_ms: u32,
    left_button_enabled: bool,
    right_button_enabled: bool,
    middle_button_enabled: bool,
    wait_for_neutral_state: bool,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            drag_variance: DEFAULT_DRAG_VARIANCE,
            double_click_window_ms: DEFAULT_DOUBLE_CLICK_WINDOW_MS,
            left_button_enabled: true,
            right_button_enabled: true,
            middle_button_enabled: true,
            wait_for_neutral_state: false,
        }
    }
}

impl PointerConfig {
    /// Pixels the pointer may move on either axis while a button is held
    /// before the press becomes a drag.
    pub fn drag_variance(&self) -> u32 {
        self.drag_variance
    }

    pub fn set_drag_variance(&mut self, pixels: u32) {
        self.drag_variance = pixels;
    }

    pub fn with_drag_variance(mut self, pixels: u32) -> Self {
        self.set_drag_variance(pixels);
        self
    }

    pub fn double_click_window_ms(&self) -> u32 {
        self.double_click_window_ms
    }

    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_window_ms.into())
    }

    /// A window of zero only accepts a second press at the same instant.
    pub fn set_double_click_window_ms(&mut self, ms: u32) {
        self.double_click_window_ms = ms;
    }

    pub fn with_double_click_window_ms(mut self, ms: u32) -> Self {
        self.set_double_click_window_ms(ms);
        self
    }

    pub fn is_button_enabled(&self, button: Button) -> bool {
        match button {
            Button::Left => self.left_button_enabled,
            Button::Right => self.right_button_enabled,
            Button::Middle => self.middle_button_enabled,
        }
    }

    /// A disabled button is ignored when deciding which button went down.
    pub fn set_button_enabled(&mut self, button: Button, enabled: bool) {
        match button {
            Button::Left => self.left_button_enabled = enabled,
            Button::Right => self.right_button_enabled = enabled,
            Button::Middle => self.middle_button_enabled = enabled,
        }
    }

    pub fn with_button_enabled(mut self, button: Button, enabled: bool) -> Self {
        self.set_button_enabled(button, enabled);
        self
    }

    /// Hold subscription changes until the pointer is stationary.
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
}

/// Polled pointer engine.
///
/// ```
/// use polled_input::{Button, ManualClock, PointerEvent, PointerInput, PointerSnapshot};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let clock = ManualClock::new();
/// let mut pointer = PointerInput::with_clock(clock.clone());
/// let clicks = Rc::new(RefCell::new(0));
///
/// let counter = clicks.clone();
/// let handler = Rc::new(move |event: &PointerEvent| {
///     if let PointerEvent::Click { .. } = event {
///         *counter.borrow_mut() += 1;
///     }
/// });
/// pointer.subscribe(&handler);
///
/// let here = PointerSnapshot::at(5, 5);
/// pointer.poll(&here.pressed(Button::Left)).unwrap();
/// clock.advance_ms(80);
/// pointer.poll(&here).unwrap();
///
/// assert_eq!(*clicks.borrow(), 1);
/// ```
pub struct PointerInput {
    clock: Rc<dyn ElapsedTime>,
    epoch: Duration,
    machine: StateMachine<PointerState>,
    core: PointerCore,
    subscribers: Rc<SubscriberRegistry<dyn PointerHandler>>,
    update_number: u32,
}

impl PointerInput {
    /// Engine timed by the wall clock, with default settings.
    pub fn new() -> Self {
        Self::with_clock(Stopwatch::start())
    }

    pub fn with_clock(clock: impl ElapsedTime + 'static) -> Self {
        Self::with_config(clock, PointerConfig::default())
    }

    pub fn with_config(clock: impl ElapsedTime + 'static, config: PointerConfig) -> Self {
        let clock: Rc<dyn ElapsedTime> = Rc::new(clock);
        let subscribers = Rc::new(SubscriberRegistry::new(clock.clone()));
        subscribers.set_wait_for_neutral_state(config.wait_for_neutral_state());

        Self {
            epoch: clock.elapsed(),
            clock,
            machine: StateMachine::new(PointerState::Stationary),
            core: PointerCore::new(config),
            subscribers,
            update_number: 0,
        }
    }

    /// Feed one poll's reading through the state machine and deliver the
    /// resulting events.
    pub fn poll(&mut self, snapshot: &PointerSnapshot) -> Result<()> {
        self.update_number = self.update_number.wrapping_add(1);
        self.settle_subscribers();

        self.core.previous = std::mem::replace(&mut self.core.current, *snapshot);
        self.core.now = self.now();

        let mut events = Vec::new();
        self.core.check_scroll_wheel(&mut events);
        if let Err(err) = self.machine.update(&mut self.core, &mut events) {
            log::error!("pointer poll {} aborted: {err}", self.update_number);
            return Err(err);
        }

        for event in &events {
            log::trace!("pointer event: {event:?}");
            self.subscribers.dispatch(|handler| handler.handle_event(event));
        }

        if self.machine.is_neutral() {
            self.subscribers.reached_neutral_state();
        }
        Ok(())
    }

    /// Return to `Stationary` and forget any pending double click.
    ///
    /// The poll counter and the engine's notion of time restart; subscribers
    /// and the last polled snapshots are kept.
    pub fn reset(&mut self) {
        self.machine.reset();
        self.reset_double_click_latches();
        self.core.drag_origin = self.core.current;
        self.epoch = self.clock.elapsed();
        self.core.now = Duration::ZERO;
        self.update_number = 0;
        log::debug!("pointer input reset");
    }

    /// Forget a half-finished double click on `button`.
    ///
    /// Neutral-state gating does not touch these latches, so a caller swapping
    /// subscribers mid-gesture may want to call this as well.
    pub fn reset_double_click(&mut self, button: Button) {
        self.core.latches[button.index()] = ClickLatch::default();
    }

    pub fn reset_double_click_latches(&mut self) {
        self.core.latches = Default::default();
    }

    pub fn subscribe<T: PointerHandler + 'static>(&self, handler: &Rc<T>) {
        let handler: Rc<dyn PointerHandler> = handler.clone();
        self.subscribers.subscribe(&handler);
    }

    pub fn unsubscribe<T: PointerHandler + 'static>(&self, handler: &Rc<T>) {
        let handler: Rc<dyn PointerHandler> = handler.clone();
        self.subscribers.unsubscribe(&handler);
    }

    /// Shared handle to the subscriber registry, for handlers that change
    /// subscriptions from inside a callback.
    pub fn subscribers(&self) -> Rc<SubscriberRegistry<dyn PointerHandler>> {
        self.subscribers.clone()
    }

    pub fn wait_for_neutral_state(&self) -> bool {
        self.core.config.wait_for_neutral_state()
    }

    pub fn set_wait_for_neutral_state(&mut self, wait: bool) {
        self.core.config.set_wait_for_neutral_state(wait);
        self.subscribers.set_wait_for_neutral_state(wait);
    }

    pub fn config(&self) -> &PointerConfig {
        &self.core.config
    }

    pub fn config_mut(&mut self) -> &mut PointerConfig {
        &mut self.core.config
    }

    pub fn update_number(&self) -> u32 {
        self.update_number
    }

    pub fn state(&self) -> PointerState {
        self.machine.current()
    }

    pub fn current_state_name(&self) -> &'static str {
        self.machine.current_state_name()
    }

    pub fn is_neutral(&self) -> bool {
        self.machine.is_neutral()
    }

    /// Snapshot taken when the tracked button went down.
    pub fn drag_origin(&self) -> PointerSnapshot {
        self.core.drag_origin
    }

    pub fn current_snapshot(&self) -> PointerSnapshot {
        self.core.current
    }

    pub fn previous_snapshot(&self) -> PointerSnapshot {
        self.core.previous
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

impl Default for PointerInput {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PointerInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerInput")
            .field("state", &self.machine.current())
            .field("update_number", &self.update_number)
            .field("config", &self.core.config)
            .field("subscribers", &self.subscribers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::event::PointerEvent;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<PointerEvent>>,
    }

    impl PointerHandler for Recorder {
        fn handle_event(&self, event: &PointerEvent) {
            self.events.borrow_mut().push(*event);
        }
    }

    impl Recorder {
        fn take(&self) -> Vec<PointerEvent> {
            std::mem::take(&mut *self.events.borrow_mut())
        }

        fn kinds(&self) -> Vec<&'static str> {
            self.take().iter().map(PointerEvent::kind).collect()
        }
    }

    fn setup(config: PointerConfig) -> (ManualClock, PointerInput, Rc<Recorder>) {
        let clock = ManualClock::new();
        let pointer = PointerInput::with_config(clock.clone(), config);
        let recorder = Rc::new(Recorder::default());
        pointer.subscribe(&recorder);
        (clock, pointer, recorder)
    }

    fn poll(pointer: &mut PointerInput, snapshot: PointerSnapshot) {
        pointer.poll(&snapshot).unwrap();
    }

    fn click(pointer: &mut PointerInput, clock: &ManualClock, at: PointerSnapshot) {
        poll(pointer, at.pressed(Button::Left));
        clock.advance_ms(50);
        poll(pointer, at);
    }

    #[test]
    fn test_click_reports_origin() {
        let (clock, mut pointer, recorder) = setup(PointerConfig::default());
        let origin = PointerSnapshot::at(10, 10).pressed(Button::Left);

        poll(&mut pointer, origin);
        assert_eq!(pointer.current_state_name(), "LeftDown");
        clock.advance_ms(30);
        poll(&mut pointer, origin.moved_to(15, 10));
        poll(&mut pointer, PointerSnapshot::at(15, 10));

        assert_eq!(
            recorder.take(),
            vec![
                PointerEvent::Down {
                    button: Button::Left,
                    state: origin,
                },
                PointerEvent::Up {
                    button: Button::Left,
                    state: origin,
                    origin,
                },
                PointerEvent::Click {
                    button: Button::Left,
                    state: origin,
                    origin,
                },
            ]
        );
        assert!(pointer.is_neutral());
    }

    #[test]
    fn test_held_button_is_idempotent() {
        let (_clock, mut pointer, recorder) = setup(PointerConfig::default());
        let held = PointerSnapshot::at(3, 3).pressed(Button::Right);

        poll(&mut pointer, held);
        poll(&mut pointer, held);
        poll(&mut pointer, held);

        assert_eq!(recorder.kinds(), vec!["Down"]);
        assert_eq!(pointer.current_state_name(), "RightDown");
    }

    #[test]
    fn test_double_click_inside_window() {
        let (clock, mut pointer, recorder) = setup(PointerConfig::default());
        let here = PointerSnapshot::at(20, 20);

        click(&mut pointer, &clock, here);
        recorder.take();
        clock.advance_ms(350);
        poll(&mut pointer, here.pressed(Button::Left));

        assert_eq!(
            recorder.take(),
            vec![PointerEvent::DoubleClick {
                button: Button::Left,
                state: here.pressed(Button::Left),
                origin: here.pressed(Button::Left),
            }]
        );

        poll(&mut pointer, here);
        assert!(recorder.take().is_empty());
        assert!(pointer.is_neutral());
    }

    #[test]
    fn test_double_click_window_is_inclusive() {
        let (clock, mut pointer, recorder) = setup(PointerConfig::default());
        let here = PointerSnapshot::at(0, 0);

        poll(&mut pointer, here.pressed(Button::Left));
        poll(&mut pointer, here);
        clock.advance_ms(400);
        poll(&mut pointer, here.pressed(Button::Left));

        assert_eq!(recorder.kinds(), vec!["Down", "Up", "Click", "DoubleClick"]);
    }

    #[test]
    fn test_second_press_after_window_is_plain_click() {
        let (clock, mut pointer, recorder) = setup(PointerConfig::default());
        let here = PointerSnapshot::at(0, 0);

        poll(&mut pointer, here.pressed(Button::Left));
        poll(&mut pointer, here);
        recorder.take();
        clock.advance_ms(401);
        poll(&mut pointer, here.pressed(Button::Left));
        poll(&mut pointer, here);

        assert_eq!(recorder.kinds(), vec!["Down", "Up", "Click"]);
    }

    #[test]
    fn test_late_press_rearms_double_click() {
        let (clock, mut pointer, recorder) = setup(PointerConfig::default());
        let here = PointerSnapshot::at(0, 0);

        click(&mut pointer, &clock, here);
        clock.advance_ms(1000);
        click(&mut pointer, &clock, here);
        clock.advance_ms(100);
        poll(&mut pointer, here.pressed(Button::Left));

        assert_eq!(recorder.take().last().map(PointerEvent::kind), Some("DoubleClick"));
    }

    #[test]
    fn test_double_click_is_per_button() {
        let (clock, mut pointer, recorder) = setup(PointerConfig::default());
        let here = PointerSnapshot::at(0, 0);

        click(&mut pointer, &clock, here);
        recorder.take();
        poll(&mut pointer, here.pressed(Button::Right));

        assert_eq!(recorder.kinds(), vec!["Down"]);
    }

    #[test]
    fn test_reset_double_click_latch() {
        let (clock, mut pointer, recorder) = setup(PointerConfig::default());
        let here = PointerSnapshot::at(0, 0);

        click(&mut pointer, &clock, here);
        recorder.take();
        pointer.reset_double_click(Button::Left);
        poll(&mut pointer, here.pressed(Button::Left));

        assert_eq!(recorder.kinds(), vec!["Down"]);
    }

    #[test]
    fn test_drag_variance_boundary() {
        let (_clock, mut pointer, recorder) = setup(PointerConfig::default());
        let origin = PointerSnapshot::at(100, 100).pressed(Button::Left);

        poll(&mut pointer, origin);
        poll(&mut pointer, origin.moved_to(110, 90));
        assert_eq!(pointer.current_state_name(), "LeftDown");

        poll(&mut pointer, origin.moved_to(111, 100));
        assert_eq!(pointer.current_state_name(), "LeftDragging");
        assert_eq!(
            recorder.take(),
            vec![
                PointerEvent::Down {
                    button: Button::Left,
                    state: origin,
                },
                PointerEvent::Dragging {
                    button: Button::Left,
                    state: origin.moved_to(111, 100),
                    origin,
                },
            ]
        );
    }

    #[test]
    fn test_drag_done_reports_release_position() {
        let config = PointerConfig::default().with_drag_variance(0);
        let (_clock, mut pointer, recorder) = setup(config);
        let origin = PointerSnapshot::at(0, 0).pressed(Button::Middle);

        poll(&mut pointer, origin);
        poll(&mut pointer, origin.moved_to(1, 0));
        poll(&mut pointer, origin.moved_to(1, 0));
        poll(&mut pointer, origin.moved_to(2, 0));
        recorder.take();
        poll(&mut pointer, PointerSnapshot::at(5, 0));

        let released = PointerSnapshot::at(5, 0);
        assert_eq!(
            recorder.take(),
            vec![
                PointerEvent::Up {
                    button: Button::Middle,
                    state: released,
                    origin,
                },
                PointerEvent::DragDone {
                    button: Button::Middle,
                    state: released,
                    origin,
                },
            ]
        );
        assert_eq!(pointer.drag_origin(), origin);
    }

    #[test]
    fn test_dragging_only_reports_movement() {
        let config = PointerConfig::default().with_drag_variance(0);
        let (_clock, mut pointer, recorder) = setup(config);
        let origin = PointerSnapshot::at(0, 0).pressed(Button::Left);

        poll(&mut pointer, origin);
        poll(&mut pointer, origin.moved_to(4, 4));
        poll(&mut pointer, origin.moved_to(4, 4));
        poll(&mut pointer, origin.moved_to(6, 4));

        assert_eq!(recorder.kinds(), vec!["Down", "Dragging", "Dragging"]);
    }

    #[test]
    fn test_scroll_is_independent_of_drag() {
        let config = PointerConfig::default().with_drag_variance(0);
        let (_clock, mut pointer, recorder) = setup(config);
        let origin = PointerSnapshot::at(0, 0).pressed(Button::Left);

        poll(&mut pointer, origin);
        poll(&mut pointer, origin.moved_to(3, 0));
        recorder.take();
        poll(&mut pointer, origin.moved_to(3, 0).with_wheel(-120));

        assert_eq!(
            recorder.take(),
            vec![PointerEvent::ScrollWheelMove {
                state: origin.moved_to(3, 0).with_wheel(-120),
                delta: -120,
            }]
        );
        assert_eq!(pointer.current_state_name(), "LeftDragging");
    }

    #[test]
    fn test_moving_and_settling() {
        let (_clock, mut pointer, recorder) = setup(PointerConfig::default());
        let start = PointerSnapshot::at(0, 0);

        poll(&mut pointer, start);
        poll(&mut pointer, start.moved_to(1, 1));
        poll(&mut pointer, start.moved_to(2, 2));
        poll(&mut pointer, start.moved_to(2, 2));

        assert_eq!(
            recorder.take(),
            vec![
                PointerEvent::Moving {
                    state: start.moved_to(1, 1),
                    previous: start,
                },
                PointerEvent::Moving {
                    state: start.moved_to(2, 2),
                    previous: start.moved_to(1, 1),
                },
            ]
        );
        assert_eq!(pointer.current_state_name(), "Stationary");
    }

    #[test]
    fn test_press_while_moving() {
        let (_clock, mut pointer, recorder) = setup(PointerConfig::default());

        poll(&mut pointer, PointerSnapshot::at(5, 5));
        poll(&mut pointer, PointerSnapshot::at(9, 9).pressed(Button::Right));

        assert_eq!(recorder.kinds(), vec!["Moving", "Down"]);
        assert_eq!(pointer.current_state_name(), "RightDown");
    }

    #[test]
    fn test_button_precedence() {
        let (_clock, mut pointer, _recorder) = setup(PointerConfig::default());

        poll(
            &mut pointer,
            PointerSnapshot::at(0, 0)
                .pressed(Button::Middle)
                .pressed(Button::Right),
        );

        assert_eq!(pointer.current_state_name(), "RightDown");
    }

    #[test]
    fn test_disabled_button_is_ignored() {
        let config = PointerConfig::default().with_button_enabled(Button::Left, false);
        let (_clock, mut pointer, recorder) = setup(config);
        let here = PointerSnapshot::at(0, 0);

        poll(&mut pointer, here.pressed(Button::Left));
        assert!(recorder.take().is_empty());
        assert!(pointer.is_neutral());

        poll(&mut pointer, here.pressed(Button::Left).pressed(Button::Middle));
        assert_eq!(pointer.current_state_name(), "MiddleDown");
    }

    #[test]
    fn test_gated_subscription_waits_for_stationary() {
        let config = PointerConfig::default()
            .with_drag_variance(0)
            .with_wait_for_neutral_state(true);
        let (_clock, mut pointer, recorder) = setup(config);
        let origin = PointerSnapshot::at(0, 0).pressed(Button::Left);

        poll(&mut pointer, PointerSnapshot::at(0, 0));
        poll(&mut pointer, origin);
        let late = Rc::new(Recorder::default());
        pointer.subscribe(&late);

        poll(&mut pointer, origin.moved_to(5, 5));
        poll(&mut pointer, PointerSnapshot::at(5, 5));
        assert!(late.take().is_empty());
        assert_eq!(recorder.kinds(), vec!["Down", "Dragging", "Up", "DragDone"]);

        poll(&mut pointer, PointerSnapshot::at(5, 5).with_wheel(1));
        assert_eq!(late.kinds(), vec!["ScrollWheelMove"]);
    }

    #[test]
    fn test_reset() {
        let (clock, mut pointer, recorder) = setup(PointerConfig::default());
        let here = PointerSnapshot::at(7, 7);

        click(&mut pointer, &clock, here);
        poll(&mut pointer, here.pressed(Button::Left));
        recorder.take();
        clock.advance_ms(10);
        pointer.reset();

        assert!(pointer.is_neutral());
        assert_eq!(pointer.update_number(), 0);
        assert_eq!(pointer.now(), Duration::ZERO);
        assert!(recorder.take().is_empty());

        poll(&mut pointer, here);
        poll(&mut pointer, here.pressed(Button::Left));
        assert_eq!(recorder.kinds(), vec!["Down"]);
    }
}
