//! Channel-backed subscribers.
//!
//! Instead of implementing [`KeyHandler`] or [`PointerHandler`], a host can
//! subscribe a forwarder and drain events from the receiving end of a channel
//! whenever it suits it, e.g. on another thread.
//!
//! # Example
//!
//! ```
//! use polled_input::channel::channel;
//! use polled_input::{Key, KeyEvent, KeyInput, KeySnapshot, ManualClock};
//!
//! let mut keys = KeyInput::with_clock(ManualClock::new());
//! let (forwarder, rx) = channel::<KeyEvent>(16);
//! keys.subscribe(&forwarder);
//!
//! keys.poll(&KeySnapshot::from([Key::Q])).unwrap();
//!
//! assert_eq!(rx.try_recv().map(|event| event.kind()), Ok("KeyDown"));
//! ```
//!
//! # Example (Async with Tokio)
//!
//! ```ignore
//! use polled_input::channel::async_channel;
//! use polled_input::PointerEvent;
//!
//! let (forwarder, mut rx) = async_channel::<PointerEvent>(64);
//! pointer.subscribe(&forwarder);
//!
//! while let Some(event) = rx.recv().await {
//!     println!("{}", event.kind());
//! }
//! ```

use crate::event::{KeyEvent, PointerEvent};
use crate::handler::{KeyHandler, PointerHandler};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};

/// Forwards events into a bounded channel.
///
/// Sending never blocks the poll: when the buffer is full the event is
/// dropped and counted.
#[derive(Debug)]
pub struct ChannelHandler<E> {
    sender: SyncSender<E>,
    dropped: Cell<u64>,
}

impl<E> ChannelHandler<E> {
    pub fn new(sender: SyncSender<E>) -> Self {
        Self {
            sender,
            dropped: Cell::new(0),
        }
    }

    /// Events discarded because the channel was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.get()
    }

    fn forward(&self, event: E) {
        if self.sender.try_send(event).is_err() {
            self.dropped.set(self.dropped.get() + 1);
        }
    }
}

impl KeyHandler for ChannelHandler<KeyEvent> {
    fn handle_event(&self, event: &KeyEvent) {
        self.forward(event.clone());
    }
}

impl PointerHandler for ChannelHandler<PointerEvent> {
    fn handle_event(&self, event: &PointerEvent) {
        self.forward(*event);
    }
}

/// Forwards events into an unbounded channel.
#[derive(Debug)]
pub struct UnboundedChannelHandler<E> {
    sender: Sender<E>,
}

impl<E> UnboundedChannelHandler<E> {
    pub fn new(sender: Sender<E>) -> Self {
        Self { sender }
    }
}

impl KeyHandler for UnboundedChannelHandler<KeyEvent> {
    fn handle_event(&self, event: &KeyEvent) {
        let _ = self.sender.send(event.clone());
    }
}

impl PointerHandler for UnboundedChannelHandler<PointerEvent> {
    fn handle_event(&self, event: &PointerEvent) {
        let _ = self.sender.send(*event);
    }
}

/// Create a bounded forwarder and the receiver it feeds.
///
/// The returned `Rc` is what keeps the subscription alive; drop it to stop
/// forwarding.
pub fn channel<E>(capacity: usize) -> (Rc<ChannelHandler<E>>, Receiver<E>) {
    let (sender, receiver) = mpsc::sync_channel(capacity);
    (Rc::new(ChannelHandler::new(sender)), receiver)
}

/// Like [`channel`], but nothing is ever dropped. Mind memory use if the
/// consumer falls behind.
pub fn unbounded_channel<E>() -> (Rc<UnboundedChannelHandler<E>>, Receiver<E>) {
    let (sender, receiver) = mpsc::channel();
    (Rc::new(UnboundedChannelHandler::new(sender)), receiver)
}

#[cfg(feature = "tokio")]
pub use tokio_channel::*;

#[cfg(feature = "tokio")]
mod tokio_channel {
    use super::*;
    use tokio::sync::mpsc as tokio_mpsc;

    /// Forwards events into a tokio channel without blocking the poll.
    #[derive(Debug)]
    pub struct TokioChannelHandler<E> {
        sender: tokio_mpsc::Sender<E>,
        dropped: Cell<u64>,
    }

    impl<E> TokioChannelHandler<E> {
        pub fn new(sender: tokio_mpsc::Sender<E>) -> Self {
            Self {
                sender,
                dropped: Cell::new(0),
            }
        }

        pub fn dropped(&self) -> u64 {
            self.dropped.get()
        }

        fn forward(&self, event: E) {
            if self.sender.try_send(event).is_err() {
                self.dropped.set(self.dropped.get() + 1);
            }
        }
    }

    impl KeyHandler for TokioChannelHandler<KeyEvent> {
        fn handle_event(&self, event: &KeyEvent) {
            self.forward(event.clone());
        }
    }

    impl PointerHandler for TokioChannelHandler<PointerEvent> {
        fn handle_event(&self, event: &PointerEvent) {
            self.forward(*event);
        }
    }

    /// Create a tokio forwarder and its async receiver.
    pub fn async_channel<E>(
        capacity: usize,
    ) -> (Rc<TokioChannelHandler<E>>, tokio_mpsc::Receiver<E>) {
        let (sender, receiver) = tokio_mpsc::channel(capacity);
        (Rc::new(TokioChannelHandler::new(sender)), receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::event::Button;
    use crate::keyboard::KeyInput;
    use crate::keycode::Key;
    use crate::pointer::PointerInput;
    use crate::snapshot::{KeySnapshot, PointerSnapshot};

    #[test]
    fn test_bounded_channel_drops_when_full() {
        let mut keys = KeyInput::with_clock(ManualClock::new());
        let (forwarder, rx) = channel::<KeyEvent>(1);
        keys.subscribe(&forwarder);

        keys.poll(&KeySnapshot::from([Key::A, Key::B])).unwrap();

        assert_eq!(rx.try_iter().count(), 1);
        assert_eq!(forwarder.dropped(), 1);
    }

    #[test]
    fn test_unbounded_channel_forwards_pointer_events() {
        let mut pointer = PointerInput::with_clock(ManualClock::new());
        let (forwarder, rx) = unbounded_channel::<PointerEvent>();
        pointer.subscribe(&forwarder);

        let here = PointerSnapshot::at(1, 1);
        pointer.poll(&here.pressed(Button::Left)).unwrap();
        pointer.poll(&here).unwrap();

        let kinds: Vec<_> = rx.try_iter().map(|event| event.kind()).collect();
        assert_eq!(kinds, vec!["Down", "Up", "Click"]);
    }

    #[test]
    fn test_dropping_forwarder_ends_subscription() {
        let mut keys = KeyInput::with_clock(ManualClock::new());
        let (forwarder, rx) = unbounded_channel::<KeyEvent>();
        keys.subscribe(&forwarder);
        drop(forwarder);

        keys.poll(&KeySnapshot::from([Key::A])).unwrap();

        assert!(rx.try_recv().is_err());
        assert!(keys.subscribers().is_empty());
    }

    #[cfg(feature = "tokio")]
    #[test]
    fn test_tokio_channel_forwards_events() {
        let mut keys = KeyInput::with_clock(ManualClock::new());
        let (forwarder, mut rx) = async_channel::<KeyEvent>(8);
        keys.subscribe(&forwarder);

        keys.poll(&KeySnapshot::from([Key::A])).unwrap();
        keys.poll(&KeySnapshot::empty()).unwrap();

        assert_eq!(rx.try_recv().map(|event| event.kind()), Ok("KeyDown"));
        assert_eq!(rx.try_recv().map(|event| event.kind()), Ok("KeysReleased"));
        assert_eq!(forwarder.dropped(), 0);
    }
}
