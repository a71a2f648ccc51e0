//! Subscriber bookkeeping shared by both engines.
//!
//! The registry holds non-owning [`Weak`] references: the caller keeps the
//! `Rc` alive for as long as it wants events. Every subscribe/unsubscribe is
//! stamped with the clock and queued. The queue is applied immediately, or,
//! while waiting for the neutral state, only when the owning engine reaches it.
//!
//! When the same subscriber has both an add and a remove queued, the later
//! timestamp wins and a tie resolves to removal.
//!
//! Dispatch iterates a copy of the member list, so a handler may subscribe or
//! unsubscribe anyone (itself included) from inside its own callback. Changes
//! made during a dispatch are visible from the next dispatch on.

use crate::clock::ElapsedTime;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// Whether a queued change adds or removes its subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionKind {
    Add,
    Remove,
}

/// A subscribe or unsubscribe call waiting to be applied.
pub struct PendingSubscription<H: ?Sized> {
    pub subscriber: Weak<H>,
    pub kind: SubscriptionKind,
    /// Clock reading when the call was made.
    pub timestamp: Duration,
}

impl<H: ?Sized> Clone for PendingSubscription<H> {
    fn clone(&self) -> Self {
        Self {
            subscriber: self.subscriber.clone(),
            kind: self.kind,
            timestamp: self.timestamp,
        }
    }
}

impl<H: ?Sized> fmt::Debug for PendingSubscription<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSubscription")
            .field("subscriber", &self.subscriber.as_ptr().cast::<()>())
            .field("kind", &self.kind)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

struct Members<H: ?Sized> {
    effective: Vec<Weak<H>>,
    pending: Vec<PendingSubscription<H>>,
}

/// Ordered, deduplicated set of event sinks for one engine.
pub struct SubscriberRegistry<H: ?Sized> {
    clock: Rc<dyn ElapsedTime>,
    wait_for_neutral: Cell<bool>,
    members: RefCell<Members<H>>,
}

fn same_subscriber<H: ?Sized>(a: &Weak<H>, b: &Weak<H>) -> bool {
    std::ptr::addr_eq(a.as_ptr(), b.as_ptr())
}

impl<H: ?Sized> SubscriberRegistry<H> {
    /// Create an empty registry stamping changes with `clock`.
    pub fn new(clock: Rc<dyn ElapsedTime>) -> Self {
        Self {
            clock,
            wait_for_neutral: Cell::new(false),
            members: RefCell::new(Members {
                effective: Vec::new(),
                pending: Vec::new(),
            }),
        }
    }

    /// Start delivering events to `subscriber`.
    ///
    /// Subscribing a handler that is already a member has no effect.
    pub fn subscribe(&self, subscriber: &Rc<H>) {
        self.enqueue(Rc::downgrade(subscriber), SubscriptionKind::Add);
    }

    /// Stop delivering events to `subscriber`. Unknown subscribers are ignored.
    pub fn unsubscribe(&self, subscriber: &Rc<H>) {
        self.enqueue(Rc::downgrade(subscriber), SubscriptionKind::Remove);
    }

    /// Whether changes are held until the engine reaches its neutral state.
    pub fn wait_for_neutral_state(&self) -> bool {
        self.wait_for_neutral.get()
    }

    /// Hold or release queued changes. Turning the gate off applies anything
    /// already queued.
    pub fn set_wait_for_neutral_state(&self, wait: bool) {
        let was = self.wait_for_neutral.replace(wait);
        if was && !wait {
            self.apply_pending();
        }
    }

    /// Called by the owning engine whenever it sits in its neutral state.
    pub fn reached_neutral_state(&self) {
        self.apply_pending();
    }

    /// Check whether `subscriber` currently receives events.
    pub fn contains(&self, subscriber: &Rc<H>) -> bool {
        let target = Rc::downgrade(subscriber);
        self.members
            .borrow()
            .effective
            .iter()
            .any(|member| same_subscriber(member, &target))
    }

    /// Number of live subscribers currently receiving events.
    pub fn len(&self) -> usize {
        self.members
            .borrow()
            .effective
            .iter()
            .filter(|member| member.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Changes queued but not yet applied.
    pub fn pending(&self) -> Vec<PendingSubscription<H>> {
        self.members.borrow().pending.clone()
    }

    /// Invoke `deliver` on every current subscriber, in subscription order.
    pub fn dispatch(&self, mut deliver: impl FnMut(&H)) {
        let targets = self.members.borrow().effective.clone();
        for target in targets {
            if let Some(subscriber) = target.upgrade() {
                deliver(&subscriber);
            }
        }
    }

    fn enqueue(&self, subscriber: Weak<H>, kind: SubscriptionKind) {
        let timestamp = self.clock.elapsed();
        self.members.borrow_mut().pending.push(PendingSubscription {
            subscriber,
            kind,
            timestamp,
        });

        if !self.wait_for_neutral.get() {
            self.apply_pending();
        }
    }

    fn apply_pending(&self) {
        let mut members = self.members.borrow_mut();
        if members.pending.is_empty() {
            return;
        }

        // Latest add and remove per subscriber, in order of first appearance.
        let mut resolved: Vec<(Weak<H>, Option<Duration>, Option<Duration>)> = Vec::new();
        for change in std::mem::take(&mut members.pending) {
            let index = match resolved
                .iter()
                .position(|(subscriber, _, _)| same_subscriber(subscriber, &change.subscriber))
            {
                Some(index) => index,
                None => {
                    resolved.push((change.subscriber.clone(), None, None));
                    resolved.len() - 1
                }
            };
            let slot = match change.kind {
                SubscriptionKind::Add => &mut resolved[index].1,
                SubscriptionKind::Remove => &mut resolved[index].2,
            };
            *slot = Some(slot.map_or(change.timestamp, |at| at.max(change.timestamp)));
        }

        for (subscriber, added, removed) in resolved {
            let keep = match (added, removed) {
                (Some(added), Some(removed)) => added > removed,
                (Some(_), None) => true,
                (None, _) => false,
            };
            let present = members
                .effective
                .iter()
                .any(|member| same_subscriber(member, &subscriber));

            if keep && !present && subscriber.strong_count() > 0 {
                log::debug!("subscriber added");
                members.effective.push(subscriber);
            } else if !keep && present {
                log::debug!("subscriber removed");
                members
                    .effective
                    .retain(|member| !same_subscriber(member, &subscriber));
            }
        }

        members.effective.retain(|member| member.strong_count() > 0);
    }
}

impl<H: ?Sized> fmt::Debug for SubscriberRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members = self.members.borrow();
        f.debug_struct("SubscriberRegistry")
            .field("subscribers", &members.effective.len())
            .field("pending", &members.pending.len())
            .field("wait_for_neutral", &self.wait_for_neutral.get())
            .finish()
    }
}
