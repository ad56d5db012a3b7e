//! Single-threaded multi-subscriber value streams.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(T)>;

struct Channel<T> {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(u64, Callback<T>)>>,
    latest: Cell<Option<T>>,
    replay: bool,
    distinct: bool,
}

impl<T: Copy> Channel<T> {
    fn remove(&self, id: u64) {
        self.subscribers.borrow_mut().retain(|(sub_id, _)| *sub_id != id);
    }
}

/// Fan-out of `Copy` values to registered callbacks.
///
/// A `distinct` broadcast drops a value equal to the previous one; a
/// `replay` broadcast hands the latest value to every new subscriber.
pub struct Broadcast<T> {
    channel: Rc<Channel<T>>,
}

impl<T: Copy + PartialEq + 'static> Broadcast<T> {
    /// Distinct and replaying, seeded with `initial`.
    pub fn stateful(initial: T) -> Self {
        Self::build(Some(initial), true, true)
    }

    /// Forwards every value; new subscribers only see later values.
    pub fn plain() -> Self {
        Self::build(None, false, false)
    }

    fn build(latest: Option<T>, replay: bool, distinct: bool) -> Self {
        Self {
            channel: Rc::new(Channel {
                next_id: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
                latest: Cell::new(latest),
                replay,
                distinct,
            }),
        }
    }

    pub fn latest(&self) -> Option<T> {
        self.channel.latest.get()
    }

    pub fn subscriber_count(&self) -> usize {
        self.channel.subscribers.borrow().len()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(T) + 'static,
    {
        let id = self.channel.next_id.get();
        self.channel.next_id.set(id + 1);
        let callback: Callback<T> = Rc::new(callback);
        self.channel
            .subscribers
            .borrow_mut()
            .push((id, Rc::clone(&callback)));

        if self.channel.replay {
            if let Some(value) = self.channel.latest.get() {
                callback(value);
            }
        }

        let channel: Weak<Channel<T>> = Rc::downgrade(&self.channel);
        Subscription::new(move || {
            if let Some(channel) = channel.upgrade() {
                channel.remove(id);
            }
        })
    }

    /// Delivers `value`; returns `false` when a distinct broadcast dropped it.
    pub fn publish(&self, value: T) -> bool {
        let previous = self.channel.latest.replace(Some(value));
        if self.channel.distinct && previous == Some(value) {
            return false;
        }

        // Callbacks may subscribe or unsubscribe while being notified.
        let subscribers: Vec<Callback<T>> = self
            .channel
            .subscribers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in subscribers {
            callback(value);
        }
        true
    }

    /// Drops every subscriber.
    pub fn clear(&self) {
        self.channel.subscribers.borrow_mut().clear();
    }
}

impl<T> fmt::Debug for Broadcast<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcast")
            .field("subscribers", &self.channel.subscribers.borrow().len())
            .field("replay", &self.channel.replay)
            .field("distinct", &self.channel.distinct)
            .finish_non_exhaustive()
    }
}

/// Keeps a callback registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}
