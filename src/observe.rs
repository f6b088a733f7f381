//! Publish-on-change cells.
//!
//! An [`Observable`] owns a value and a list of subscribers that are called
//! after the value is replaced or mutated. Everything here is single-threaded:
//! mutation takes `&mut self` and subscribers run synchronously, to completion,
//! before the mutating call returns.

use std::fmt;

type Callback<E> = Box<dyn FnMut(&E)>;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

/// An id-keyed list of callbacks.
pub struct Subscribers<E> {
    next_id: usize,
    entries: Vec<(SubscriptionId, Callback<E>)>,
}

impl<E> Subscribers<E> {
    pub fn new() -> Self {
        Self { next_id: 0, entries: Vec::new() }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&E) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscriber. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    /// Call every subscriber in subscription order.
    pub fn notify(&mut self, event: &E) {
        for (_, callback) in self.entries.iter_mut() {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers").field("len", &self.entries.len()).finish()
    }
}

/// A value that notifies subscribers when it changes.
pub struct Observable<T> {
    value: T,
    subscribers: Subscribers<T>,
}

impl<T> Observable<T> {
    pub fn new(initial: T) -> Self {
        Self { value: initial, subscribers: Subscribers::new() }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Mutate in place. Always publishes, even if `f` left the value as it was.
    pub fn update(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.value);
        self.subscribers.notify(&self.value);
    }

    /// Replace the value without comparing. Always publishes.
    pub fn replace(&mut self, new_value: T) -> T {
        let old = std::mem::replace(&mut self.value, new_value);
        self.subscribers.notify(&self.value);
        old
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

impl<T: PartialEq> Observable<T> {
    /// Store `new_value` and publish, unless it equals the current value.
    /// Returns whether the value changed.
    pub fn set(&mut self, new_value: T) -> bool {
        if self.value == new_value {
            return false;
        }
        self.value = new_value;
        self.subscribers.notify(&self.value);
        true
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
