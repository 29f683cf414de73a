//! Input trackers: scroll, pointer and one-shot visibility.
//!
//! Scroll and pointer state are process-wide observed values: any component
//! may read the latest snapshot or subscribe, only the owning tracker writes.

pub mod pointer;
pub mod scroll;
pub mod visibility;

use crate::ids::{IdAllocator, SubscriptionId};

type Listener<T> = Box<dyn FnMut(&T)>;

/// Latest value plus listeners notified on every publish.
pub struct Observed<T> {
    value: T,
    ids: IdAllocator,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observed<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observed")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T: Clone> Observed<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            ids: IdAllocator::new(),
            listeners: Vec::new(),
        }
    }

    /// Copy of the latest published value.
    #[inline]
    pub fn snapshot(&self) -> T {
        self.value.clone()
    }

    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = self.ids.alloc_subscription();
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already released.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        before != self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Release every listener (owner teardown).
    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    pub(crate) fn publish(&mut self, value: T) {
        self.value = value;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut obs = Observed::new(0u32);
        let s = Rc::clone(&seen);
        let id = obs.subscribe(move |v| s.borrow_mut().push(*v));
        obs.publish(1);
        assert!(obs.unsubscribe(id));
        assert!(!obs.unsubscribe(id));
        obs.publish(2);
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(obs.snapshot(), 2);
        assert_eq!(obs.listener_count(), 0);
    }
}
