//! Identifiers and simple allocators for core entities.

use serde::{Deserialize, Serialize};

/// Handle of a scheduled timer. Only meaningful to the queue that issued it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TimerId(pub u32);

/// Handle returned by [`crate::trackers::Observed::subscribe`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

/// An element observed by a visibility tracker.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Monotonic allocator for timer, subscription and element ids.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_timer: u32,
    next_sub: u32,
    next_element: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_timer(&mut self) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer = self.next_timer.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_subscription(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_sub);
        self.next_sub = self.next_sub.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_element(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element = self.next_element.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_timer(), TimerId(0));
        assert_eq!(alloc.alloc_timer(), TimerId(1));
        assert_eq!(alloc.alloc_subscription(), SubscriptionId(0));
        assert_eq!(alloc.alloc_element(), ElementId(0));
        assert_eq!(alloc.alloc_element(), ElementId(1));
        alloc.reset();
        assert_eq!(alloc.alloc_timer(), TimerId(0));
    }
}
