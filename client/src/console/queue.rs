//! Event queue shared between browser callbacks and the console.
//!
//! Callbacks only get a shared reference, so the queue wraps its storage in a
//! `RefCell`. Events are drained one at a time so a handler may push more
//! events while the pump is running.

use std::cell::RefCell;
use std::collections::VecDeque;

pub struct EventQueue<T> {
    inner: RefCell<VecDeque<T>>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(VecDeque::new()),
        }
    }

    /// Push an event to the back of the queue.
    pub fn push(&self, event: T) {
        self.inner.borrow_mut().push_back(event);
    }

    /// Take the oldest event. The borrow is released before returning.
    pub fn pop(&self) -> Option<T> {
        self.inner.borrow_mut().pop_front()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_push_order() {
        let q = EventQueue::new();
        q.push(1);
        q.push(2);
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some(1));
        q.push(3);
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(3));
        assert!(q.is_empty());
        assert_eq!(q.pop(), None);
    }
}
