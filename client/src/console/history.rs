//! Bounded history of displayed lines.

use std::collections::VecDeque;

/// Fixed-capacity ring buffer. Pushing into a full buffer hands back the
/// oldest item so the caller can tear down whatever displays it.
pub struct History<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> History<T> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_when_full() {
        let mut h = History::new(3);
        assert_eq!(h.push("a"), None);
        assert_eq!(h.push("b"), None);
        assert_eq!(h.push("c"), None);
        assert_eq!(h.push("d"), Some("a"));
        assert_eq!(h.push("e"), Some("b"));
        assert_eq!(h.len(), 3);
        assert_eq!(h.iter().copied().collect::<Vec<_>>(), vec!["c", "d", "e"]);
    }

    #[test]
    fn zero_capacity_keeps_latest() {
        let mut h = History::new(0);
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.push(1), None);
        assert_eq!(h.push(2), Some(1));
        assert_eq!(h.iter().copied().collect::<Vec<_>>(), vec![2]);
    }
}
