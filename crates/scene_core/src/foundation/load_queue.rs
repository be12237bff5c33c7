//! Time-budgeted FIFO pump
//!
//! Collaborating subsystems queue deferred work (texture uploads, model
//! builds) and drain it a little every frame. Processing is cooperative and
//! single-threaded: an item that starts always finishes, and the pump stops
//! taking new items once the budget is spent. At least one item is processed
//! per call so a tiny budget still makes progress.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// FIFO of pending work items
#[derive(Debug)]
pub struct LoadQueue<T> {
    pending: VecDeque<T>,
}

impl<T> Default for LoadQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LoadQueue<T> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    /// Queue an item
    pub fn push(&mut self, item: T) {
        self.pending.push_back(item);
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every queued item
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Process queued items in order until `budget` is spent.
    /// Returns the number of items processed.
    pub fn process<F>(&mut self, budget: Duration, mut f: F) -> usize
    where
        F: FnMut(T),
    {
        let start = Instant::now();
        let mut processed = 0;

        while let Some(item) = self.pending.pop_front() {
            f(item);
            processed += 1;
            if start.elapsed() >= budget {
                break;
            }
        }

        if processed > 0 {
            log::trace!("LoadQueue: processed {} item(s), {} pending", processed, self.pending.len());
        }
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generous_budget_drains_in_order() {
        let mut queue = LoadQueue::new();
        for i in 0..5 {
            queue.push(i);
        }

        let mut seen = Vec::new();
        let processed = queue.process(Duration::from_secs(10), |i| seen.push(i));

        assert_eq!(processed, 5);
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_zero_budget_still_makes_progress() {
        let mut queue = LoadQueue::new();
        queue.push("a");
        queue.push("b");

        let processed = queue.process(Duration::ZERO, |_| {});
        assert_eq!(processed, 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_spent_budget_stops_early() {
        let mut queue = LoadQueue::new();
        for _ in 0..3 {
            queue.push(Duration::from_millis(5));
        }

        let processed = queue.process(Duration::from_millis(1), std::thread::sleep);
        assert_eq!(processed, 1);
        assert_eq!(queue.len(), 2);
    }
}
