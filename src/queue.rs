//! Unbounded FIFO shared by the worker pool.
//!
//! Tracks pending and in-flight work under one lock so that a drain is only
//! reported when both counts are zero at the same instant.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct QueueState<T> {
    items: VecDeque<T>,
    in_flight: usize,
}

impl<T> QueueState<T> {
    fn is_drained(&self) -> bool {
        self.items.is_empty() && self.in_flight == 0
    }
}

#[derive(Debug)]
pub struct JobQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
    drained: Condvar,
}

impl<T> Default for JobQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> JobQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                in_flight: 0,
            }),
            available: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    // A panic while holding the lock leaves the counters consistent, so the
    // guard is recovered rather than propagated.
    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an item to the tail and wakes one idle taker.
    pub fn submit(&self, item: T) {
        let mut state = self.lock();
        state.items.push_back(item);
        drop(state);
        self.available.notify_one();
    }

    /// Blocks until an item is available, then pops it and marks one unit in flight.
    pub fn take_next(&self) -> T {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                state.in_flight += 1;
                return item;
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Marks one in-flight unit complete.
    pub fn acknowledge(&self) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        let drained = state.is_drained();
        drop(state);
        if drained {
            self.drained.notify_all();
        }
    }

    /// Blocks until there is nothing pending and nothing in flight.
    pub fn await_drain(&self) {
        let mut state = self.lock();
        while !state.is_drained() {
            state = self
                .drained
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn pending(&self) -> usize {
        self.lock().items.len()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    pub fn is_drained(&self) -> bool {
        self.lock().is_drained()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = JobQueue::new();
        queue.submit("a");
        queue.submit("b");
        queue.submit("c");

        assert_eq!(queue.take_next(), "a");
        assert_eq!(queue.take_next(), "b");
        assert_eq!(queue.take_next(), "c");
    }

    #[test]
    fn test_take_marks_in_flight() {
        let queue = JobQueue::new();
        queue.submit(1);
        queue.submit(2);
        assert_eq!(queue.pending(), 2);
        assert_eq!(queue.in_flight(), 0);

        queue.take_next();
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.in_flight(), 1);
        assert!(!queue.is_drained());

        queue.acknowledge();
        assert_eq!(queue.in_flight(), 0);
        assert!(!queue.is_drained());

        queue.take_next();
        queue.acknowledge();
        assert!(queue.is_drained());
    }

    #[test]
    fn test_acknowledge_without_in_flight_does_not_underflow() {
        let queue: JobQueue<u8> = JobQueue::new();
        queue.acknowledge();
        assert_eq!(queue.in_flight(), 0);
        assert!(queue.is_drained());
    }

    #[test]
    fn test_await_drain_returns_immediately_when_empty() {
        let queue: JobQueue<u8> = JobQueue::new();
        queue.await_drain();
        assert!(queue.is_drained());
    }

    #[test]
    fn test_take_next_blocks_until_submit() {
        let queue = Arc::new(JobQueue::new());
        let (tx, rx) = mpsc::channel();

        let taker = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let item = queue.take_next();
                tx.send(item).unwrap();
            })
        };

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        queue.submit(42);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);
        taker.join().unwrap();
    }

    #[test]
    fn test_await_drain_waits_for_in_flight_work() {
        let queue = Arc::new(JobQueue::new());
        queue.submit(7);
        let item = queue.take_next();
        assert_eq!(item, 7);

        let (tx, rx) = mpsc::channel();
        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                queue.await_drain();
                tx.send(()).unwrap();
            })
        };

        // Pending is zero but one unit is still in flight.
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        queue.acknowledge();
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        waiter.join().unwrap();
    }

    #[test]
    fn test_concurrent_takers_receive_each_item_once() {
        let queue = Arc::new(JobQueue::new());
        for i in 0..200 {
            queue.submit(Some(i));
        }
        for _ in 0..4 {
            queue.submit(None);
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let mut seen = Vec::new();
                    while let Some(i) = queue.take_next() {
                        seen.push(i);
                        queue.acknowledge();
                    }
                    queue.acknowledge();
                    seen
                })
            })
            .collect();

        let mut all: Vec<i32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..200).collect::<Vec<_>>());
        assert!(queue.is_drained());
    }
}
