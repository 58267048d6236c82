//! Explicit state-change notification.
//!
//! # Responsibility
//! - Fan out domain events to any number of subscribers.
//! - Keep producers independent from the rendering layer.
//!
//! # Invariants
//! - Publishing never blocks and never fails.
//! - Subscribers whose receiver was dropped are pruned on the next publish.

use std::cell::RefCell;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Single-threaded publish/subscribe hub backed by `mpsc` channels.
pub struct EventBus<E: Clone> {
    subscribers: RefCell<Vec<Sender<E>>>,
}

impl<E: Clone> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Registers a new subscriber and returns its receiving end.
    pub fn subscribe(&self) -> Receiver<E> {
        let (tx, rx) = channel();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    /// Delivers `event` to every live subscriber.
    pub fn publish(&self, event: E) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Drains every pending event from `rx` without blocking.
pub fn drain<E>(rx: &Receiver<E>) -> Vec<E> {
    rx.try_iter().collect()
}
