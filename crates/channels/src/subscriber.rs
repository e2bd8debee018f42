//! Live subscriber mailboxes
//!
//! Each live consumer of a channel gets its own bounded mailbox. Delivery is
//! a non-blocking `try_send`: when a mailbox is full the record is dropped
//! for that subscriber only, so a slow consumer can never stall ingestion or
//! its siblings.
//!
//! - `Subscriber` is the sending half kept inside the channel
//! - `Subscription` is the receiving half handed to the caller
//! - `SubscriberSet` handles registration, removal, and fan-out
//!
//! Removing a subscriber drops its only sender, which closes the mailbox:
//! the consumer drains whatever is buffered and then sees end-of-stream.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};

use crate::line::Line;

/// Counter for generating unique subscriber IDs
static SUBSCRIBER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Default mailbox depth per subscriber
pub const DEFAULT_MAILBOX_DEPTH: usize = 10;

/// Outcome of a single mailbox delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Record queued
    Sent,
    /// Mailbox full, record dropped for this subscriber
    Full,
    /// Receiver gone, record dropped
    Closed,
}

/// Sending half of a live subscription
#[derive(Debug)]
pub struct Subscriber {
    /// Unique identifier
    id: u64,
    /// Mailbox sender (the only one)
    sender: mpsc::Sender<Line>,
}

impl Subscriber {
    /// Create a subscriber and its receiving half
    ///
    /// Depth is clamped to at least 1.
    pub fn new(depth: usize) -> (Self, Subscription) {
        let id = SUBSCRIBER_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(depth.max(1));

        (Self { id, sender }, Subscription { id, receiver })
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Try to queue a copy of the record without waiting
    #[inline]
    pub fn try_deliver(&self, line: &Line) -> Delivery {
        match self.sender.try_send(line.clone()) {
            Ok(()) => Delivery::Sent,
            Err(TrySendError::Full(_)) => Delivery::Full,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Receiving half of a live subscription
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    receiver: mpsc::Receiver<Line>,
}

impl Subscription {
    /// ID to pass back to `Channel::unsubscribe`
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next record
    ///
    /// Returns `None` once the subscription has been closed and drained.
    pub async fn recv(&mut self) -> Option<Line> {
        self.receiver.recv().await
    }

    /// Take the next record if one is buffered
    pub fn try_recv(&mut self) -> Result<Line, TryRecvError> {
        self.receiver.try_recv()
    }
}

/// Counts from one fan-out
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Broadcast {
    pub sent: usize,
    /// Mailbox was full
    pub dropped: usize,
    /// Receiver was gone; the subscriber has been removed
    pub closed: usize,
}

/// All live subscribers of one channel
///
/// Not synchronized on its own; the owning channel's lock covers it.
#[derive(Debug, Default)]
pub struct SubscriberSet {
    subscribers: Vec<Subscriber>,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new mailbox with the given depth
    pub fn subscribe(&mut self, depth: usize) -> Subscription {
        let (subscriber, subscription) = Subscriber::new(depth);
        self.subscribers.push(subscriber);
        subscription
    }

    /// Remove and close a mailbox
    ///
    /// Returns false if no subscriber has this ID.
    pub fn unsubscribe(&mut self, id: u64) -> bool {
        let original_len = self.subscribers.len();
        self.subscribers.retain(|s| s.id() != id);
        self.subscribers.len() != original_len
    }

    /// Remove and close every mailbox, returning how many were closed
    pub fn close_all(&mut self) -> usize {
        let closed = self.subscribers.len();
        self.subscribers.clear();
        closed
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Offer a record to every subscriber, dropping on full
    ///
    /// Subscribers whose receiving half was dropped without an
    /// `unsubscribe` are removed here.
    pub fn broadcast(&mut self, line: &Line) -> Broadcast {
        let mut outcome = Broadcast::default();

        self.subscribers.retain(|subscriber| match subscriber.try_deliver(line) {
            Delivery::Sent => {
                outcome.sent += 1;
                true
            }
            Delivery::Full => {
                outcome.dropped += 1;
                true
            }
            Delivery::Closed => {
                outcome.closed += 1;
                false
            }
        });

        outcome
    }
}

#[cfg(test)]
#[path = "subscriber_test.rs"]
mod tests;
