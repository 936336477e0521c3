//! Thread-safe FIFO of messages waiting to be sent.
//!
//! # Why does `push` return a bool? (for beginners)
//!
//! The transport sends one datagram at a time.  Something has to notice when
//! a message arrives at an idle queue and start sending; after that, the
//! sender keeps going on its own until the queue is empty again.
//!
//! [`OutboundQueue::push`] reports whether the queue was empty *immediately
//! before* the push.  Exactly one producer sees `true` for each idle-to-busy
//! transition, and that producer is the one that starts the drain.  Everyone
//! else sees `false` and simply leaves their message for the running drain.
//!
//! # The head stays queued while it is in flight
//!
//! The drain reads the head with [`OutboundQueue::front`], sends it, and only
//! then removes it with [`OutboundQueue::advance`].  Because the in-flight
//! message still counts as queued, a `push` that races with the send sees a
//! non-empty queue and does not start a second drain.  `advance` removes the
//! head and samples the next one under a single lock, so there is no window
//! where the queue looks empty to a producer while the drain is deciding
//! whether to continue.
//!
//! # Capacity
//!
//! The queue is unbounded by default.  [`OutboundQueue::bounded`] creates a
//! queue whose [`OutboundQueue::try_push`] refuses messages beyond a fixed
//! number; plain [`OutboundQueue::push`] ignores the bound.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use super::message::Message;

/// Error type for bounded queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue already holds `capacity` messages.
    #[error("outbound queue is full ({capacity} messages pending)")]
    Full { capacity: usize },
}

/// A mutex-guarded FIFO of outbound [`Message`]s.
#[derive(Debug, Default)]
pub struct OutboundQueue {
    inner: Mutex<VecDeque<Message>>,
    capacity: Option<usize>,
}

impl OutboundQueue {
    /// Creates an empty, unbounded queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty queue whose [`try_push`](Self::try_push) accepts at
    /// most `capacity` pending messages.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: Some(capacity),
        }
    }

    /// The configured bound, if any.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Appends `message` to the tail.
    ///
    /// Returns `true` iff the queue was empty immediately before this push.
    pub fn push(&self, message: Message) -> bool {
        let mut queue = self.lock();
        let was_empty = queue.is_empty();
        queue.push_back(message);
        was_empty
    }

    /// Appends `message` unless the queue is at capacity.
    ///
    /// Returns the same "was empty" flag as [`push`](Self::push).
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Full`] when a bound is configured and reached.
    pub fn try_push(&self, message: Message) -> Result<bool, QueueError> {
        let mut queue = self.lock();
        if let Some(capacity) = self.capacity {
            if queue.len() >= capacity {
                return Err(QueueError::Full { capacity });
            }
        }
        let was_empty = queue.is_empty();
        queue.push_back(message);
        Ok(was_empty)
    }

    /// Removes and returns the head.
    ///
    /// Popping an empty queue is a caller error and yields `None`.
    pub fn pop(&self) -> Option<Message> {
        self.lock().pop_front()
    }

    /// Returns a handle to the head without removing it.
    pub fn front(&self) -> Option<Message> {
        self.lock().front().cloned()
    }

    /// Removes the head and returns the new head, as one atomic step.
    ///
    /// Returns `None` when the queue is empty after the removal.  A `None`
    /// here ends the drain, and the next `push` will see an empty queue.
    pub fn advance(&self) -> Option<Message> {
        let mut queue = self.lock();
        queue.pop_front();
        queue.front().cloned()
    }

    /// Snapshot emptiness check.
    pub fn empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Number of pending messages, including one that may be in flight.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Alias of [`empty`](Self::empty) for the usual Rust naming.
    pub fn is_empty(&self) -> bool {
        self.empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Message>> {
        // A panic while holding the lock cannot leave the deque half-updated,
        // so a poisoned lock is still safe to use.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
