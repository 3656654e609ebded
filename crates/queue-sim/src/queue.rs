//! Ordered in-memory message store for a single queue.
//!
//! [`MessageQueue`] keeps pending messages keyed by their [`MessageId`]. Since
//! identifiers sort by creation time, iterating the map in key order yields
//! messages in arrival order (up to ties within one millisecond).
//!
//! Receiving is a non-destructive peek: a message stays in the queue until it
//! is explicitly deleted, so repeated receives without a delete return the
//! same messages again. Callers that want exclusive consumption must delete
//! right after processing.

use crate::message::MessageId;
use std::collections::BTreeMap;

/// A message together with the identifier it was stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry<T> {
    pub message_id: MessageId,
    pub message: T,
}

/// Ordered map of pending messages for one queue
#[derive(Debug, Clone)]
pub struct MessageQueue<T> {
    entries: BTreeMap<MessageId, T>,
}

impl<T: Clone> MessageQueue<T> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Store a message under a freshly generated identifier
    pub fn add(&mut self, message: T) -> QueueEntry<T> {
        let message_id = MessageId::new();
        self.entries.insert(message_id.clone(), message.clone());

        QueueEntry {
            message_id,
            message,
        }
    }

    /// Return up to `count` messages with the smallest identifiers.
    ///
    /// Nothing is removed. An empty queue or a zero count yields an empty vector.
    pub fn receive(&self, count: usize) -> Vec<QueueEntry<T>> {
        self.entries
            .iter()
            .take(count)
            .map(|(message_id, message)| QueueEntry {
                message_id: message_id.clone(),
                message: message.clone(),
            })
            .collect()
    }

    /// Remove a message; returns whether it was present.
    ///
    /// Deleting an unknown or already-deleted identifier is a no-op.
    pub fn delete(&mut self, message_id: &MessageId) -> bool {
        self.entries.remove(message_id).is_some()
    }

    /// Remove every message, leaving the queue usable
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> Default for MessageQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
