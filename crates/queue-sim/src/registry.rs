//! Registry of named queues owned by a broker.
//!
//! Each queue sits behind its own mutex so that operations on one queue are
//! applied atomically with respect to each other, while different queues only
//! share the short map lookup.

use crate::config::CapacityPolicy;
use crate::error::BrokerError;
use crate::message::QueueName;
use crate::queue::MessageQueue;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Handle to a single queue shared between the registry and its callers
pub type SharedQueue = Arc<Mutex<MessageQueue<String>>>;

/// Maps queue names to lazily created queues
pub struct QueueRegistry {
    queues: RwLock<HashMap<QueueName, SharedQueue>>,
    capacity: CapacityPolicy,
}

impl QueueRegistry {
    /// Create an empty registry with the given growth policy
    pub fn new(capacity: CapacityPolicy) -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Resolve a queue, creating it on first reference.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::CapacityExceeded`] when the queue does not exist
    /// yet and a bounded registry is already full.
    pub async fn get_or_create(&self, name: &QueueName) -> Result<SharedQueue, BrokerError> {
        if let Some(queue) = self.queues.read().await.get(name) {
            return Ok(Arc::clone(queue));
        }

        let mut queues = self.queues.write().await;

        // Another task may have created it between the two locks
        if let Some(queue) = queues.get(name) {
            return Ok(Arc::clone(queue));
        }

        if let CapacityPolicy::Bounded { max_queues } = self.capacity {
            if queues.len() >= max_queues {
                warn!(queue = %name, max_queues, "Queue registry is full; refusing to create queue");
                return Err(BrokerError::CapacityExceeded { max_queues });
            }
        }

        let queue: SharedQueue = Arc::new(Mutex::new(MessageQueue::new()));
        queues.insert(name.clone(), Arc::clone(&queue));
        info!(queue = %name, total = queues.len(), "Created queue");

        Ok(queue)
    }

    /// Look up an existing queue without creating it
    pub async fn get(&self, name: &QueueName) -> Option<SharedQueue> {
        self.queues.read().await.get(name).cloned()
    }

    /// Drop a queue and its messages; returns whether it existed.
    ///
    /// Callers still holding a [`SharedQueue`] keep a detached copy; the next
    /// reference by name creates a fresh, empty queue.
    pub async fn remove(&self, name: &QueueName) -> bool {
        let removed = self.queues.write().await.remove(name).is_some();
        if removed {
            info!(queue = %name, "Removed queue");
        }
        removed
    }

    /// Names of all registered queues in sorted order
    pub async fn names(&self) -> Vec<QueueName> {
        let mut names: Vec<QueueName> = self.queues.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        self.queues.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queues.read().await.is_empty()
    }

    /// Growth policy this registry enforces
    pub fn capacity(&self) -> CapacityPolicy {
        self.capacity
    }
}

impl Default for QueueRegistry {
    fn default() -> Self {
        Self::new(CapacityPolicy::Unbounded)
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
