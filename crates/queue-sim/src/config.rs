//! Broker configuration.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Largest number of messages a single receive may return
pub const DEFAULT_MAX_RECEIVE_COUNT: u32 = 10;

/// Largest number of entries accepted in one batch request
pub const DEFAULT_MAX_BATCH_ENTRIES: usize = 10;

/// Largest accepted message body, in bytes (256 KiB)
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 256 * 1024;

/// Limits applied by the in-memory broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Upper bound receive counts are clamped to
    pub max_receive_count: u32,
    /// Maximum entries per batch request
    pub max_batch_entries: usize,
    /// Maximum body size in bytes
    pub max_message_bytes: usize,
    /// How many named queues the registry may hold
    pub capacity: CapacityPolicy,
}

impl BrokerConfig {
    /// Reject limits that would make every request fail
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_receive_count == 0 {
            return Err(ValidationError::OutOfRange {
                field: "max_receive_count".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.max_batch_entries == 0 {
            return Err(ValidationError::OutOfRange {
                field: "max_batch_entries".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.max_message_bytes == 0 {
            return Err(ValidationError::OutOfRange {
                field: "max_message_bytes".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if let CapacityPolicy::Bounded { max_queues: 0 } = self.capacity {
            return Err(ValidationError::OutOfRange {
                field: "capacity.max_queues".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            max_receive_count: DEFAULT_MAX_RECEIVE_COUNT,
            max_batch_entries: DEFAULT_MAX_BATCH_ENTRIES,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            capacity: CapacityPolicy::default(),
        }
    }
}

/// Growth policy for the queue registry.
///
/// Queues are created on first reference. `Bounded` refuses to create a new
/// queue once `max_queues` exist; queues that already exist stay reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CapacityPolicy {
    #[default]
    Unbounded,
    Bounded { max_queues: usize },
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
