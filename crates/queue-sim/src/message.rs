//! Core domain identifiers for queued messages.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ulid::Ulid;

// ============================================================================
// Core Domain Identifiers
// ============================================================================

/// Name of a queue within a broker.
///
/// Any non-empty string is accepted, so queue URLs work as names too.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueName(String);

impl QueueName {
    /// Create new queue name with validation
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::required("queue_name"));
        }

        Ok(Self(name))
    }

    /// Get queue name as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Time-sortable unique identifier for messages.
///
/// Backed by a ULID: a 48-bit millisecond timestamp followed by 80 random
/// bits, rendered as 26 Crockford base32 characters. Identifiers minted in
/// different milliseconds sort lexicographically in creation order; those
/// minted within the same millisecond have no defined order between them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generate new time-sortable message ID
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Get message ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creation time encoded in the identifier.
    ///
    /// Returns `None` for identifiers that were not produced by [`MessageId::new`].
    pub fn timestamp(&self) -> Option<Timestamp> {
        let ulid = Ulid::from_string(&self.0).ok()?;
        let millis = i64::try_from(ulid.timestamp_ms()).ok()?;
        DateTime::<Utc>::from_timestamp_millis(millis).map(Timestamp::from_datetime)
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::required("message_id"));
        }

        Ok(Self(s.to_string()))
    }
}

impl From<&ReceiptHandle> for MessageId {
    fn from(handle: &ReceiptHandle) -> Self {
        Self(handle.0.clone())
    }
}

/// Correlation identifier attached to every response envelope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate new request ID
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Get request ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token presented to delete a previously received message.
///
/// Handles carry the message ID verbatim; there is no visibility timeout
/// behind them, so a handle stays valid until the message is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    /// Get handle string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&MessageId> for ReceiptHandle {
    fn from(id: &MessageId) -> Self {
        Self(id.0.clone())
    }
}

impl FromStr for ReceiptHandle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::required("receipt_handle"));
        }

        Ok(Self(s.to_string()))
    }
}

impl std::fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp wrapper for consistent time handling
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create timestamp from DateTime
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get underlying DateTime
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S%.3f UTC"))
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
