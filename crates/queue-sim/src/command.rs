//! Request, response and command types for broker operations.
//!
//! Requests carry raw strings so that a missing field reaches the broker as an
//! empty value and is reported as a [`ValidationError`](crate::ValidationError)
//! rather than a decoding failure. All types use camelCase field names when
//! serialized.

use crate::checksum::BodyChecksum;
use crate::error::BrokerError;
use crate::message::{MessageId, ReceiptHandle, RequestId};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Response Envelope
// ============================================================================

/// Metadata attached to every response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub request_id: RequestId,
}

impl ResponseMetadata {
    /// Create metadata with a fresh request ID
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
        }
    }
}

impl Default for ResponseMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// Envelope wrapping the output of a single operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    pub metadata: ResponseMetadata,
    pub output: T,
}

impl<T> Response<T> {
    /// Wrap an output with freshly generated metadata
    pub fn new(output: T) -> Self {
        Self {
            metadata: ResponseMetadata::new(),
            output,
        }
    }

    /// Transform the output, keeping the metadata
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            metadata: self.metadata,
            output: f(self.output),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Decode an explicit `null` the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendMessageRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub queue_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
}

impl SendMessageRequest {
    pub fn new(queue_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            body: body.into(),
        }
    }
}

/// One message of a batch send, identified by a caller-chosen ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendMessageBatchEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub body: String,
}

impl SendMessageBatchEntry {
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendMessageBatchRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub queue_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub entries: Vec<SendMessageBatchEntry>,
}

impl SendMessageBatchRequest {
    pub fn new(queue_name: impl Into<String>, entries: Vec<SendMessageBatchEntry>) -> Self {
        Self {
            queue_name: queue_name.into(),
            entries,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiveMessageRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub queue_name: String,
    /// Requested batch size; clamped by the broker, absent means one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_count: Option<i64>,
}

impl ReceiveMessageRequest {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            max_count: None,
        }
    }

    /// Request up to `max_count` messages
    pub fn with_max_count(mut self, max_count: i64) -> Self {
        self.max_count = Some(max_count);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteMessageRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub queue_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub receipt_handle: String,
}

impl DeleteMessageRequest {
    pub fn new(queue_name: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            receipt_handle: receipt_handle.into(),
        }
    }
}

/// One deletion of a batch delete, identified by a caller-chosen ID
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteMessageBatchEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub receipt_handle: String,
}

impl DeleteMessageBatchEntry {
    pub fn new(id: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            receipt_handle: receipt_handle.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteMessageBatchRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub queue_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub entries: Vec<DeleteMessageBatchEntry>,
}

impl DeleteMessageBatchRequest {
    pub fn new(queue_name: impl Into<String>, entries: Vec<DeleteMessageBatchEntry>) -> Self {
        Self {
            queue_name: queue_name.into(),
            entries,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurgeQueueRequest {
    #[serde(deserialize_with = "null_as_default")]
    pub queue_name: String,
}

impl PurgeQueueRequest {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
        }
    }
}

// ============================================================================
// Outputs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageOutput {
    pub message_id: MessageId,
    pub body_checksum: BodyChecksum,
}

/// A batch send entry that was stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBatchResultEntry {
    pub id: String,
    pub message_id: MessageId,
    pub body_checksum: BodyChecksum,
}

/// A batch entry that was rejected; its siblings are unaffected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResultError {
    pub id: String,
    pub code: String,
    pub message: String,
    /// Whether the caller caused the failure
    pub sender_fault: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBatchOutput {
    pub successful: Vec<SendMessageBatchResultEntry>,
    pub failed: Vec<BatchResultError>,
}

/// A message handed out by a receive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    pub message_id: MessageId,
    pub receipt_handle: ReceiptHandle,
    pub body_checksum: BodyChecksum,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveMessageOutput {
    /// `None` when no messages were available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<ReceivedMessage>>,
}

impl ReceiveMessageOutput {
    /// Received messages, empty when none were available
    pub fn messages(&self) -> &[ReceivedMessage] {
        self.messages.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteMessageOutput {}

/// A batch delete entry that was applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageBatchResultEntry {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMessageBatchOutput {
    pub successful: Vec<DeleteMessageBatchResultEntry>,
    pub failed: Vec<BatchResultError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeQueueOutput {}

// ============================================================================
// Commands
// ============================================================================

/// Every operation the broker can dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Command {
    SendMessage(SendMessageRequest),
    SendMessageBatch(SendMessageBatchRequest),
    ReceiveMessage(ReceiveMessageRequest),
    DeleteMessage(DeleteMessageRequest),
    DeleteMessageBatch(DeleteMessageBatchRequest),
    PurgeQueue(PurgeQueueRequest),
}

impl Command {
    /// Tags accepted in the `action` field
    pub const ACTIONS: [&'static str; 6] = [
        "SendMessage",
        "SendMessageBatch",
        "ReceiveMessage",
        "DeleteMessage",
        "DeleteMessageBatch",
        "PurgeQueue",
    ];

    /// Tag identifying this command
    pub fn action(&self) -> &'static str {
        match self {
            Self::SendMessage(_) => "SendMessage",
            Self::SendMessageBatch(_) => "SendMessageBatch",
            Self::ReceiveMessage(_) => "ReceiveMessage",
            Self::DeleteMessage(_) => "DeleteMessage",
            Self::DeleteMessageBatch(_) => "DeleteMessageBatch",
            Self::PurgeQueue(_) => "PurgeQueue",
        }
    }

    /// Name of the queue the command targets (possibly empty)
    pub fn queue_name(&self) -> &str {
        match self {
            Self::SendMessage(r) => &r.queue_name,
            Self::SendMessageBatch(r) => &r.queue_name,
            Self::ReceiveMessage(r) => &r.queue_name,
            Self::DeleteMessage(r) => &r.queue_name,
            Self::DeleteMessageBatch(r) => &r.queue_name,
            Self::PurgeQueue(r) => &r.queue_name,
        }
    }

    /// Decode a command from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::UnsupportedOperation`] when the `action` tag is
    /// missing or unknown, and [`BrokerError::Serialization`] when the input is
    /// not a JSON object of the expected shape.
    pub fn from_json(input: &str) -> Result<Self, BrokerError> {
        let value: serde_json::Value = serde_json::from_str(input)?;

        let action = match value.get("action") {
            Some(serde_json::Value::String(action)) => action.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        if !Self::ACTIONS.contains(&action.as_str()) {
            return Err(BrokerError::UnsupportedOperation { action });
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// Output of a dispatched [`Command`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum CommandOutput {
    SendMessage(SendMessageOutput),
    SendMessageBatch(SendMessageBatchOutput),
    ReceiveMessage(ReceiveMessageOutput),
    DeleteMessage(DeleteMessageOutput),
    DeleteMessageBatch(DeleteMessageBatchOutput),
    PurgeQueue(PurgeQueueOutput),
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
