//! Broker trait and its in-memory implementation.
//!
//! [`QueueService`] is the request/response surface callers program against.
//! [`InMemoryBroker`] implements it on top of a [`QueueRegistry`]:
//!
//! - Queues are created on first reference and never reported as missing
//! - Every request is validated before any queue is resolved or mutated
//! - Batch requests report each entry as successful or failed on its own
//! - Receipt handles are the message IDs; there is no visibility timeout, so
//!   a message stays visible until it is deleted

use crate::checksum::BodyChecksum;
use crate::command::{
    BatchResultError, Command, CommandOutput, DeleteMessageBatchOutput, DeleteMessageBatchRequest,
    DeleteMessageBatchResultEntry, DeleteMessageOutput, DeleteMessageRequest, PurgeQueueOutput,
    PurgeQueueRequest, ReceiveMessageOutput, ReceiveMessageRequest, ReceivedMessage, Response,
    SendMessageBatchOutput, SendMessageBatchRequest, SendMessageBatchResultEntry,
    SendMessageOutput, SendMessageRequest,
};
use crate::config::BrokerConfig;
use crate::error::{BrokerError, ValidationError};
use crate::message::{MessageId, QueueName, ReceiptHandle};
use crate::registry::QueueRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Request/response interface of a queue broker
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Store one message
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<Response<SendMessageOutput>, BrokerError>;

    /// Store several messages, reporting each entry separately
    async fn send_message_batch(
        &self,
        request: SendMessageBatchRequest,
    ) -> Result<Response<SendMessageBatchOutput>, BrokerError>;

    /// Return the oldest messages without removing them
    async fn receive_message(
        &self,
        request: ReceiveMessageRequest,
    ) -> Result<Response<ReceiveMessageOutput>, BrokerError>;

    /// Delete one message by receipt handle
    async fn delete_message(
        &self,
        request: DeleteMessageRequest,
    ) -> Result<Response<DeleteMessageOutput>, BrokerError>;

    /// Delete several messages, reporting each entry separately
    async fn delete_message_batch(
        &self,
        request: DeleteMessageBatchRequest,
    ) -> Result<Response<DeleteMessageBatchOutput>, BrokerError>;

    /// Remove every message from a queue
    async fn purge_queue(
        &self,
        request: PurgeQueueRequest,
    ) -> Result<Response<PurgeQueueOutput>, BrokerError>;

    /// Route a command to the matching operation
    async fn dispatch(&self, command: Command) -> Result<Response<CommandOutput>, BrokerError> {
        match command {
            Command::SendMessage(request) => Ok(self
                .send_message(request)
                .await?
                .map(CommandOutput::SendMessage)),
            Command::SendMessageBatch(request) => Ok(self
                .send_message_batch(request)
                .await?
                .map(CommandOutput::SendMessageBatch)),
            Command::ReceiveMessage(request) => Ok(self
                .receive_message(request)
                .await?
                .map(CommandOutput::ReceiveMessage)),
            Command::DeleteMessage(request) => Ok(self
                .delete_message(request)
                .await?
                .map(CommandOutput::DeleteMessage)),
            Command::DeleteMessageBatch(request) => Ok(self
                .delete_message_batch(request)
                .await?
                .map(CommandOutput::DeleteMessageBatch)),
            Command::PurgeQueue(request) => Ok(self
                .purge_queue(request)
                .await?
                .map(CommandOutput::PurgeQueue)),
        }
    }
}

// ============================================================================
// InMemoryBroker
// ============================================================================

/// Broker keeping all queues in process memory.
///
/// Cloning is cheap; clones share the same queues.
#[derive(Clone)]
pub struct InMemoryBroker {
    registry: Arc<QueueRegistry>,
    config: BrokerConfig,
}

impl InMemoryBroker {
    /// Create new broker with configuration
    pub fn new(config: BrokerConfig) -> Self {
        Self {
            registry: Arc::new(QueueRegistry::new(config.capacity)),
            config,
        }
    }

    /// Configuration this broker enforces
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Names of all queues referenced so far
    pub async fn list_queues(&self) -> Vec<QueueName> {
        self.registry.names().await
    }

    /// Drop a queue together with its messages; returns whether it existed
    pub async fn delete_queue(&self, queue: &QueueName) -> bool {
        self.registry.remove(queue).await
    }

    /// Number of messages currently stored in a queue.
    ///
    /// Unknown queues count as empty and are not created.
    pub async fn approximate_message_count(&self, queue: &QueueName) -> usize {
        match self.registry.get(queue).await {
            Some(queue) => queue.lock().await.len(),
            None => 0,
        }
    }

    /// Clamp a requested receive count into `[1, max_receive_count]`
    fn receive_count(&self, requested: Option<i64>) -> usize {
        let max = i64::from(self.config.max_receive_count.max(1));
        let count = requested.unwrap_or(1).clamp(1, max);
        usize::try_from(count).unwrap_or(1)
    }

    fn validate_body(&self, body: &str) -> Result<(), ValidationError> {
        if body.is_empty() {
            return Err(ValidationError::required("body"));
        }

        if body.len() > self.config.max_message_bytes {
            return Err(ValidationError::OutOfRange {
                field: "body".to_string(),
                message: format!(
                    "{} bytes exceeds maximum of {} bytes",
                    body.len(),
                    self.config.max_message_bytes
                ),
            });
        }

        Ok(())
    }

    fn validate_batch_size(&self, size: usize) -> Result<(), BrokerError> {
        if size == 0 {
            return Err(ValidationError::required("entries").into());
        }

        if size > self.config.max_batch_entries {
            return Err(BrokerError::BatchTooLarge {
                size,
                max_size: self.config.max_batch_entries,
            });
        }

        Ok(())
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new(BrokerConfig::default())
    }
}

impl std::fmt::Debug for InMemoryBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBroker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn entry_error(id: &str, error: &ValidationError) -> BatchResultError {
    BatchResultError {
        id: id.to_string(),
        code: error.code().to_string(),
        message: error.to_string(),
        sender_fault: true,
    }
}

fn log_rejection<T>(operation: &str, result: Result<T, BrokerError>) -> Result<T, BrokerError> {
    if let Err(ref e) = result {
        warn!(operation, code = e.code(), error = %e, "Rejected request");
    }
    result
}

#[async_trait]
impl QueueService for InMemoryBroker {
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<Response<SendMessageOutput>, BrokerError> {
        let validated = QueueName::new(request.queue_name)
            .and_then(|queue| self.validate_body(&request.body).map(|()| queue));
        let queue_name = log_rejection("SendMessage", validated.map_err(BrokerError::from))?;

        let queue = self.registry.get_or_create(&queue_name).await?;
        let body_checksum = BodyChecksum::compute(&request.body);
        let entry = queue.lock().await.add(request.body);

        debug!(queue = %queue_name, message_id = %entry.message_id, "Sent message");

        Ok(Response::new(SendMessageOutput {
            message_id: entry.message_id,
            body_checksum,
        }))
    }

    async fn send_message_batch(
        &self,
        request: SendMessageBatchRequest,
    ) -> Result<Response<SendMessageBatchOutput>, BrokerError> {
        let validated = QueueName::new(request.queue_name)
            .map_err(BrokerError::from)
            .and_then(|queue| self.validate_batch_size(request.entries.len()).map(|()| queue));
        let queue_name = log_rejection("SendMessageBatch", validated)?;

        let queue = self.registry.get_or_create(&queue_name).await?;
        let mut output = SendMessageBatchOutput::default();

        // One lock for the whole batch keeps its entries contiguous
        let mut guard = queue.lock().await;
        for entry in request.entries {
            let checked = if entry.id.is_empty() {
                Err(ValidationError::required("id"))
            } else {
                self.validate_body(&entry.body)
            };

            match checked {
                Ok(()) => {
                    let body_checksum = BodyChecksum::compute(&entry.body);
                    let stored = guard.add(entry.body);
                    output.successful.push(SendMessageBatchResultEntry {
                        id: entry.id,
                        message_id: stored.message_id,
                        body_checksum,
                    });
                }
                Err(e) => output.failed.push(entry_error(&entry.id, &e)),
            }
        }
        drop(guard);

        debug!(
            queue = %queue_name,
            successful = output.successful.len(),
            failed = output.failed.len(),
            "Sent message batch"
        );

        Ok(Response::new(output))
    }

    async fn receive_message(
        &self,
        request: ReceiveMessageRequest,
    ) -> Result<Response<ReceiveMessageOutput>, BrokerError> {
        let queue_name = log_rejection(
            "ReceiveMessage",
            QueueName::new(request.queue_name).map_err(BrokerError::from),
        )?;
        let count = self.receive_count(request.max_count);

        let queue = self.registry.get_or_create(&queue_name).await?;
        let entries = queue.lock().await.receive(count);

        debug!(queue = %queue_name, requested = count, count = entries.len(), "Received messages");

        if entries.is_empty() {
            return Ok(Response::new(ReceiveMessageOutput { messages: None }));
        }

        let messages = entries
            .into_iter()
            .map(|entry| ReceivedMessage {
                receipt_handle: ReceiptHandle::from(&entry.message_id),
                body_checksum: BodyChecksum::compute(&entry.message),
                message_id: entry.message_id,
                body: entry.message,
            })
            .collect();

        Ok(Response::new(ReceiveMessageOutput {
            messages: Some(messages),
        }))
    }

    async fn delete_message(
        &self,
        request: DeleteMessageRequest,
    ) -> Result<Response<DeleteMessageOutput>, BrokerError> {
        let validated = QueueName::new(request.queue_name).and_then(|queue| {
            request
                .receipt_handle
                .parse::<ReceiptHandle>()
                .map(|handle| (queue, handle))
        });
        let (queue_name, handle) =
            log_rejection("DeleteMessage", validated.map_err(BrokerError::from))?;

        let queue = self.registry.get_or_create(&queue_name).await?;
        let removed = queue.lock().await.delete(&MessageId::from(&handle));

        debug!(queue = %queue_name, receipt_handle = %handle, removed, "Deleted message");

        Ok(Response::new(DeleteMessageOutput {}))
    }

    async fn delete_message_batch(
        &self,
        request: DeleteMessageBatchRequest,
    ) -> Result<Response<DeleteMessageBatchOutput>, BrokerError> {
        let validated = QueueName::new(request.queue_name)
            .map_err(BrokerError::from)
            .and_then(|queue| self.validate_batch_size(request.entries.len()).map(|()| queue));
        let queue_name = log_rejection("DeleteMessageBatch", validated)?;

        let queue = self.registry.get_or_create(&queue_name).await?;
        let mut output = DeleteMessageBatchOutput::default();

        let mut guard = queue.lock().await;
        for entry in request.entries {
            let handle = if entry.id.is_empty() {
                Err(ValidationError::required("id"))
            } else {
                entry.receipt_handle.parse::<ReceiptHandle>()
            };

            match handle {
                Ok(handle) => {
                    guard.delete(&MessageId::from(&handle));
                    output
                        .successful
                        .push(DeleteMessageBatchResultEntry { id: entry.id });
                }
                Err(e) => output.failed.push(entry_error(&entry.id, &e)),
            }
        }
        drop(guard);

        debug!(
            queue = %queue_name,
            successful = output.successful.len(),
            failed = output.failed.len(),
            "Deleted message batch"
        );

        Ok(Response::new(output))
    }

    async fn purge_queue(
        &self,
        request: PurgeQueueRequest,
    ) -> Result<Response<PurgeQueueOutput>, BrokerError> {
        let queue_name = log_rejection(
            "PurgeQueue",
            QueueName::new(request.queue_name).map_err(BrokerError::from),
        )?;

        let queue = self.registry.get_or_create(&queue_name).await?;
        let mut guard = queue.lock().await;
        let purged = guard.len();
        guard.reset();
        drop(guard);

        info!(queue = %queue_name, purged, "Purged queue");

        Ok(Response::new(PurgeQueueOutput {}))
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
