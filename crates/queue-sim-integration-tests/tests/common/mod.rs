//! Common test utilities for queue-sim integration tests
//!
//! This module provides:
//! - A recording [`QueueService`] wrapper for observing which operations ran
//! - Helper functions for sending and receiving through the public API

use async_trait::async_trait;
use queue_sim::{
    BrokerError, DeleteMessageBatchOutput, DeleteMessageBatchRequest, DeleteMessageOutput,
    DeleteMessageRequest, InMemoryBroker, MessageId, PurgeQueueOutput, PurgeQueueRequest,
    QueueService, ReceiveMessageOutput, ReceiveMessageRequest, ReceivedMessage, Response,
    SendMessageBatchOutput, SendMessageBatchRequest, SendMessageOutput, SendMessageRequest,
};
use std::sync::{Arc, Mutex};

// ============================================================================
// Recording Service
// ============================================================================

/// Service wrapper that records the name of every operation it forwards
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingService {
    inner: InMemoryBroker,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

#[allow(dead_code)]
impl RecordingService {
    pub fn new(inner: InMemoryBroker) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Operations forwarded so far, in call order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str) {
        self.calls.lock().unwrap().push(operation);
    }
}

#[async_trait]
impl QueueService for RecordingService {
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<Response<SendMessageOutput>, BrokerError> {
        self.record("send_message");
        self.inner.send_message(request).await
    }

    async fn send_message_batch(
        &self,
        request: SendMessageBatchRequest,
    ) -> Result<Response<SendMessageBatchOutput>, BrokerError> {
        self.record("send_message_batch");
        self.inner.send_message_batch(request).await
    }

    async fn receive_message(
        &self,
        request: ReceiveMessageRequest,
    ) -> Result<Response<ReceiveMessageOutput>, BrokerError> {
        self.record("receive_message");
        self.inner.receive_message(request).await
    }

    async fn delete_message(
        &self,
        request: DeleteMessageRequest,
    ) -> Result<Response<DeleteMessageOutput>, BrokerError> {
        self.record("delete_message");
        self.inner.delete_message(request).await
    }

    async fn delete_message_batch(
        &self,
        request: DeleteMessageBatchRequest,
    ) -> Result<Response<DeleteMessageBatchOutput>, BrokerError> {
        self.record("delete_message_batch");
        self.inner.delete_message_batch(request).await
    }

    async fn purge_queue(
        &self,
        request: PurgeQueueRequest,
    ) -> Result<Response<PurgeQueueOutput>, BrokerError> {
        self.record("purge_queue");
        self.inner.purge_queue(request).await
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Send a message and return its ID
#[allow(dead_code)]
pub async fn send<S: QueueService>(service: &S, queue: &str, body: &str) -> MessageId {
    service
        .send_message(SendMessageRequest::new(queue, body))
        .await
        .expect("Setup: send should succeed")
        .output
        .message_id
}

/// Receive up to `max_count` messages, empty when none are available
#[allow(dead_code)]
pub async fn receive<S: QueueService>(
    service: &S,
    queue: &str,
    max_count: i64,
) -> Vec<ReceivedMessage> {
    service
        .receive_message(ReceiveMessageRequest::new(queue).with_max_count(max_count))
        .await
        .expect("Setup: receive should succeed")
        .output
        .messages
        .unwrap_or_default()
}

/// Delete every given message by its receipt handle
#[allow(dead_code)]
pub async fn delete_all<S: QueueService>(service: &S, queue: &str, messages: &[ReceivedMessage]) {
    for message in messages {
        service
            .delete_message(DeleteMessageRequest::new(
                queue,
                message.receipt_handle.as_str(),
            ))
            .await
            .expect("Setup: delete should succeed");
    }
}
