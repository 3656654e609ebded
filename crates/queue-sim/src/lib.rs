//! # Queue Sim
//!
//! In-process simulator of a hosted message-queue service, for exercising
//! code that talks to such a service without network access.
//!
//! This library provides:
//! - Named queues created on first reference
//! - Ordered, at-least-once delivery: a received message stays visible until
//!   it is deleted
//! - Single and batch send/delete with per-entry partial failure
//! - Response envelopes carrying a request ID and MD5 body checksums
//! - A closed command vocabulary that can be decoded from JSON and dispatched
//!
//! ## Module Organization
//!
//! - [`message`] - Identifiers, queue names and receipt handles
//! - [`queue`] - The ordered store behind a single queue
//! - [`registry`] - Name-to-queue mapping with lazy creation
//! - [`checksum`] - Body checksums
//! - [`command`] - Requests, outputs and the command enum
//! - [`broker`] - The [`QueueService`] trait and [`InMemoryBroker`]
//! - [`config`] - Broker limits and registry capacity
//! - [`error`] - Error types for all broker operations
//!
//! ## Example
//!
//! ```
//! use queue_sim::{InMemoryBroker, QueueService, ReceiveMessageRequest, SendMessageRequest};
//!
//! # tokio_test::block_on(async {
//! let broker = InMemoryBroker::default();
//!
//! broker
//!     .send_message(SendMessageRequest::new("orders", "hello"))
//!     .await
//!     .unwrap();
//!
//! let response = broker
//!     .receive_message(ReceiveMessageRequest::new("orders"))
//!     .await
//!     .unwrap();
//! assert_eq!(response.output.messages()[0].body, "hello");
//! # });
//! ```

// Module declarations
pub mod broker;
pub mod checksum;
pub mod command;
pub mod config;
pub mod error;
pub mod message;
pub mod queue;
pub mod registry;

// Re-export commonly used types at crate root for convenience
pub use broker::{InMemoryBroker, QueueService};
pub use checksum::BodyChecksum;
pub use command::{
    BatchResultError, Command, CommandOutput, DeleteMessageBatchEntry, DeleteMessageBatchOutput,
    DeleteMessageBatchRequest, DeleteMessageBatchResultEntry, DeleteMessageOutput,
    DeleteMessageRequest, PurgeQueueOutput, PurgeQueueRequest, ReceiveMessageOutput,
    ReceiveMessageRequest, ReceivedMessage, Response, ResponseMetadata, SendMessageBatchEntry,
    SendMessageBatchOutput, SendMessageBatchRequest, SendMessageBatchResultEntry,
    SendMessageOutput, SendMessageRequest,
};
pub use config::{BrokerConfig, CapacityPolicy};
pub use error::{BrokerError, ValidationError};
pub use message::{MessageId, QueueName, ReceiptHandle, RequestId, Timestamp};
pub use queue::{MessageQueue, QueueEntry};
pub use registry::{QueueRegistry, SharedQueue};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
