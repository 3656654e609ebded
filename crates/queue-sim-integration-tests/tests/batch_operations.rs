//! Integration tests for batch send and batch delete
//!
//! These tests verify:
//! - Per-entry partial failure
//! - That successful entries are retrievable independently of failures
//! - Whole-request rejection for empty and oversized batches

mod common;

use common::receive;
use queue_sim::{
    BrokerConfig, BrokerError, DeleteMessageBatchEntry, DeleteMessageBatchRequest,
    InMemoryBroker, QueueName, QueueService, SendMessageBatchEntry, SendMessageBatchRequest,
};

fn entries(bodies: &[&str]) -> Vec<SendMessageBatchEntry> {
    bodies
        .iter()
        .enumerate()
        .map(|(i, body)| SendMessageBatchEntry::new(format!("entry-{}", i), *body))
        .collect()
}

/// Verify five valid entries and one empty body yield 5 successes and 1 failure
#[tokio::test]
async fn test_partial_batch_failure() {
    let broker = InMemoryBroker::default();

    let output = broker
        .send_message_batch(SendMessageBatchRequest::new(
            "orders",
            entries(&["one", "two", "", "three", "four", "five"]),
        ))
        .await
        .unwrap()
        .output;

    assert_eq!(output.successful.len(), 5);
    assert_eq!(output.failed.len(), 1);
    assert_eq!(output.failed[0].id, "entry-2");
    assert!(output.failed[0].sender_fault);

    let mut bodies: Vec<String> = receive(&broker, "orders", 10)
        .await
        .into_iter()
        .map(|m| m.body)
        .collect();
    bodies.sort();
    assert_eq!(bodies, vec!["five", "four", "one", "three", "two"]);
}

/// Verify each successful entry carries the ID assigned to the stored message
#[tokio::test]
async fn test_batch_result_ids_match_stored_messages() {
    let broker = InMemoryBroker::default();

    let output = broker
        .send_message_batch(SendMessageBatchRequest::new(
            "orders",
            entries(&["a", "b", "c"]),
        ))
        .await
        .unwrap()
        .output;

    let received = receive(&broker, "orders", 10).await;
    for result in &output.successful {
        let message = received
            .iter()
            .find(|m| m.message_id == result.message_id)
            .expect("Stored message should be receivable");
        assert_eq!(message.body_checksum, result.body_checksum);
    }
}

/// Verify batch delete removes the referenced messages and leaves the rest
#[tokio::test]
async fn test_batch_delete_after_batch_send() {
    let broker = InMemoryBroker::default();
    broker
        .send_message_batch(SendMessageBatchRequest::new(
            "orders",
            entries(&["a", "b", "c", "d"]),
        ))
        .await
        .unwrap();

    let received = receive(&broker, "orders", 2).await;
    let deletions = received
        .iter()
        .map(|m| DeleteMessageBatchEntry::new(m.message_id.as_str(), m.receipt_handle.as_str()))
        .collect();

    let output = broker
        .delete_message_batch(DeleteMessageBatchRequest::new("orders", deletions))
        .await
        .unwrap()
        .output;

    assert_eq!(output.successful.len(), 2);
    assert!(output.failed.is_empty());
    assert_eq!(receive(&broker, "orders", 10).await.len(), 2);
}

/// Verify oversized batches are rejected before anything is stored
#[tokio::test]
async fn test_oversized_batch_is_rejected_whole() {
    let broker = InMemoryBroker::new(BrokerConfig {
        max_batch_entries: 3,
        ..BrokerConfig::default()
    });

    let result = broker
        .send_message_batch(SendMessageBatchRequest::new(
            "orders",
            entries(&["a", "b", "c", "d"]),
        ))
        .await;

    assert!(matches!(
        result,
        Err(BrokerError::BatchTooLarge {
            size: 4,
            max_size: 3
        })
    ));
    let orders = QueueName::new("orders").unwrap();
    assert_eq!(broker.approximate_message_count(&orders).await, 0);
}

/// Verify empty batches are rejected as a missing parameter
#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let broker = InMemoryBroker::default();

    let error = broker
        .send_message_batch(SendMessageBatchRequest::new("orders", vec![]))
        .await
        .unwrap_err();

    assert_eq!(error.code(), "MissingParameter");
    assert!(error.is_client_error());
}

/// Verify entries failing for different reasons are each reported
#[tokio::test]
async fn test_each_failed_entry_is_reported() {
    let broker = InMemoryBroker::new(BrokerConfig {
        max_message_bytes: 4,
        ..BrokerConfig::default()
    });

    let output = broker
        .send_message_batch(SendMessageBatchRequest::new(
            "orders",
            vec![
                SendMessageBatchEntry::new("empty", ""),
                SendMessageBatchEntry::new("big", "too large"),
                SendMessageBatchEntry::new("", "ok"),
                SendMessageBatchEntry::new("fine", "ok"),
            ],
        ))
        .await
        .unwrap()
        .output;

    let codes: Vec<(&str, &str)> = output
        .failed
        .iter()
        .map(|f| (f.id.as_str(), f.code.as_str()))
        .collect();
    assert_eq!(
        codes,
        vec![
            ("empty", "MissingParameter"),
            ("big", "InvalidParameterValue"),
            ("", "MissingParameter"),
        ]
    );
    assert_eq!(output.successful.len(), 1);
    assert_eq!(output.successful[0].id, "fine");
}
