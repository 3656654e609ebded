//! Integration tests for command decoding and dispatch
//!
//! These tests verify:
//! - JSON commands reach the matching service operation
//! - Unknown actions are rejected at decode time
//! - Dispatch works for any `QueueService` implementation

mod common;

use common::RecordingService;
use queue_sim::{BrokerError, Command, CommandOutput, InMemoryBroker, QueueService};
use serde_json::json;

async fn dispatch_json<S: QueueService>(service: &S, value: serde_json::Value) -> CommandOutput {
    let command = Command::from_json(&value.to_string()).expect("command should decode");
    service
        .dispatch(command)
        .await
        .expect("command should succeed")
        .output
}

/// Verify every action is routed to its operation
#[tokio::test]
async fn test_each_action_routes_to_its_operation() {
    let service = RecordingService::new(InMemoryBroker::default());

    let sent = dispatch_json(
        &service,
        json!({"action": "SendMessage", "queueName": "q", "body": "hello"}),
    )
    .await;
    let message_id = match sent {
        CommandOutput::SendMessage(output) => output.message_id,
        other => panic!("Expected SendMessage output, got: {:?}", other),
    };

    dispatch_json(
        &service,
        json!({"action": "SendMessageBatch", "queueName": "q", "entries": [{"id": "a", "body": "x"}]}),
    )
    .await;
    dispatch_json(
        &service,
        json!({"action": "ReceiveMessage", "queueName": "q", "maxCount": 2}),
    )
    .await;
    dispatch_json(
        &service,
        json!({"action": "DeleteMessage", "queueName": "q", "receiptHandle": message_id.as_str()}),
    )
    .await;
    dispatch_json(
        &service,
        json!({"action": "DeleteMessageBatch", "queueName": "q", "entries": [{"id": "a", "receiptHandle": "gone"}]}),
    )
    .await;
    dispatch_json(&service, json!({"action": "PurgeQueue", "queueName": "q"})).await;

    assert_eq!(
        service.calls(),
        vec![
            "send_message",
            "send_message_batch",
            "receive_message",
            "delete_message",
            "delete_message_batch",
            "purge_queue",
        ]
    );
}

/// Verify the dispatched envelope serializes with action tag and request ID
#[tokio::test]
async fn test_dispatched_envelope_shape() {
    let broker = InMemoryBroker::default();
    let command =
        Command::from_json(r#"{"action": "SendMessage", "queueName": "q", "body": "hi"}"#).unwrap();

    let response = broker.dispatch(command).await.unwrap();
    let value = serde_json::to_value(&response).unwrap();

    assert_eq!(value["output"]["action"], "SendMessage");
    assert_eq!(
        value["output"]["bodyChecksum"],
        "49f68a5c8493ec2c0bf489821c21fc3b"
    );
    assert_eq!(
        value["metadata"]["requestId"].as_str().unwrap().len(),
        26
    );
}

/// Verify unknown actions never reach the service
#[tokio::test]
async fn test_unsupported_action_is_rejected_before_dispatch() {
    let service = RecordingService::new(InMemoryBroker::default());

    let result = Command::from_json(r#"{"action": "CreateQueue", "queueName": "q"}"#);

    match result {
        Err(BrokerError::UnsupportedOperation { action }) => assert_eq!(action, "CreateQueue"),
        other => panic!("Expected UnsupportedOperation error, got: {:?}", other),
    }
    assert!(service.calls().is_empty());
}

/// Verify validation failures propagate through dispatch
#[tokio::test]
async fn test_dispatch_reports_validation_failures() {
    let broker = InMemoryBroker::default();
    let command = Command::from_json(r#"{"action": "PurgeQueue"}"#).unwrap();

    let error = broker.dispatch(command).await.unwrap_err();

    assert_eq!(error.code(), "MissingParameter");
}
