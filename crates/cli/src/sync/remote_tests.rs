// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::sync::test_helpers::MockTransport;
use sq_core::protocol::AckStatus;

const URL: &str = "ws://remote.test";

fn deleted(task: &str) -> ActionPayload {
    ActionPayload::TaskDeleted { task_id: task.into() }
}

fn handler() -> (RemoteHandler<MockTransport>, MockTransport) {
    let mock = MockTransport::new();
    (RemoteHandler::with_transport(URL, mock.clone()), mock)
}

#[tokio::test]
async fn ack_is_success_and_sends_envelope() {
    let (handler, mock) = handler();
    let key = ActionId::from("a-1");
    mock.queue_incoming(ServerMessage::ack(key.clone(), AckStatus::Applied));

    let outcome = handler.execute(deleted("t1"), key.clone()).await;

    assert_eq!(outcome, Outcome::Success);
    assert_eq!(mock.connect_count(), 1);
    let sent = mock.get_outgoing();
    assert_eq!(sent.len(), 1);
    let ClientMessage::Deliver { key: sent_key, envelope } = &sent[0] else {
        unreachable!("expected a deliver message, got {:?}", sent[0]);
    };
    assert_eq!(sent_key, &key);
    assert_eq!(envelope["type"], "task_deleted");
    assert_eq!(envelope["data"]["task_id"], "t1");
}

#[tokio::test]
async fn duplicate_ack_is_success() {
    let (handler, mock) = handler();
    let key = ActionId::from("a-1");
    mock.queue_incoming(ServerMessage::ack(key.clone(), AckStatus::Duplicate));

    assert_eq!(handler.execute(deleted("t1"), key).await, Outcome::Success);
}

async fn reject_outcome(retryable: bool) -> Outcome {
    let (handler, mock) = handler();
    let key = ActionId::from("a-1");
    mock.queue_incoming(ServerMessage::reject(key.clone(), "rate limited", retryable));
    handler.execute(deleted("t1"), key).await
}

#[tokio::test]
async fn retryable_reject_is_retryable() {
    assert_eq!(reject_outcome(true).await, Outcome::retryable("rate limited"));
}

#[tokio::test]
async fn final_reject_is_permanent() {
    assert_eq!(reject_outcome(false).await, Outcome::permanent("rate limited"));
}

#[tokio::test]
async fn answers_for_other_keys_are_skipped() {
    let (handler, mock) = handler();
    let key = ActionId::from("a-2");
    mock.queue_incoming(ServerMessage::ack(ActionId::from("a-1"), AckStatus::Applied));
    mock.queue_incoming(ServerMessage::pong(7));
    mock.queue_incoming(ServerMessage::reject(key.clone(), "invalid task", false));

    let outcome = handler.execute(deleted("t1"), key).await;
    assert_eq!(outcome, Outcome::permanent("invalid task"));
}

#[tokio::test]
async fn server_error_for_own_key_is_retryable() {
    let (handler, mock) = handler();
    let key = ActionId::from("a-1");
    mock.queue_incoming(ServerMessage::error_for(key.clone(), "disk full"));

    let outcome = handler.execute(deleted("t1"), key).await;
    assert_eq!(outcome, Outcome::retryable("server error: disk full"));
}

#[tokio::test]
async fn errors_for_other_deliveries_are_skipped() {
    let (handler, mock) = handler();
    let key = ActionId::from("a-2");
    mock.queue_incoming(ServerMessage::error_for(ActionId::from("a-1"), "late failure"));
    mock.queue_incoming(ServerMessage::error("unreadable frame"));
    mock.queue_incoming(ServerMessage::ack(key.clone(), AckStatus::Applied));

    assert_eq!(handler.execute(deleted("t1"), key).await, Outcome::Success);
}

#[tokio::test]
async fn closed_connection_is_retryable_and_reconnects() {
    let (handler, mock) = handler();
    let key = ActionId::from("a-1");

    // No reply queued: the mock reports the connection closed
    let outcome = handler.execute(deleted("t1"), key.clone()).await;
    assert!(matches!(outcome, Outcome::RetryableFailure(_)));

    mock.queue_incoming(ServerMessage::ack(key.clone(), AckStatus::Duplicate));
    assert_eq!(handler.execute(deleted("t1"), key).await, Outcome::Success);
    assert_eq!(mock.connect_count(), 2);
}

#[tokio::test]
async fn connect_failure_is_retryable() {
    let (handler, mock) = handler();
    mock.set_connect_fail(true);

    let outcome = handler.execute(deleted("t1"), ActionId::from("a-1")).await;
    assert!(matches!(outcome, Outcome::RetryableFailure(ref r) if r.contains("mock failure")));
    assert!(mock.get_outgoing().is_empty());
}

#[tokio::test]
async fn connection_is_reused_between_deliveries() {
    let (handler, mock) = handler();
    let first = ActionId::from("a-1");
    let second = ActionId::from("a-2");
    mock.queue_incoming(ServerMessage::ack(first.clone(), AckStatus::Applied));

    assert_eq!(handler.execute(deleted("t1"), first).await, Outcome::Success);
    mock.queue_incoming(ServerMessage::ack(second.clone(), AckStatus::Applied));
    assert_eq!(handler.execute(deleted("t2"), second).await, Outcome::Success);

    assert_eq!(mock.connect_count(), 1);
    assert_eq!(mock.get_outgoing().len(), 2);
}
