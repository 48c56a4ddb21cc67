// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    snake = { "task_completed", ActionType::TaskCompleted },
    screaming = { "FRIEND_ADDED", ActionType::FriendAdded },
    kebab = { "group-joined", ActionType::GroupJoined },
    mixed = { "Settings_Updated", ActionType::SettingsUpdated },
)]
fn action_type_parses(input: &str, expected: ActionType) {
    assert_eq!(input.parse::<ActionType>().unwrap(), expected);
}

#[test]
fn action_type_round_trips_through_as_str() {
    for t in ActionType::ALL {
        assert_eq!(t.as_str().parse::<ActionType>().unwrap(), t);
    }
}

#[test]
fn unknown_action_type_is_rejected() {
    let err = "streak_frozen".parse::<ActionType>().unwrap_err();
    assert!(matches!(err, Error::InvalidActionType(ref s) if s == "streak_frozen"));
}

#[parameterized(
    pending = { "pending", ActionStatus::Pending, false },
    in_progress = { "in_progress", ActionStatus::InProgress, false },
    completed = { "completed", ActionStatus::Completed, true },
    failed = { "FAILED", ActionStatus::Failed, true },
)]
fn status_parses(input: &str, expected: ActionStatus, terminal: bool) {
    let status: ActionStatus = input.parse().unwrap();
    assert_eq!(status, expected);
    assert_eq!(status.is_terminal(), terminal);
}

#[test]
fn invalid_status_is_rejected() {
    assert!(matches!("done".parse::<ActionStatus>(), Err(Error::InvalidStatus(_))));
}

#[test]
fn generated_ids_are_unique() {
    let a = ActionId::generate();
    let b = ActionId::generate();
    assert_ne!(a, b);
    assert_eq!(a.as_str().len(), 36);
}

#[test]
fn action_serializes_type_field() {
    let action = Action {
        id: ActionId::from("a1"),
        action_type: ActionType::GroupJoined,
        payload: String::new(),
        created_at: Stamp::new(1, 0),
        retry_count: 0,
        status: ActionStatus::Pending,
        last_error: None,
        updated_at: Utc::now(),
    };
    let json = serde_json::to_value(&action).unwrap();
    assert_eq!(json["type"], "group_joined");
    assert_eq!(json["id"], "a1");
    assert_eq!(json["status"], "pending");
}

#[test]
fn decode_payload_rejects_type_mismatch() {
    let payload = ActionPayload::GroupJoined { group_id: "g1".into() };
    let action = Action {
        id: ActionId::generate(),
        action_type: ActionType::FriendAdded,
        payload: payload::encode(&payload).unwrap(),
        created_at: Stamp::min(),
        retry_count: 0,
        status: ActionStatus::Pending,
        last_error: None,
        updated_at: Utc::now(),
    };
    assert!(matches!(action.decode_payload(), Err(Error::InvalidPayload(_))));
}
