// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

#[test]
fn envelope_carries_version_type_and_data() {
    let payload = ActionPayload::TaskCompleted { task_id: "t1".into(), actual_minutes: 25 };
    let envelope = to_envelope(&payload).unwrap();

    assert_eq!(envelope["v"], 1);
    assert_eq!(envelope["type"], "task_completed");
    assert_eq!(envelope["data"]["task_id"], "t1");
    assert_eq!(envelope["data"]["actual_minutes"], 25);
}

#[test]
fn decode_reads_encoded_payload() {
    let payload = ActionPayload::SettingsUpdated {
        key: "daily_goal_minutes".into(),
        value: json!(90),
    };
    let text = encode(&payload).unwrap();
    assert_eq!(decode(&text).unwrap(), payload);
}

#[test]
fn optional_fields_default_when_absent() {
    let text = r#"{"v":1,"type":"task_created","data":{"task_id":"t9","title":"Read ch. 4"}}"#;
    let payload = decode(text).unwrap();
    assert_eq!(
        payload,
        ActionPayload::TaskCreated {
            task_id: "t9".into(),
            title: "Read ch. 4".into(),
            description: None,
            estimated_minutes: 0,
        }
    );
}

#[test]
fn older_versions_are_accepted() {
    let text = r#"{"v":0,"type":"friend_added","data":{"friend_id":"f1"}}"#;
    assert_eq!(decode(text).unwrap(), ActionPayload::FriendAdded { friend_id: "f1".into() });
}

#[test]
fn newer_version_is_unsupported() {
    let text = r#"{"v":7,"type":"friend_added","data":{"friend_id":"f1"}}"#;
    let err = decode(text).unwrap_err();
    assert!(matches!(err, Error::UnsupportedVersion { found: 7, supported: 1 }));
}

#[test]
fn unknown_type_is_reported() {
    let text = r#"{"v":1,"type":"streak_frozen","data":{}}"#;
    assert!(matches!(decode(text), Err(Error::UnknownType(ref t)) if t == "streak_frozen"));
}

#[parameterized(
    not_json = { "not json" },
    not_object = { "[1,2,3]" },
    missing_version = { r#"{"type":"task_deleted","data":{"task_id":"t1"}}"# },
    missing_type = { r#"{"v":1,"data":{"task_id":"t1"}}"# },
    wrong_field_type = { r#"{"v":1,"type":"task_completed","data":{"task_id":"t1","actual_minutes":"lots"}}"# },
    missing_data = { r#"{"v":1,"type":"group_joined"}"# },
)]
fn malformed_envelopes_are_invalid(text: &str) {
    assert!(matches!(decode(text), Err(Error::InvalidPayload(_))));
}

#[test]
fn from_data_builds_typed_payload() {
    let payload = ActionPayload::from_data(
        ActionType::ProgressUpdated,
        json!({"total_xp": 1200, "streak_days": 4, "minutes_studied": 45}),
    )
    .unwrap();
    assert_eq!(payload.action_type(), ActionType::ProgressUpdated);
}

#[test]
fn every_variant_reports_its_type() {
    let samples = [
        ActionPayload::TaskDeleted { task_id: "t".into() },
        ActionPayload::GroupJoined { group_id: "g".into() },
        ActionPayload::AchievementShared { achievement_id: "a".into(), message: None },
        ActionPayload::AchievementUnlocked { achievement_id: "a".into() },
    ];
    for payload in samples {
        let envelope = to_envelope(&payload).unwrap();
        assert_eq!(envelope["type"], payload.action_type().as_str());
    }
}
