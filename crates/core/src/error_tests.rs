// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    action_not_found = { Error::ActionNotFound("abc-123".into()), "abc-123" },
    invalid_type = { Error::InvalidActionType("bogus".into()), "task_completed" },
    invalid_status = { Error::InvalidStatus("done".into()), "in_progress" },
    unknown_type = { Error::UnknownType("streak_frozen".into()), "streak_frozen" },
    unsupported_version = { Error::UnsupportedVersion { found: 9, supported: 1 }, "version 9" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn conflict_display_names_both_states() {
    let err = Error::Conflict {
        id: "a1".into(),
        expected: "pending".into(),
        actual: "in_progress".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("a1"));
    assert!(msg.contains("pending"));
    assert!(msg.contains("in_progress"));
    assert!(err.is_conflict());
}

#[test]
fn non_conflict_errors_are_not_conflicts() {
    assert!(!Error::ActionNotFound("x".into()).is_conflict());
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}
