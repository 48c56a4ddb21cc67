// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use yare::parameterized;

#[test]
fn deliver_wire_format() {
    let msg = ClientMessage::deliver(
        ActionId::from("k1"),
        json!({"v": 1, "type": "group_joined", "data": {"group_id": "g1"}}),
    );
    let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
    assert_eq!(value["type"], "deliver");
    assert_eq!(value["key"], "k1");
    assert_eq!(value["envelope"]["data"]["group_id"], "g1");
}

#[parameterized(
    applied = { r#"{"type":"ack","key":"k1","status":"applied"}"#, AckStatus::Applied },
    duplicate = { r#"{"type":"ack","key":"k1","status":"duplicate"}"#, AckStatus::Duplicate },
)]
fn ack_parses(json: &str, expected: AckStatus) {
    let msg = ServerMessage::from_json(json).unwrap();
    assert_eq!(msg, ServerMessage::ack(ActionId::from("k1"), expected));
}

#[test]
fn reject_parses() {
    let json = r#"{"type":"reject","key":"k2","reason":"unknown task","retryable":false}"#;
    let msg = ServerMessage::from_json(json).unwrap();
    assert_eq!(msg, ServerMessage::reject(ActionId::from("k2"), "unknown task", false));
}

#[test]
fn key_is_exposed_for_delivery_replies() {
    assert_eq!(
        ServerMessage::ack(ActionId::from("a"), AckStatus::Applied).key(),
        Some(&ActionId::from("a"))
    );
    assert_eq!(ServerMessage::pong(3).key(), None);
    assert_eq!(ServerMessage::error("boom").key(), None);
    assert_eq!(
        ServerMessage::error_for(ActionId::from("b"), "boom").key(),
        Some(&ActionId::from("b"))
    );
}

#[test]
fn error_key_is_optional_on_the_wire() {
    let unkeyed = ServerMessage::error("boom").to_json().unwrap();
    assert_eq!(unkeyed, r#"{"type":"error","message":"boom"}"#);

    let keyed = r#"{"type":"error","key":"k1","message":"boom"}"#;
    assert_eq!(
        ServerMessage::from_json(keyed).unwrap(),
        ServerMessage::error_for(ActionId::from("k1"), "boom")
    );
}

#[test]
fn ping_pong_roundtrip() {
    let ping = ClientMessage::from_json(&ClientMessage::ping(9).to_json().unwrap()).unwrap();
    assert_eq!(ping, ClientMessage::Ping { id: 9 });
    let pong = ServerMessage::from_json(&ServerMessage::pong(9).to_json().unwrap()).unwrap();
    assert_eq!(pong, ServerMessage::Pong { id: 9 });
}

#[test]
fn unknown_message_type_fails() {
    assert!(ClientMessage::from_json(r#"{"type":"snapshot"}"#).is_err());
}
