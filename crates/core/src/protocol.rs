// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for action delivery.
//!
//! The protocol is request/response:
//! - Client delivers one action at a time, keyed by its idempotency key
//! - Server answers each delivery with an ack or a reject for that key

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::ActionId;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Apply an action.
    ///
    /// Redelivering the same key must not apply the action twice.
    Deliver {
        /// Idempotency key (the action's ID).
        key: ActionId,
        /// Versioned payload envelope.
        envelope: Value,
    },

    /// Ping message for keepalive and reachability probes.
    Ping {
        /// Client-chosen ID echoed in Pong.
        id: u64,
    },
}

/// How the server handled an accepted delivery.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    /// First time this key was seen; the action was applied.
    Applied,
    /// The key was already applied; nothing changed.
    Duplicate,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The delivery for `key` is durable on the server.
    Ack { key: ActionId, status: AckStatus },

    /// The delivery for `key` was refused.
    Reject {
        key: ActionId,
        reason: String,
        /// False for validation or business-rule rejections.
        retryable: bool,
    },

    /// Pong response to client Ping.
    Pong {
        /// Echoed from the Ping message.
        id: u64,
    },

    /// A frame the server could not act on.
    Error {
        /// Key of the delivery the frame carried, when one could be read.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<ActionId>,
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    pub fn deliver(key: ActionId, envelope: Value) -> Self {
        ClientMessage::Deliver { key, envelope }
    }

    pub fn ping(id: u64) -> Self {
        ClientMessage::Ping { id }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    pub fn ack(key: ActionId, status: AckStatus) -> Self {
        ServerMessage::Ack { key, status }
    }

    pub fn reject(key: ActionId, reason: impl Into<String>, retryable: bool) -> Self {
        ServerMessage::Reject { key, reason: reason.into(), retryable }
    }

    pub fn pong(id: u64) -> Self {
        ServerMessage::Pong { id }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error { key: None, message: message.into() }
    }

    /// An error answering the delivery for `key`.
    pub fn error_for(key: ActionId, message: impl Into<String>) -> Self {
        ServerMessage::Error { key: Some(key), message: message.into() }
    }

    /// The delivery key this message answers, if any.
    pub fn key(&self) -> Option<&ActionId> {
        match self {
            ServerMessage::Ack { key, .. } | ServerMessage::Reject { key, .. } => Some(key),
            ServerMessage::Error { key, .. } => key.as_ref(),
            ServerMessage::Pong { .. } => None,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
