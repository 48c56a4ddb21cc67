// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Typed action payloads and their versioned envelope codec.
//!
//! Payloads are stored and sent as an envelope:
//!
//! ```json
//! {"v": 1, "type": "task_completed", "data": {"task_id": "t1", "actual_minutes": 25}}
//! ```
//!
//! Decoding checks the version before the type, so an envelope written by a
//! newer app version is reported as [`Error::UnsupportedVersion`] rather than
//! as malformed data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::ActionType;
use crate::error::{Error, Result};

/// Newest envelope version this build can read and the one it writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Self-contained data needed to replay an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ActionPayload {
    TaskCompleted {
        task_id: String,
        actual_minutes: u32,
    },
    TaskCreated {
        task_id: String,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default)]
        estimated_minutes: u32,
    },
    TaskUpdated {
        task_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        estimated_minutes: Option<u32>,
    },
    TaskDeleted {
        task_id: String,
    },
    ProgressUpdated {
        total_xp: u64,
        streak_days: u32,
        minutes_studied: u32,
    },
    FriendAdded {
        friend_id: String,
    },
    GroupJoined {
        group_id: String,
    },
    AchievementShared {
        achievement_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    AchievementUnlocked {
        achievement_id: String,
    },
    SettingsUpdated {
        key: String,
        value: Value,
    },
}

impl ActionPayload {
    /// The action type this payload belongs to.
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionPayload::TaskCompleted { .. } => ActionType::TaskCompleted,
            ActionPayload::TaskCreated { .. } => ActionType::TaskCreated,
            ActionPayload::TaskUpdated { .. } => ActionType::TaskUpdated,
            ActionPayload::TaskDeleted { .. } => ActionType::TaskDeleted,
            ActionPayload::ProgressUpdated { .. } => ActionType::ProgressUpdated,
            ActionPayload::FriendAdded { .. } => ActionType::FriendAdded,
            ActionPayload::GroupJoined { .. } => ActionType::GroupJoined,
            ActionPayload::AchievementShared { .. } => ActionType::AchievementShared,
            ActionPayload::AchievementUnlocked { .. } => ActionType::AchievementUnlocked,
            ActionPayload::SettingsUpdated { .. } => ActionType::SettingsUpdated,
        }
    }

    /// Builds a payload from a type and its bare `data` object.
    pub fn from_data(action_type: ActionType, data: Value) -> Result<Self> {
        let mut tagged = Map::new();
        tagged.insert("type".into(), Value::String(action_type.as_str().into()));
        tagged.insert("data".into(), data);
        serde_json::from_value(Value::Object(tagged))
            .map_err(|e| Error::InvalidPayload(format!("{action_type}: {e}")))
    }
}

/// Wraps a payload in a versioned envelope value.
pub fn to_envelope(payload: &ActionPayload) -> Result<Value> {
    let mut value = serde_json::to_value(payload)?;
    match value.as_object_mut() {
        Some(obj) => {
            obj.insert("v".into(), Value::from(CURRENT_SCHEMA_VERSION));
            Ok(value)
        }
        None => Err(Error::InvalidPayload("payload did not serialize to an object".into())),
    }
}

/// Encodes a payload as envelope JSON text.
pub fn encode(payload: &ActionPayload) -> Result<String> {
    Ok(serde_json::to_string(&to_envelope(payload)?)?)
}

/// Decodes envelope JSON text.
pub fn decode(text: &str) -> Result<ActionPayload> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| Error::InvalidPayload(e.to_string()))?;
    from_envelope(value)
}

/// Decodes an envelope value.
pub fn from_envelope(value: Value) -> Result<ActionPayload> {
    let Value::Object(mut obj) = value else {
        return Err(Error::InvalidPayload("envelope must be a JSON object".into()));
    };

    let version = obj
        .get("v")
        .and_then(Value::as_u64)
        .ok_or_else(|| Error::InvalidPayload("missing envelope version".into()))?;
    let version = u32::try_from(version).unwrap_or(u32::MAX);
    if version > CURRENT_SCHEMA_VERSION {
        return Err(Error::UnsupportedVersion {
            found: version,
            supported: CURRENT_SCHEMA_VERSION,
        });
    }

    let type_name = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidPayload("missing envelope type".into()))?;
    let action_type: ActionType =
        type_name.parse().map_err(|_| Error::UnknownType(type_name.to_string()))?;

    let data = obj.remove("data").unwrap_or(Value::Null);
    ActionPayload::from_data(action_type, data)
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
