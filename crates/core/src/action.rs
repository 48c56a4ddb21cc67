// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core action types for the offline queue.
//!
//! An [`Action`] is the durable record of one deferred state-changing
//! operation. Its [`ActionId`] doubles as the idempotency key sent to the
//! remote side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::clock::Stamp;
use crate::error::{Error, Result};
use crate::payload::{self, ActionPayload};

/// Unique action identifier, stable across retries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        ActionId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        ActionId(s)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        ActionId(s.to_string())
    }
}

/// The closed set of operations that can be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    TaskCompleted,
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    ProgressUpdated,
    FriendAdded,
    GroupJoined,
    AchievementShared,
    AchievementUnlocked,
    SettingsUpdated,
}

impl ActionType {
    /// Every action type, in declaration order.
    pub const ALL: [ActionType; 10] = [
        ActionType::TaskCompleted,
        ActionType::TaskCreated,
        ActionType::TaskUpdated,
        ActionType::TaskDeleted,
        ActionType::ProgressUpdated,
        ActionType::FriendAdded,
        ActionType::GroupJoined,
        ActionType::AchievementShared,
        ActionType::AchievementUnlocked,
        ActionType::SettingsUpdated,
    ];

    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::TaskCompleted => "task_completed",
            ActionType::TaskCreated => "task_created",
            ActionType::TaskUpdated => "task_updated",
            ActionType::TaskDeleted => "task_deleted",
            ActionType::ProgressUpdated => "progress_updated",
            ActionType::FriendAdded => "friend_added",
            ActionType::GroupJoined => "group_joined",
            ActionType::AchievementShared => "achievement_shared",
            ActionType::AchievementUnlocked => "achievement_unlocked",
            ActionType::SettingsUpdated => "settings_updated",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.to_lowercase().replace('-', "_");
        ActionType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| Error::InvalidActionType(s.to_string()))
    }
}

/// Delivery status of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Waiting for the next sync pass.
    Pending,
    /// Claimed by a sync pass; the remote call may be in flight.
    InProgress,
    /// Delivered. Terminal.
    Completed,
    /// Gave up. Terminal; kept until the user discards it.
    Failed,
}

impl ActionStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::InProgress => "in_progress",
            ActionStatus::Completed => "completed",
            ActionStatus::Failed => "failed",
        }
    }

    /// Returns true for `Completed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionStatus::Completed | ActionStatus::Failed)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ActionStatus::Pending),
            "in_progress" | "in-progress" => Ok(ActionStatus::InProgress),
            "completed" => Ok(ActionStatus::Completed),
            "failed" => Ok(ActionStatus::Failed),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// A durable record of one deferred operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Encoded payload envelope, opaque to the store.
    pub payload: String,
    pub created_at: Stamp,
    pub retry_count: u32,
    pub status: ActionStatus,
    /// Reason recorded with the most recent failed attempt.
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Action {
    /// Decodes the payload and checks it matches this action's type.
    pub fn decode_payload(&self) -> Result<ActionPayload> {
        let decoded = payload::decode(&self.payload)?;
        if decoded.action_type() != self.action_type {
            return Err(Error::InvalidPayload(format!(
                "payload is {} but action is {}",
                decoded.action_type(),
                self.action_type
            )));
        }
        Ok(decoded)
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
