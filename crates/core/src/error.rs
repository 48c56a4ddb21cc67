// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for sq-core operations.

use thiserror::Error;

/// All possible errors that can occur in sq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("conflict on action {id}: expected status {expected}, found {actual}")]
    Conflict {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("invalid action type: '{0}'\n  hint: valid types are: task_completed, task_created, task_updated, task_deleted, progress_updated, friend_added, group_joined, achievement_shared, achievement_unlocked, settings_updated")]
    InvalidActionType(String),

    #[error("invalid status: '{0}'\n  hint: valid statuses are: pending, in_progress, completed, failed")]
    InvalidStatus(String),

    #[error("unknown action type in payload: '{0}'")]
    UnknownType(String),

    #[error("unsupported payload version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid stamp: {0}")]
    InvalidStamp(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    /// Returns true if this error means the action was not in the expected state.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }
}

/// A specialized Result type for sq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
