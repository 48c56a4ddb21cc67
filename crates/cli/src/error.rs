// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::TransportError;

/// All possible errors that can occur in the sqrs library.
///
/// Handler-level delivery failures are never errors; they are recorded as
/// outcomes against the action. Errors here abort the current command or
/// sync pass.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'sq init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("action not found: {0}")]
    ActionNotFound(String),

    #[error("action {id} is {actual}, expected {expected}")]
    Conflict {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("invalid action data: {0}\n  hint: pass the action's fields as a JSON object, e.g. '{{\"task_id\":\"t1\",\"actual_minutes\":25}}'")]
    InvalidData(String),

    #[error("invalid remote URL '{0}': must start with ws:// or wss://")]
    InvalidRemoteUrl(String),

    #[error("refusing to {action} without --yes")]
    ConfirmationRequired { action: &'static str },

    #[error(transparent)]
    Core(sq_core::Error),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("sync task failed: {0}")]
    SyncTask(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for sqrs operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<sq_core::Error> for Error {
    fn from(e: sq_core::Error) -> Self {
        match e {
            sq_core::Error::ActionNotFound(id) => Error::ActionNotFound(id),
            sq_core::Error::Conflict { id, expected, actual } => {
                Error::Conflict { id, expected, actual }
            }
            sq_core::Error::Io(e) => Error::Io(e),
            other => Error::Core(other),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
