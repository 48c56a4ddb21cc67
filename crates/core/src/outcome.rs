// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Result of one attempt to apply an action remotely.

use serde::{Deserialize, Serialize};

use crate::retry::ErrorClass;

/// What a handler reports back for a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Success,
    /// Network, timeout or server-side failure; worth trying again.
    RetryableFailure(String),
    /// Validation or business-rule rejection; will never succeed as-is.
    PermanentFailure(String),
}

impl Outcome {
    pub fn retryable(reason: impl Into<String>) -> Self {
        Outcome::RetryableFailure(reason.into())
    }

    pub fn permanent(reason: impl Into<String>) -> Self {
        Outcome::PermanentFailure(reason.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    /// Error classification, or `None` for success.
    pub fn class(&self) -> Option<ErrorClass> {
        match self {
            Outcome::Success => None,
            Outcome::RetryableFailure(_) => Some(ErrorClass::Transient),
            Outcome::PermanentFailure(_) => Some(ErrorClass::Permanent),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Success => None,
            Outcome::RetryableFailure(r) | Outcome::PermanentFailure(r) => Some(r),
        }
    }
}
