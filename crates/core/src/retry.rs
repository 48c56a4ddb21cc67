// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry decisions for failed delivery attempts.
//!
//! Backoff doubles from `base_delay` up to `max_delay`. Jitter shaves a
//! random fraction off each delay so clients that reconnect together do not
//! retry in lockstep; it never pushes a delay above the cap.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether a failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Transient,
    Permanent,
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Bounded exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Failed attempts allowed before an action is marked failed.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Fraction (0.0 to 1.0) of each delay that may be randomly removed.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// A policy with no jitter, for deterministic scheduling.
    pub fn without_jitter(self) -> Self {
        RetryPolicy { jitter: 0.0, ..self }
    }

    /// Un-jittered delay after the `attempt`-th failure (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent).min(self.max_delay)
    }

    fn jittered(&self, attempt: u32) -> Duration {
        let delay = self.backoff(attempt);
        let jitter = if self.jitter.is_finite() { self.jitter.clamp(0.0, 1.0) } else { 0.0 };
        if jitter == 0.0 {
            return delay;
        }
        let cut = rand::thread_rng().gen_range(0.0..=jitter);
        delay.mul_f64(1.0 - cut)
    }

    /// Decides what follows a failure.
    ///
    /// `retry_count` is the number of failed attempts including this one.
    pub fn decide(&self, retry_count: u32, class: ErrorClass) -> RetryDecision {
        match class {
            ErrorClass::Permanent => RetryDecision::GiveUp,
            ErrorClass::Transient if retry_count >= self.max_attempts => RetryDecision::GiveUp,
            ErrorClass::Transient => RetryDecision::RetryAfter(self.jittered(retry_count)),
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
