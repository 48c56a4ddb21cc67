// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only queue status for presentation layers.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tokio::sync::watch;

use sq_core::ActionStore;

use crate::error::Result;

/// Where the engine is in its sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Idle,
    Syncing,
    /// Last pass ran to completion.
    Synced,
    /// Last pass was aborted by a store error.
    Error,
}

impl SyncPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Syncing => "syncing",
            SyncPhase::Synced => "synced",
            SyncPhase::Error => "error",
        }
    }
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of queue state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSnapshot {
    pub pending_count: usize,
    pub in_progress_count: usize,
    pub failed_count: usize,
    pub completed_count: usize,
    pub last_successful_sync_at: Option<DateTime<Utc>>,
    pub phase: SyncPhase,
}

/// Observable status derived from the store.
///
/// Never mutates the store.
#[derive(Debug)]
pub struct StatusTracker {
    tx: watch::Sender<StatusSnapshot>,
}

impl StatusTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(StatusSnapshot::default());
        StatusTracker { tx }
    }

    /// Create a tracker already loaded from `store`.
    pub fn from_store(store: &ActionStore) -> Result<Self> {
        let tracker = Self::new();
        tracker.refresh(store)?;
        Ok(tracker)
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.tx.subscribe()
    }

    /// Recompute counts and last-sync time, keeping the current phase.
    pub fn refresh(&self, store: &ActionStore) -> Result<StatusSnapshot> {
        let counts = store.counts()?;
        let last_successful_sync_at = store.last_successful_sync_at()?;

        self.tx.send_modify(|snapshot| {
            snapshot.pending_count = counts.pending;
            snapshot.in_progress_count = counts.in_progress;
            snapshot.failed_count = counts.failed;
            snapshot.completed_count = counts.completed;
            snapshot.last_successful_sync_at = last_successful_sync_at;
        });
        Ok(self.snapshot())
    }

    pub(crate) fn set_phase(&self, phase: SyncPhase) {
        self.tx.send_if_modified(|snapshot| {
            let changed = snapshot.phase != phase;
            snapshot.phase = phase;
            changed
        });
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
