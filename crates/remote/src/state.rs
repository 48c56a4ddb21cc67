// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Wraps the delivery ledger for shared access across connections.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;

use sq_core::payload::from_envelope;
use sq_core::protocol::{AckStatus, ServerMessage};
use sq_core::{ActionId, Result};

use crate::ledger::{Ledger, LedgerEntry, LEDGER_FILE_NAME};

/// Shared server state containing the delivery ledger.
#[derive(Clone)]
pub struct ServerState {
    inner: Arc<ServerStateInner>,
}

struct ServerStateInner {
    ledger: Mutex<Ledger>,
}

impl ServerState {
    /// Opens the ledger in `data_dir`, creating the directory if needed.
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let ledger = Ledger::open(data_dir.join(LEDGER_FILE_NAME))?;
        Ok(ServerState { inner: Arc::new(ServerStateInner { ledger: Mutex::new(ledger) }) })
    }

    /// Applies one delivery and builds the answer for `key`.
    ///
    /// Undecodable envelopes are rejected for good. A ledger write failure
    /// is rejected as retryable: nothing was recorded, so the client should
    /// try again.
    pub async fn deliver(&self, key: ActionId, envelope: Value) -> ServerMessage {
        let payload = match from_envelope(envelope.clone()) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(%key, error = %e, "rejecting undecodable envelope");
                return ServerMessage::reject(key, e.to_string(), false);
            }
        };

        let entry = LedgerEntry {
            key: key.clone(),
            action_type: payload.action_type(),
            envelope,
            received_at: Utc::now(),
        };

        let recorded = {
            let mut ledger = self.inner.ledger.lock().await;
            ledger.record(&entry)
        };

        match recorded {
            Ok(true) => {
                tracing::info!(%key, action_type = %entry.action_type, "applied delivery");
                ServerMessage::ack(key, AckStatus::Applied)
            }
            Ok(false) => {
                tracing::debug!(%key, "duplicate delivery");
                ServerMessage::ack(key, AckStatus::Duplicate)
            }
            Err(e) => {
                tracing::error!(%key, error = %e, "failed to record delivery");
                ServerMessage::reject(key, format!("storage error: {e}"), true)
            }
        }
    }

    /// Number of distinct keys applied.
    pub async fn applied_count(&self) -> usize {
        self.inner.ledger.lock().await.len()
    }
}
