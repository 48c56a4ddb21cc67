// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only delivery ledger.
//!
//! Every applied delivery is recorded as one JSON line in
//! `deliveries.jsonl`, fsynced before the client is acked. Keys are loaded
//! back into memory on open so redeliveries are recognized across restarts.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sq_core::{ActionId, ActionType, Result};

pub const LEDGER_FILE_NAME: &str = "deliveries.jsonl";

/// One applied delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub key: ActionId,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub envelope: Value,
    pub received_at: DateTime<Utc>,
}

pub struct Ledger {
    path: PathBuf,
    seen_keys: HashSet<ActionId>,
}

impl Ledger {
    /// Opens or creates the ledger at `path`, loading every recorded key.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut seen_keys = HashSet::new();

        if path.exists() {
            for entry in read_entries(&path)? {
                seen_keys.insert(entry.key);
            }
        }

        Ok(Ledger { path, seen_keys })
    }

    /// Records `entry` unless its key is already present.
    ///
    /// Returns `Ok(false)` for a duplicate key. The line is on disk before
    /// this returns `Ok(true)`.
    pub fn record(&mut self, entry: &LedgerEntry) -> Result<bool> {
        if self.seen_keys.contains(&entry.key) {
            return Ok(false);
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;
        file.sync_all()?;

        self.seen_keys.insert(entry.key.clone());
        Ok(true)
    }

    /// Number of distinct keys recorded.
    pub fn len(&self) -> usize {
        self.seen_keys.len()
    }
}

fn read_entries(path: &Path) -> Result<Vec<LedgerEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        entries.push(serde_json::from_str(&line)?);
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
