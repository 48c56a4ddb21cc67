// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable store for queued actions.
//!
//! The [`ActionStore`] is the only shared mutable state in the sync engine.
//! Every status transition is a single guarded `UPDATE`, so the store stays
//! correct when enqueue callers and a sync pass run on different threads.
//! Writes are committed with `synchronous = FULL` before a call returns.

use chrono::{DateTime, Utc};
use fs2::FileExt;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::action::{Action, ActionId, ActionStatus, ActionType};
use crate::clock::{ActionClock, ClockSource, Stamp, SystemClock};
use crate::error::{Error, Result};
use crate::outcome::Outcome;
use crate::payload::{self, ActionPayload};
use crate::retry::{RetryDecision, RetryPolicy};

/// SQL schema for the action queue.
pub const SCHEMA: &str = r#"
-- Queued actions; created_at is a zero-padded logical stamp
CREATE TABLE IF NOT EXISTS actions (
    id TEXT PRIMARY KEY,
    type TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at TEXT NOT NULL,
    retry_count INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    last_error TEXT,
    updated_at TEXT NOT NULL
);

-- Engine bookkeeping (last successful sync, ...)
CREATE TABLE IF NOT EXISTS sync_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_actions_status_type_created
    ON actions(status, type, created_at);
"#;

const ACTION_COLUMNS: &str =
    "id, type, payload, created_at, retry_count, status, last_error, updated_at";

const META_LAST_SUCCESSFUL_SYNC: &str = "last_successful_sync_at";

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

fn row_to_action(row: &Row<'_>) -> std::result::Result<Action, rusqlite::Error> {
    let type_str: String = row.get(1)?;
    let created_str: String = row.get(3)?;
    let status_str: String = row.get(5)?;
    let updated_str: String = row.get(7)?;

    Ok(Action {
        id: ActionId::from(row.get::<_, String>(0)?),
        action_type: parse_db(&type_str, "type")?,
        payload: row.get(2)?,
        created_at: parse_db(&created_str, "created_at")?,
        retry_count: row.get(4)?,
        status: parse_db(&status_str, "status")?,
        last_error: row.get(6)?,
        updated_at: parse_timestamp(&updated_str, "updated_at")?,
    })
}

/// Create the schema on a connection. Idempotent.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Per-status action counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.in_progress + self.completed + self.failed
    }
}

/// What [`ActionStore::record_outcome`] did with an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recorded {
    /// Status after the transition: `Pending`, `Completed` or `Failed`.
    pub status: ActionStatus,
    pub retry_count: u32,
    /// Set when the action went back to `Pending` for another attempt.
    pub retry_after: Option<Duration>,
}

/// Exclusive right to sync one queue.
///
/// Only the holder may dispatch actions or return `InProgress` actions to
/// `Pending`. File-backed stores also hold an OS lock on `<db>.lock`, so the
/// right is exclusive across processes. Released on drop.
pub struct QueueLock<'a> {
    claimed: &'a AtomicBool,
    file: Option<File>,
}

impl Drop for QueueLock<'_> {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = file.unlock();
        }
        self.claimed.store(false, Ordering::Release);
    }
}

/// Durable action queue.
pub struct ActionStore {
    conn: Mutex<Connection>,
    clock: ActionClock<Arc<dyn ClockSource>>,
    lock_path: Option<PathBuf>,
    queue_claimed: AtomicBool,
}

fn lock_path_for(db_path: &Path) -> PathBuf {
    let mut name = OsString::from(db_path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

impl ActionStore {
    /// Open a store at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    /// Open a store whose `created_at` stamps come from a custom clock.
    pub fn open_with_clock(path: &Path, clock: Arc<dyn ClockSource>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL for concurrent readers; FULL so a returned enqueue survives power loss
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;

        Self::from_connection(conn, clock, Some(lock_path_for(path)))
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::open_in_memory_with_clock(Arc::new(SystemClock))
    }

    pub fn open_in_memory_with_clock(clock: Arc<dyn ClockSource>) -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, clock, None)
    }

    fn from_connection(
        conn: Connection,
        clock: Arc<dyn ClockSource>,
        lock_path: Option<PathBuf>,
    ) -> Result<Self> {
        run_migrations(&conn)?;

        // Stamps must keep increasing across restarts even if the wall clock moved back
        let newest: Option<String> =
            conn.query_row("SELECT MAX(created_at) FROM actions", [], |row| row.get(0))?;
        let clock = ActionClock::with_clock(clock);
        if let Some(newest) = newest {
            clock.observe(newest.parse()?);
        }

        Ok(ActionStore {
            conn: Mutex::new(conn),
            clock,
            lock_path,
            queue_claimed: AtomicBool::new(false),
        })
    }

    /// Try to become the only syncer of this queue.
    ///
    /// Returns `Ok(None)` while another holder exists, whether through this
    /// store, another store on the same file, or another process.
    pub fn try_lock_queue(&self) -> Result<Option<QueueLock<'_>>> {
        if self
            .queue_claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(None);
        }
        let mut lock = QueueLock { claimed: &self.queue_claimed, file: None };

        if let Some(path) = &self.lock_path {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)?;
            if let Err(e) = file.try_lock_exclusive() {
                if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                    return Ok(None);
                }
                return Err(e.into());
            }
            lock.file = Some(file);
        }

        Ok(Some(lock))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a new `Pending` action with a raw payload envelope.
    ///
    /// The row is committed before this returns.
    pub fn enqueue(&self, action_type: ActionType, payload: impl Into<String>) -> Result<Action> {
        let conn = self.lock();
        // Stamp under the lock so insertion order matches stamp order
        let created_at = self.clock.now();
        let action = Action {
            id: ActionId::generate(),
            action_type,
            payload: payload.into(),
            created_at,
            retry_count: 0,
            status: ActionStatus::Pending,
            last_error: None,
            updated_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO actions (id, type, payload, created_at, retry_count, status,
             last_error, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                action.id.as_str(),
                action.action_type.as_str(),
                action.payload,
                action.created_at.sort_key(),
                action.retry_count,
                action.status.as_str(),
                action.last_error,
                action.updated_at.to_rfc3339(),
            ],
        )?;

        tracing::debug!(id = %action.id, action_type = %action.action_type, "enqueued action");
        Ok(action)
    }

    /// Encode a typed payload and enqueue it.
    pub fn enqueue_payload(&self, payload: &ActionPayload) -> Result<Action> {
        let encoded = payload::encode(payload)?;
        self.enqueue(payload.action_type(), encoded)
    }

    /// Get an action by ID.
    pub fn get(&self, id: &ActionId) -> Result<Action> {
        let conn = self.lock();
        Self::get_locked(&conn, id)
    }

    fn get_locked(conn: &Connection, id: &ActionId) -> Result<Action> {
        conn.query_row(
            &format!("SELECT {ACTION_COLUMNS} FROM actions WHERE id = ?1"),
            params![id.as_str()],
            row_to_action,
        )
        .optional()?
        .ok_or_else(|| Error::ActionNotFound(id.to_string()))
    }

    fn status_locked(conn: &Connection, id: &ActionId) -> Result<ActionStatus> {
        let status: Option<String> = conn
            .query_row("SELECT status FROM actions WHERE id = ?1", params![id.as_str()], |row| {
                row.get(0)
            })
            .optional()?;
        match status {
            Some(s) => s.parse(),
            None => Err(Error::ActionNotFound(id.to_string())),
        }
    }

    /// All `Pending` actions ordered by `(type, created_at)`.
    ///
    /// Runs as one statement, so the result is a consistent snapshot.
    pub fn list_pending(&self) -> Result<Vec<Action>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ACTION_COLUMNS} FROM actions
             WHERE status = 'pending'
             ORDER BY type, created_at"
        ))?;
        let actions = stmt.query_map([], row_to_action)?.collect::<std::result::Result<_, _>>()?;
        Ok(actions)
    }

    /// All actions in the given status, oldest first.
    pub fn list_by_status(&self, status: ActionStatus) -> Result<Vec<Action>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {ACTION_COLUMNS} FROM actions
             WHERE status = ?1
             ORDER BY created_at"
        ))?;
        let actions = stmt
            .query_map(params![status.as_str()], row_to_action)?
            .collect::<std::result::Result<_, _>>()?;
        Ok(actions)
    }

    pub fn list_failed(&self) -> Result<Vec<Action>> {
        self.list_by_status(ActionStatus::Failed)
    }

    /// Claim a `Pending` action for delivery.
    ///
    /// Fails with [`Error::Conflict`] if the action is in any other state,
    /// so at most one caller holds an action `InProgress`.
    pub fn mark_in_progress(&self, id: &ActionId) -> Result<()> {
        let conn = self.lock();
        let changed = conn.execute(
            "UPDATE actions SET status = 'in_progress', updated_at = ?2
             WHERE id = ?1 AND status = 'pending'",
            params![id.as_str(), Utc::now().to_rfc3339()],
        )?;
        if changed == 1 {
            return Ok(());
        }

        let actual = Self::status_locked(&conn, id)?;
        Err(Error::Conflict {
            id: id.to_string(),
            expected: ActionStatus::Pending.to_string(),
            actual: actual.to_string(),
        })
    }

    /// Apply a delivery outcome to an `InProgress` action.
    ///
    /// - Success → `Completed`
    /// - Retryable failure → `retry_count + 1`, then `Pending` or `Failed` per `policy`
    /// - Permanent failure → `retry_count + 1`, `Failed`
    pub fn record_outcome(
        &self,
        id: &ActionId,
        outcome: &Outcome,
        policy: &RetryPolicy,
    ) -> Result<Recorded> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let current = Self::get_locked(&tx, id)?;
        if current.status != ActionStatus::InProgress {
            return Err(Error::Conflict {
                id: id.to_string(),
                expected: ActionStatus::InProgress.to_string(),
                actual: current.status.to_string(),
            });
        }

        let recorded = match outcome.class() {
            None => Recorded {
                status: ActionStatus::Completed,
                retry_count: current.retry_count,
                retry_after: None,
            },
            Some(class) => {
                let retry_count = current.retry_count.saturating_add(1);
                match policy.decide(retry_count, class) {
                    RetryDecision::RetryAfter(delay) => Recorded {
                        status: ActionStatus::Pending,
                        retry_count,
                        retry_after: Some(delay),
                    },
                    RetryDecision::GiveUp => {
                        Recorded { status: ActionStatus::Failed, retry_count, retry_after: None }
                    }
                }
            }
        };

        let last_error = outcome.reason().map(str::to_string).or(current.last_error);
        tx.execute(
            "UPDATE actions SET status = ?2, retry_count = ?3, last_error = ?4, updated_at = ?5
             WHERE id = ?1",
            params![
                id.as_str(),
                recorded.status.as_str(),
                recorded.retry_count,
                last_error,
                Utc::now().to_rfc3339(),
            ],
        )?;
        tx.commit()?;

        Ok(recorded)
    }

    /// Return actions stranded `InProgress` by an abrupt exit to `Pending`.
    ///
    /// Callers must hold the [`QueueLock`]; otherwise a live pass elsewhere
    /// could lose its claim. The retry count is left alone; the redelivery
    /// reuses the same idempotency key.
    pub fn requeue_in_progress(&self) -> Result<usize> {
        let conn = self.lock();
        let changed = conn.execute(
            "UPDATE actions SET status = 'pending', updated_at = ?1 WHERE status = 'in_progress'",
            params![Utc::now().to_rfc3339()],
        )?;
        if changed > 0 {
            tracing::warn!(count = changed, "requeued actions left in progress");
        }
        Ok(changed)
    }

    /// Delete all `Completed` actions.
    pub fn purge_completed(&self) -> Result<usize> {
        self.purge_status(ActionStatus::Completed)
    }

    /// Delete all `Failed` actions.
    pub fn purge_failed(&self) -> Result<usize> {
        self.purge_status(ActionStatus::Failed)
    }

    fn purge_status(&self, status: ActionStatus) -> Result<usize> {
        let conn = self.lock();
        let removed =
            conn.execute("DELETE FROM actions WHERE status = ?1", params![status.as_str()])?;
        Ok(removed)
    }

    /// Delete a single `Failed` action.
    pub fn discard(&self, id: &ActionId) -> Result<()> {
        let conn = self.lock();
        let removed = conn.execute(
            "DELETE FROM actions WHERE id = ?1 AND status = 'failed'",
            params![id.as_str()],
        )?;
        if removed == 1 {
            return Ok(());
        }

        let actual = Self::status_locked(&conn, id)?;
        Err(Error::Conflict {
            id: id.to_string(),
            expected: ActionStatus::Failed.to_string(),
            actual: actual.to_string(),
        })
    }

    /// Delete every action regardless of status. Explicit user reset only.
    pub fn clear_all(&self) -> Result<usize> {
        let conn = self.lock();
        Ok(conn.execute("DELETE FROM actions", [])?)
    }

    pub fn counts(&self) -> Result<StatusCounts> {
        let conn = self.lock();
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM actions GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((status, count))
        })?;

        let mut counts = StatusCounts::default();
        for row in rows {
            let (status, count) = row?;
            let count = usize::try_from(count).unwrap_or(0);
            match status.parse()? {
                ActionStatus::Pending => counts.pending = count,
                ActionStatus::InProgress => counts.in_progress = count,
                ActionStatus::Completed => counts.completed = count,
                ActionStatus::Failed => counts.failed = count,
            }
        }
        Ok(counts)
    }

    pub fn pending_count(&self) -> Result<usize> {
        Ok(self.counts()?.pending)
    }

    pub fn last_successful_sync_at(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock();
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM sync_meta WHERE key = ?1",
                params![META_LAST_SUCCESSFUL_SYNC],
                |row| row.get(0),
            )
            .optional()?;
        let parsed = value.map(|v| parse_timestamp(&v, META_LAST_SUCCESSFUL_SYNC)).transpose()?;
        Ok(parsed)
    }

    pub fn set_last_successful_sync_at(&self, at: DateTime<Utc>) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO sync_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![META_LAST_SUCCESSFUL_SYNC, at.to_rfc3339()],
        )?;
        Ok(())
    }

    /// The newest stamp issued or loaded by this store.
    pub fn last_stamp(&self) -> Stamp {
        self.clock.last()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
