// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sq_core::Action;

use crate::sync::{SkipReason, StatusSnapshot, SyncPassResult};

/// Format an action as a single list line.
///
/// `- [type] (status, N retries) id`
pub fn format_action_line(action: &Action) -> String {
    let status_display = match action.retry_count {
        0 => action.status.to_string(),
        1 => format!("{}, 1 retry", action.status),
        n => format!("{}, {} retries", action.status, n),
    };
    format!("- [{}] ({}) {}", action.action_type, status_display, action.id)
}

/// Format a failed action with its recorded error indented below it.
pub fn format_failed_action(action: &Action) -> String {
    let line = format_action_line(action);
    match action.last_error.as_deref() {
        Some(error) => format!("{line}\n    error: {error}"),
        None => line,
    }
}

/// How the queue would reach the remote right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Online,
    OfflineMode,
    NoRemote,
}

impl SyncMode {
    pub fn label(&self) -> &'static str {
        match self {
            SyncMode::Online => "online",
            SyncMode::OfflineMode => "offline mode",
            SyncMode::NoRemote => "no remote configured",
        }
    }
}

/// Format the status report.
pub fn format_status(snapshot: &StatusSnapshot, mode: SyncMode) -> String {
    let last_sync = snapshot
        .last_successful_sync_at
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "never".to_string());

    let mut lines = vec![
        format!("Pending:     {}", snapshot.pending_count),
        format!("In progress: {}", snapshot.in_progress_count),
        format!("Failed:      {}", snapshot.failed_count),
        format!("Completed:   {}", snapshot.completed_count),
        format!("Last sync:   {last_sync}"),
        format!("Mode:        {}", mode.label()),
    ];
    if snapshot.failed_count > 0 {
        lines.push(String::new());
        lines.push("Run 'sq failed' to inspect failed actions.".to_string());
    }
    lines.join("\n")
}

/// One-line summary of a sync pass.
pub fn format_pass_result(result: &SyncPassResult) -> String {
    match result.skipped {
        Some(SkipReason::Offline) => "Sync skipped: offline".to_string(),
        Some(reason) => format!("Sync skipped: {reason}"),
        None if result.attempted == 0 && result.conflicts == 0 => "Nothing to sync".to_string(),
        None => {
            let mut summary = format!(
                "Synced {} action(s): {} succeeded, {} failed, {} retrying",
                result.attempted, result.succeeded, result.failed, result.retrying
            );
            if result.conflicts > 0 {
                summary.push_str(&format!(", {} skipped as busy", result.conflicts));
            }
            if let Some(delay) = result.retry_after {
                summary.push_str(&format!(" (next retry in {:.1}s)", delay.as_secs_f64()));
            }
            summary
        }
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
