// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use sq_core::ActionStatus;

use super::{runtime, Workspace};
use crate::display::format_pass_result;
use crate::error::Result;
use crate::sync::{ConnectivityMonitor, SyncPassResult};

pub fn run() -> Result<()> {
    let ws = Workspace::find()?;
    let result = runtime()?.block_on(run_impl(&ws))?;

    println!("{}", format_pass_result(&result));
    for outcome in result.outcomes.iter().filter(|o| o.status == ActionStatus::Failed) {
        println!(
            "  failed: {} [{}] {}",
            outcome.id,
            outcome.action_type,
            outcome.reason.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// Run one pass against the configured remote.
///
/// The remote is assumed reachable when configured; an unreachable one
/// surfaces as retryable outcomes on the actions themselves.
pub(crate) async fn run_impl(ws: &Workspace) -> Result<SyncPassResult> {
    let monitor = Arc::new(ConnectivityMonitor::new(ws.config.remote.is_some()));
    let coordinator = ws.coordinator(monitor);
    let requeued = coordinator.recover()?;
    if requeued > 0 {
        tracing::warn!(requeued, "requeued actions left in progress by an earlier run");
    }
    coordinator.run_pass().await
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
