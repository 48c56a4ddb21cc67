// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Workspace;
use crate::cli::PurgeTarget;
use crate::error::Result;

pub fn run(target: PurgeTarget) -> Result<()> {
    let ws = Workspace::find()?;
    let removed = run_impl(&ws, target)?;
    let label = match target {
        PurgeTarget::Completed => "completed",
        PurgeTarget::Failed => "failed",
    };
    println!("Purged {} {} action(s)", removed, label);
    Ok(())
}

pub(crate) fn run_impl(ws: &Workspace, target: PurgeTarget) -> Result<usize> {
    let removed = match target {
        PurgeTarget::Completed => ws.store.purge_completed()?,
        PurgeTarget::Failed => ws.store.purge_failed()?,
    };
    Ok(removed)
}

#[cfg(test)]
#[path = "purge_tests.rs"]
mod tests;
