// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Workspace;
use crate::error::{Error, Result};

pub fn run(yes: bool) -> Result<()> {
    let ws = Workspace::find()?;
    let removed = run_impl(&ws, yes)?;
    println!("Removed {} action(s)", removed);
    Ok(())
}

/// Delete every action. Undelivered actions are lost, so `yes` is required.
pub(crate) fn run_impl(ws: &Workspace, yes: bool) -> Result<usize> {
    if !yes {
        return Err(Error::ConfirmationRequired { action: "delete every queued action" });
    }
    let removed = ws.store.clear_all()?;
    tracing::info!(removed, "queue reset");
    Ok(removed)
}

#[cfg(test)]
#[path = "reset_tests.rs"]
mod tests;
