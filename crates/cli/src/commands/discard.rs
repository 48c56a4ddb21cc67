// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sq_core::ActionId;

use super::Workspace;
use crate::error::Result;

pub fn run(id: &str) -> Result<()> {
    let ws = Workspace::find()?;
    run_impl(&ws, id)?;
    println!("Discarded {}", id);
    Ok(())
}

/// Delete a failed action. Actions in any other state are refused.
pub(crate) fn run_impl(ws: &Workspace, id: &str) -> Result<()> {
    ws.store.discard(&ActionId::from(id))?;
    Ok(())
}

#[cfg(test)]
#[path = "discard_tests.rs"]
mod tests;
