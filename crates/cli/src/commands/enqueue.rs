// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sq_core::{Action, ActionPayload, ActionType};

use super::Workspace;
use crate::error::{Error, Result};

pub fn run(action_type: &str, data: &str) -> Result<()> {
    let ws = Workspace::find()?;
    let action = run_impl(&ws, action_type, data)?;
    println!("{}", action.id);
    Ok(())
}

/// Validate `data` against the payload shape for `action_type` and queue it.
pub(crate) fn run_impl(ws: &Workspace, action_type: &str, data: &str) -> Result<Action> {
    let action_type: ActionType = action_type.parse()?;
    let data: serde_json::Value =
        serde_json::from_str(data).map_err(|e| Error::InvalidData(e.to_string()))?;
    let payload = ActionPayload::from_data(action_type, data)
        .map_err(|e| Error::InvalidData(e.to_string()))?;

    let action = ws.store.enqueue_payload(&payload)?;
    tracing::debug!(id = %action.id, %action_type, "queued action");
    Ok(action)
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
