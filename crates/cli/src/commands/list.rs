// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sq_core::Action;

use super::Workspace;
use crate::display::{format_action_line, format_failed_action};
use crate::error::Result;

/// List actions waiting for delivery, in delivery order.
pub fn pending(json: bool) -> Result<()> {
    let ws = Workspace::find()?;
    let actions = ws.store.list_pending()?;
    print_actions(&actions, json, format_action_line, "No pending actions")
}

/// List actions that will not be retried, with their last error.
pub fn failed(json: bool) -> Result<()> {
    let ws = Workspace::find()?;
    let actions = ws.store.list_failed()?;
    print_actions(&actions, json, format_failed_action, "No failed actions")
}

fn print_actions(
    actions: &[Action],
    json: bool,
    format_line: fn(&Action) -> String,
    empty: &str,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(actions)?);
    } else if actions.is_empty() {
        println!("{}", empty);
    } else {
        for action in actions {
            println!("{}", format_line(action));
        }
    }
    Ok(())
}
