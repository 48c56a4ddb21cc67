// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use super::Workspace;
use crate::display::format_status;
use crate::error::Result;
use crate::sync::{StatusSnapshot, StatusTracker};

#[derive(Serialize)]
struct StatusReport {
    #[serde(flatten)]
    snapshot: StatusSnapshot,
    mode: &'static str,
}

pub fn run(json: bool) -> Result<()> {
    let ws = Workspace::find()?;
    let snapshot = run_impl(&ws)?;
    let mode = ws.sync_mode();

    if json {
        let report = StatusReport { snapshot, mode: mode.label() };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_status(&snapshot, mode));
    }
    Ok(())
}

pub(crate) fn run_impl(ws: &Workspace) -> Result<StatusSnapshot> {
    Ok(StatusTracker::from_store(&ws.store)?.snapshot())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
