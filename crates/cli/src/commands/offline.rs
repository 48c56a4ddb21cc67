// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use crate::cli::Toggle;
use crate::config::{find_work_dir, Config};
use crate::error::Result;

pub fn run(state: Toggle) -> Result<()> {
    let work_dir = find_work_dir()?;
    let enabled = run_impl(&work_dir, state)?;
    if enabled {
        println!("Offline mode on: sync passes are skipped until it is turned off");
    } else {
        println!("Offline mode off");
    }
    Ok(())
}

/// Persist the offline-mode toggle. Running `sq watch` loops pick it up on restart.
pub(crate) fn run_impl(work_dir: &Path, state: Toggle) -> Result<bool> {
    let mut config = Config::load(work_dir)?;
    config.sync.offline_mode = state == Toggle::On;
    config.save(work_dir)?;
    Ok(config.sync.offline_mode)
}

#[cfg(test)]
#[path = "offline_tests.rs"]
mod tests;
