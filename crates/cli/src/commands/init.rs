// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use sq_core::ActionStore;

use crate::config::{get_db_path, init_work_dir, Config, RemoteConfig};
use crate::error::Result;

pub fn run(remote: Option<String>, path: Option<String>) -> Result<()> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let work_dir = run_impl(&target_path, remote)?;

    println!("Initialized action queue at {}", work_dir.display());
    match Config::load(&work_dir)?.remote_url() {
        Some(url) => println!("Remote: {}", url),
        None => println!("No remote configured; actions stay queued until one is added"),
    }
    Ok(())
}

/// Create `.studyq/` under `target_path` with its config and database.
pub(crate) fn run_impl(target_path: &Path, remote: Option<String>) -> Result<PathBuf> {
    // Validate before touching the filesystem
    let remote = remote.map(RemoteConfig::new).transpose()?;
    let config = Config { remote, ..Config::default() };

    let work_dir = init_work_dir(target_path, &config)?;
    ActionStore::open(&get_db_path(&work_dir))?;
    Ok(work_dir)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
