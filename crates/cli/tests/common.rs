// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn sq() -> Command {
    cargo_bin_cmd!("sq")
}

/// Helper to create an initialized temp directory with no remote
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    sq().arg("init").current_dir(temp.path()).assert().success();
    temp
}

/// Helper to create an initialized temp directory pointing at `url`
pub fn init_temp_with_remote(url: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    sq().args(["init", "--remote", url]).current_dir(temp.path()).assert().success();
    temp
}

/// Helper to enqueue an action and return its ID
pub fn enqueue(temp: &TempDir, action_type: &str, data: &str) -> String {
    let output = sq()
        .args(["enqueue", action_type, data])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "enqueue failed: {:?}", output);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Parse `sq status --json` output
pub fn status_json(temp: &TempDir) -> serde_json::Value {
    let output = sq().args(["status", "--json"]).current_dir(temp.path()).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

/// A ws:// URL on a local port with nothing listening
pub fn dead_remote_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{addr}")
}
