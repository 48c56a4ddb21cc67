// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::Error;
use tempfile::TempDir;

#[test]
fn creates_config_and_database() {
    let temp = TempDir::new().unwrap();
    let work_dir = run_impl(temp.path(), Some("ws://localhost:7890".into())).unwrap();

    assert_eq!(work_dir, temp.path().join(".studyq"));
    assert!(get_db_path(&work_dir).exists());
    let config = Config::load(&work_dir).unwrap();
    assert_eq!(config.remote_url(), Some("ws://localhost:7890"));
}

#[test]
fn without_remote() {
    let temp = TempDir::new().unwrap();
    let work_dir = run_impl(temp.path(), None).unwrap();
    assert_eq!(Config::load(&work_dir).unwrap(), Config::default());
}

#[test]
fn invalid_remote_leaves_nothing_behind() {
    let temp = TempDir::new().unwrap();
    let err = run_impl(temp.path(), Some("http://example.com".into())).unwrap_err();

    assert!(matches!(err, Error::InvalidRemoteUrl(_)));
    assert!(!temp.path().join(".studyq").exists());
}

#[test]
fn second_init_fails() {
    let temp = TempDir::new().unwrap();
    run_impl(temp.path(), None).unwrap();
    assert!(matches!(run_impl(temp.path(), None), Err(Error::AlreadyInitialized(_))));
}
