// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sqrs - offline action queue and sync engine for the study planner.
//!
//! This crate provides the `sq` CLI and the engine behind it: actions are
//! recorded in a durable SQLite-backed queue while offline and replayed to
//! a remote endpoint, with retries, once it is reachable.
//!
//! # Main Components
//!
//! - [`sync::SyncCoordinator`] - Runs sync passes and decides when to run them
//! - [`sync::HandlerRegistry`] - Maps action types to the handlers that deliver them
//! - [`sync::StatusTracker`] - Observable queue status for presentation layers
//! - [`Config`] - Project configuration (remote, retry policy, scheduling)
//! - [`Error`] - Error types for all operations
//!
//! # Embedding
//!
//! ```rust,ignore
//! use sqrs::sync::{ConnectivityMonitor, CoordinatorConfig, HandlerRegistry, SyncCoordinator};
//!
//! let store = Arc::new(ActionStore::open(&db_path)?);
//! let monitor = Arc::new(ConnectivityMonitor::new(false));
//! let mut registry = HandlerRegistry::new();
//! registry.register(ActionType::TaskCompleted, Arc::new(MyTaskHandler));
//!
//! let coordinator = SyncCoordinator::new(
//!     store, Arc::new(registry), RetryPolicy::default(), monitor.clone(),
//!     CoordinatorConfig::default(),
//! );
//! let runner = coordinator.clone();
//! tokio::spawn(async move { runner.run(cancel).await });
//! monitor.set_online(true); // platform network callback
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, PurgeTarget, Toggle};
pub use config::{find_work_dir, get_db_path, init_work_dir, Config};
pub use error::{Error, Result};

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init { remote, path } => commands::init::run(remote, path),
        Command::Enqueue { action_type, data } => commands::enqueue::run(&action_type, &data),
        Command::Pending { json } => commands::list::pending(json),
        Command::Failed { json } => commands::list::failed(json),
        Command::Status { json } => commands::status::run(json),
        Command::Sync => commands::sync::run(),
        Command::Watch => commands::watch::run(),
        Command::Purge { target } => commands::purge::run(target),
        Command::Discard { id } => commands::discard::run(&id),
        Command::Offline { state } => commands::offline::run(state),
        Command::Reset { yes } => commands::reset::run(yes),
    }
}
