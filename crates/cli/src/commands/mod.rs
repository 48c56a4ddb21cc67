// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod discard;
pub mod enqueue;
pub mod init;
pub mod list;
pub mod offline;
pub mod purge;
pub mod reset;
pub mod status;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use sq_core::ActionStore;

use crate::config::{find_work_dir, get_db_path, Config};
use crate::display::SyncMode;
use crate::error::{Error, Result};
use crate::sync::{
    Connectivity, CoordinatorConfig, HandlerRegistry, RemoteHandler, SyncCoordinator,
    WebSocketTransport,
};

/// An opened `.studyq/` directory: its store and configuration.
pub struct Workspace {
    pub store: Arc<ActionStore>,
    pub config: Config,
    pub work_dir: PathBuf,
}

impl Workspace {
    /// Open the workspace found by walking up from the current directory.
    pub fn find() -> Result<Self> {
        Self::open(find_work_dir()?)
    }

    pub fn open(work_dir: PathBuf) -> Result<Self> {
        let config = Config::load(&work_dir)?;
        let store = ActionStore::open(&get_db_path(&work_dir))?;
        Ok(Workspace { store: Arc::new(store), config, work_dir })
    }

    pub fn sync_mode(&self) -> SyncMode {
        if self.config.remote.is_none() {
            SyncMode::NoRemote
        } else if self.config.sync.offline_mode {
            SyncMode::OfflineMode
        } else {
            SyncMode::Online
        }
    }

    /// Build a coordinator that delivers every action type to the configured remote.
    ///
    /// Without a remote the registry is empty; callers keep connectivity
    /// offline so passes are skipped rather than failing every action.
    pub fn coordinator(&self, connectivity: Arc<dyn Connectivity>) -> SyncCoordinator {
        let mut registry = HandlerRegistry::new();
        if let Some(remote) = &self.config.remote {
            let transport = WebSocketTransport::with_connect_timeout(remote.connect_timeout());
            registry.register_all(Arc::new(RemoteHandler::with_transport(&remote.url, transport)));
        }

        let sync = &self.config.sync;
        let config = CoordinatorConfig {
            handler_timeout: sync.handler_timeout(),
            periodic_interval: sync.periodic_interval(),
            auto_sync: sync.auto_sync,
            offline_mode: sync.offline_mode,
        };

        SyncCoordinator::new(
            Arc::clone(&self.store),
            Arc::new(registry),
            self.config.retry.policy(),
            connectivity,
            config,
        )
    }
}

/// Build the runtime for commands that talk to the network.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))
}
