// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline status consumed by the sync coordinator.
//!
//! The engine never detects the network itself. A platform layer (or the
//! reachability probe in [`super::probe`]) pushes status into a
//! [`ConnectivityMonitor`]; the coordinator only reads the current value
//! and waits for changes.

use tokio::sync::watch;

/// Point-in-time and streamed online status.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;

    /// Receiver that wakes on every status change.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Connectivity source fed by explicit status updates.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(online: bool) -> Self {
        let (tx, _) = watch::channel(online);
        ConnectivityMonitor { tx }
    }

    /// Record the current status. Returns true if it changed.
    ///
    /// Repeating the current value does not wake subscribers.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            tracing::info!(online, "connectivity changed");
        }
        changed
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Connectivity for ConnectivityMonitor {
    fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
