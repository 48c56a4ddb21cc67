// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine: moves queued actions from the local store to their handlers.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────────┐     ┌───────────────┐
//! │ Connectivity │────►│ SyncCoordinator │────►│ HandlerRegistry│
//! │  (watch)     │     │  (passes)       │     │ (per type)     │
//! └──────────────┘     └─────────────────┘     └───────────────┘
//!        ▲                 │        │                  │
//!        │                 ▼        ▼                  ▼
//! ┌──────────────┐   ┌──────────┐ ┌──────────────┐ ┌───────────────┐
//! │    Probe     │   │ActionStore│ │StatusTracker │ │ RemoteHandler │
//! └──────────────┘   └──────────┘ └──────────────┘ │  (Transport)  │
//!                                                  └───────────────┘
//! ```
//!
//! # Features
//!
//! - Single-flight passes over the durable queue, in per-type creation order
//! - Bounded retries with exponential backoff and follow-up scheduling
//! - Passes on reconnect, on request, and on a periodic timer
//! - Observable status and per-pass results
//! - Injectable transport and connectivity for testing

mod connectivity;
mod coordinator;
mod probe;
mod registry;
mod remote;
mod status;
mod transport;

pub use connectivity::{Connectivity, ConnectivityMonitor};
pub use coordinator::{
    ActionOutcome, CoordinatorConfig, SkipReason, SyncCoordinator, SyncPassResult,
};
pub use probe::{run_probe, ProbeConfig};
pub use registry::{ActionHandler, HandlerFuture, HandlerRegistry};
pub use remote::RemoteHandler;
pub use status::{StatusSnapshot, StatusTracker, SyncPhase};
pub use transport::{Transport, TransportError, TransportFuture, TransportResult, WebSocketTransport};

#[cfg(test)]
pub(crate) mod test_helpers;
