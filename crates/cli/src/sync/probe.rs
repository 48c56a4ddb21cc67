// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reachability probe that feeds a [`ConnectivityMonitor`].
//!
//! Periodically connects to the endpoint and exchanges a ping. A successful
//! round trip marks the monitor online; a failure marks it offline and backs
//! off exponentially before the next attempt.

use std::sync::Arc;
use std::time::Duration;

use sq_core::protocol::{ClientMessage, ServerMessage};
use tokio_util::sync::CancellationToken;

use super::connectivity::ConnectivityMonitor;
use super::transport::{Transport, TransportError, TransportResult};

/// Timing for the reachability probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub url: String,
    /// Wait after the first failure.
    pub initial_delay: Duration,
    /// Cap on the wait between failed attempts.
    pub max_delay: Duration,
    /// Wait between checks while reachable.
    pub check_interval: Duration,
}

impl ProbeConfig {
    pub fn new(url: impl Into<String>) -> Self {
        ProbeConfig {
            url: url.into(),
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            check_interval: Duration::from_secs(30),
        }
    }
}

/// Probe until `cancel` fires, building a fresh transport for each attempt.
pub async fn run_probe<T, F>(
    config: ProbeConfig,
    monitor: Arc<ConnectivityMonitor>,
    mut make_transport: F,
    cancel: CancellationToken,
) where
    T: Transport,
    F: FnMut() -> T,
{
    let mut delay = config.initial_delay;
    let mut ping_id = 0u64;

    loop {
        ping_id = ping_id.wrapping_add(1);
        let mut transport = make_transport();

        let reachable = tokio::select! {
            _ = cancel.cancelled() => return,
            result = check(&mut transport, &config.url, ping_id) => result,
        };

        let wait = match reachable {
            Ok(()) => {
                monitor.set_online(true);
                delay = config.initial_delay;
                config.check_interval
            }
            Err(e) => {
                tracing::debug!(url = %config.url, error = %e, ?delay, "endpoint unreachable");
                monitor.set_online(false);
                let wait = delay;
                delay = std::cmp::min(delay.saturating_mul(2), config.max_delay);
                wait
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(wait) => {}
        }
    }
}

/// One connect + ping round trip.
async fn check<T: Transport>(transport: &mut T, url: &str, ping_id: u64) -> TransportResult<()> {
    transport.connect(url).await?;
    let result = ping(transport, ping_id).await;
    let _ = transport.disconnect().await;
    result
}

async fn ping<T: Transport>(transport: &mut T, id: u64) -> TransportResult<()> {
    transport.send(ClientMessage::ping(id)).await?;
    loop {
        match transport.recv().await? {
            Some(ServerMessage::Pong { id: echoed }) if echoed == id => return Ok(()),
            Some(_) => continue,
            None => return Err(TransportError::ConnectionClosed),
        }
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
