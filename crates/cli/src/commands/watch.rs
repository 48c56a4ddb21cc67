// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running sync loop.
//!
//! Probes the remote in the background and lets the coordinator sync on
//! reconnect, on the periodic timer, and when retry delays elapse. Runs
//! until interrupted.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use super::{runtime, Workspace};
use crate::display::format_pass_result;
use crate::error::Result;
use crate::sync::{run_probe, ConnectivityMonitor, ProbeConfig, SyncPassResult, WebSocketTransport};

const PROBE_INITIAL_DELAY: Duration = Duration::from_millis(500);
const PROBE_CHECK_INTERVAL: Duration = Duration::from_secs(30);

pub fn run() -> Result<()> {
    let ws = Workspace::find()?;
    let cancel = CancellationToken::new();

    runtime()?.block_on(async {
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_signal.cancel();
            }
        });

        println!("Watching for actions to sync (Ctrl-C to stop)");
        run_impl(&ws, cancel).await
    })
}

pub(crate) async fn run_impl(ws: &Workspace, cancel: CancellationToken) -> Result<()> {
    let monitor = Arc::new(ConnectivityMonitor::new(false));
    let coordinator = ws.coordinator(monitor.clone());

    let probe = match &ws.config.remote {
        Some(remote) => {
            let config = ProbeConfig {
                url: remote.url.clone(),
                initial_delay: PROBE_INITIAL_DELAY,
                max_delay: Duration::from_secs(remote.probe_max_delay_secs),
                check_interval: PROBE_CHECK_INTERVAL,
            };
            let connect_timeout = remote.connect_timeout();
            Some(tokio::spawn(run_probe(
                config,
                Arc::clone(&monitor),
                move || WebSocketTransport::with_connect_timeout(connect_timeout),
                cancel.clone(),
            )))
        }
        None => {
            eprintln!("warning: no remote configured; actions stay queued");
            None
        }
    };

    let printer = tokio::spawn(print_results(coordinator.subscribe_results(), cancel.clone()));

    let result = coordinator.run(cancel.clone()).await;

    cancel.cancel();
    if let Some(probe) = probe {
        let _ = probe.await;
    }
    let _ = printer.await;
    result
}

async fn print_results(mut results: broadcast::Receiver<SyncPassResult>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            received = results.recv() => match received {
                Ok(result) => println!("{}", format_pass_result(&result)),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::debug!(missed, "result printer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
