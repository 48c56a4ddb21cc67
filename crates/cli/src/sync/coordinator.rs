// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync coordinator: runs passes over the pending queue and decides when.
//!
//! A pass claims each pending action in `(type, created_at)` order, hands it
//! to its handler, and records the outcome. One failing action never stops
//! the rest of the pass. Actions enqueued while a pass runs wait for the
//! next pass.
//!
//! Passes start on an offline → online edge, on [`SyncCoordinator::request_sync`]
//! or [`SyncCoordinator::trigger`], on the periodic timer while online, and
//! when the longest retry delay from the previous pass has elapsed. At most
//! one pass runs per queue at a time, across coordinators and processes
//! sharing the store's queue lock; overlapping triggers are coalesced.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sq_core::{ActionId, ActionStatus, ActionStore, ActionType, RetryPolicy};
use tokio::sync::{broadcast, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::connectivity::Connectivity;
use super::registry::HandlerRegistry;
use super::status::{StatusTracker, SyncPhase};
use crate::error::Result;

/// Scheduling knobs for a coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub handler_timeout: Duration,
    /// Periodic pass interval while online; `None` disables the timer.
    pub periodic_interval: Option<Duration>,
    /// When false, only explicit requests start passes.
    pub auto_sync: bool,
    /// User toggle that treats the network as unavailable.
    pub offline_mode: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        CoordinatorConfig {
            handler_timeout: Duration::from_secs(10),
            periodic_interval: None,
            auto_sync: true,
            offline_mode: false,
        }
    }
}

/// Why a pass did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Offline,
    OfflineMode,
    AlreadyRunning,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::Offline => "offline",
            SkipReason::OfflineMode => "offline mode enabled",
            SkipReason::AlreadyRunning => "a sync pass is already running",
        };
        f.write_str(s)
    }
}

/// Final state of one action after a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub id: ActionId,
    pub action_type: ActionType,
    pub status: ActionStatus,
    pub retry_count: u32,
    pub reason: Option<String>,
}

/// Summary of one sync pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncPassResult {
    /// Actions claimed and handed to a handler.
    pub attempted: usize,
    pub succeeded: usize,
    /// Actions that became `Failed` during this pass.
    pub failed: usize,
    /// Actions returned to `Pending` for another attempt.
    pub retrying: usize,
    /// Actions skipped because another actor held them.
    pub conflicts: usize,
    pub outcomes: Vec<ActionOutcome>,
    /// Earliest time a follow-up pass is useful.
    pub retry_after: Option<Duration>,
    pub skipped: Option<SkipReason>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SyncPassResult {
    fn empty() -> Self {
        let now = Utc::now();
        SyncPassResult {
            attempted: 0,
            succeeded: 0,
            failed: 0,
            retrying: 0,
            conflicts: 0,
            outcomes: Vec::new(),
            retry_after: None,
            skipped: None,
            started_at: now,
            finished_at: now,
        }
    }

    fn skipped(reason: SkipReason) -> Self {
        SyncPassResult { skipped: Some(reason), ..Self::empty() }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }
}

/// Clears the running flag when a pass ends, even if its future is dropped.
struct PassGuard<'a>(&'a AtomicBool);

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

struct Inner {
    store: Arc<ActionStore>,
    registry: Arc<HandlerRegistry>,
    policy: RetryPolicy,
    connectivity: Arc<dyn Connectivity>,
    config: CoordinatorConfig,
    status: Arc<StatusTracker>,
    offline_mode: AtomicBool,
    running: AtomicBool,
    wake: Notify,
    results: broadcast::Sender<SyncPassResult>,
}

/// Drives sync passes over a shared [`ActionStore`].
///
/// Cheap to clone; clones share one running flag and one result feed.
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<ActionStore>,
        registry: Arc<HandlerRegistry>,
        policy: RetryPolicy,
        connectivity: Arc<dyn Connectivity>,
        config: CoordinatorConfig,
    ) -> Self {
        let (results, _) = broadcast::channel(16);
        let offline_mode = AtomicBool::new(config.offline_mode);
        SyncCoordinator {
            inner: Arc::new(Inner {
                store,
                registry,
                policy,
                connectivity,
                config,
                status: Arc::new(StatusTracker::new()),
                offline_mode,
                running: AtomicBool::new(false),
                wake: Notify::new(),
                results,
            }),
        }
    }

    pub fn status(&self) -> Arc<StatusTracker> {
        Arc::clone(&self.inner.status)
    }

    /// Feed of results from every pass that ran.
    pub fn subscribe_results(&self) -> broadcast::Receiver<SyncPassResult> {
        self.inner.results.subscribe()
    }

    pub fn set_offline_mode(&self, enabled: bool) {
        self.inner.offline_mode.store(enabled, Ordering::Release);
    }

    pub fn offline_mode(&self) -> bool {
        self.inner.offline_mode.load(Ordering::Acquire)
    }

    /// True when passes would be skipped for lack of connectivity.
    pub fn is_operating_offline(&self) -> bool {
        self.offline_mode() || !self.inner.connectivity.is_online()
    }

    /// Requeue actions stranded `InProgress` by a previous crash and load status.
    ///
    /// Recovery needs the queue lock. While another coordinator holds it,
    /// its in-progress actions are live and nothing is requeued.
    pub fn recover(&self) -> Result<usize> {
        let store = &self.inner.store;
        let requeued = match store.try_lock_queue()? {
            Some(_queue) => store.requeue_in_progress()?,
            None => {
                tracing::debug!("queue is being synced elsewhere, skipping recovery");
                0
            }
        };
        self.inner.status.refresh(store)?;
        Ok(requeued)
    }

    /// Start a pass on a background task and return its handle.
    pub fn trigger(&self) -> JoinHandle<Result<SyncPassResult>> {
        let this = self.clone();
        tokio::spawn(async move { this.run_pass().await })
    }

    /// Ask a running [`SyncCoordinator::run`] loop to start a pass.
    pub fn request_sync(&self) {
        self.inner.wake.notify_one();
    }

    /// Run one sync pass.
    ///
    /// Offline and overlapping calls return a skipped result rather than an
    /// error. Store errors abort the pass and are returned.
    pub async fn run_pass(&self) -> Result<SyncPassResult> {
        if self.offline_mode() {
            return Ok(SyncPassResult::skipped(SkipReason::OfflineMode));
        }
        if !self.inner.connectivity.is_online() {
            tracing::debug!("offline, skipping sync pass");
            return Ok(SyncPassResult::skipped(SkipReason::Offline));
        }
        let Some(_guard) = PassGuard::acquire(&self.inner.running) else {
            tracing::debug!("sync pass already running, coalescing");
            return Ok(SyncPassResult::skipped(SkipReason::AlreadyRunning));
        };
        let Some(_queue) = self.inner.store.try_lock_queue()? else {
            tracing::debug!("queue is being synced by another coordinator");
            return Ok(SyncPassResult::skipped(SkipReason::AlreadyRunning));
        };

        let status = &self.inner.status;
        status.set_phase(SyncPhase::Syncing);

        let finished = self.execute_pass().await.and_then(|result| {
            self.record_pass(&result)?;
            Ok(result)
        });

        match finished {
            Ok(result) => {
                status.set_phase(SyncPhase::Synced);
                tracing::info!(
                    attempted = result.attempted,
                    succeeded = result.succeeded,
                    failed = result.failed,
                    retrying = result.retrying,
                    conflicts = result.conflicts,
                    "sync pass finished"
                );
                // No receivers is fine
                let _ = self.inner.results.send(result.clone());
                Ok(result)
            }
            Err(e) => {
                tracing::error!(error = %e, "sync pass aborted");
                status.set_phase(SyncPhase::Error);
                let _ = status.refresh(&self.inner.store);
                Err(e)
            }
        }
    }

    /// Persist the sync time for a clean pass and reload counts.
    fn record_pass(&self, result: &SyncPassResult) -> Result<()> {
        if result.retrying == 0 {
            self.inner.store.set_last_successful_sync_at(result.finished_at)?;
        }
        self.inner.status.refresh(&self.inner.store)?;
        Ok(())
    }

    async fn execute_pass(&self) -> Result<SyncPassResult> {
        let inner = &self.inner;
        let mut result = SyncPassResult::empty();
        let pending = inner.store.list_pending()?;

        for action in pending {
            match inner.store.mark_in_progress(&action.id) {
                Ok(()) => {}
                Err(e) if e.is_conflict() => {
                    tracing::warn!(id = %action.id, error = %e, "action claimed elsewhere, skipping");
                    result.conflicts += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            result.attempted += 1;
            tracing::debug!(id = %action.id, action_type = %action.action_type, "dispatching");
            let outcome = inner.registry.dispatch(&action, inner.config.handler_timeout).await;

            let recorded = match inner.store.record_outcome(&action.id, &outcome, &inner.policy) {
                Ok(recorded) => recorded,
                Err(e) if e.is_conflict() => {
                    tracing::warn!(id = %action.id, error = %e, "action changed during dispatch");
                    result.conflicts += 1;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            match recorded.status {
                ActionStatus::Completed => result.succeeded += 1,
                ActionStatus::Failed => {
                    tracing::warn!(
                        id = %action.id,
                        reason = outcome.reason().unwrap_or_default(),
                        "action failed permanently"
                    );
                    result.failed += 1;
                }
                _ => {
                    result.retrying += 1;
                    result.retry_after = result.retry_after.max(recorded.retry_after);
                }
            }

            result.outcomes.push(ActionOutcome {
                id: action.id,
                action_type: action.action_type,
                status: recorded.status,
                retry_count: recorded.retry_count,
                reason: outcome.reason().map(str::to_string),
            });
        }

        result.finished_at = Utc::now();
        Ok(result)
    }

    /// Event loop: run passes until `cancel` fires.
    ///
    /// Runs [`SyncCoordinator::recover`] first and an initial pass if online.
    pub async fn run(&self, cancel: CancellationToken) -> Result<()> {
        let config = &self.inner.config;
        self.recover()?;

        let mut online_rx = self.inner.connectivity.subscribe();
        // Retry delays arrive here from every pass, including ones started by trigger()
        let mut results = self.subscribe_results();
        let mut was_online = *online_rx.borrow_and_update();
        let mut ticker = config.periodic_interval.map(|every| {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker
        });
        let mut follow_up: Option<Instant> = None;

        if was_online && config.auto_sync {
            self.run_pass_logged().await;
        }

        loop {
            let retry_at = follow_up;
            let retry = async move {
                match retry_at {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };
            let periodic = async {
                match ticker.as_mut() {
                    Some(ticker) => {
                        ticker.tick().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,

                received = results.recv() => {
                    match received {
                        Ok(result) => follow_up = fold_retry(follow_up, result.retry_after),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::debug!(missed, "sync loop missed pass results");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                    continue;
                }

                changed = online_rx.changed() => {
                    if changed.is_err() {
                        tracing::warn!("connectivity source dropped, stopping sync loop");
                        break;
                    }
                    let online = *online_rx.borrow_and_update();
                    let reconnected = online && !was_online;
                    was_online = online;
                    if !(reconnected && config.auto_sync) {
                        continue;
                    }
                    tracing::debug!("reconnected, starting sync pass");
                }

                _ = self.inner.wake.notified() => {
                    tracing::debug!("sync requested");
                }

                _ = periodic => {
                    if !config.auto_sync || !self.inner.connectivity.is_online() {
                        continue;
                    }
                    tracing::debug!("periodic sync");
                }

                _ = retry => {
                    follow_up = None;
                    if !config.auto_sync {
                        continue;
                    }
                    tracing::debug!("retry delay elapsed, starting sync pass");
                }
            }

            self.run_pass_logged().await;
        }

        Ok(())
    }

    /// Run a pass for the event loop; its result comes back through the feed.
    async fn run_pass_logged(&self) {
        // Errors are already logged and reflected in the status phase
        let _ = self.run_pass().await;
    }
}

/// Push the follow-up deadline out to cover `delay` from now.
fn fold_retry(follow_up: Option<Instant>, delay: Option<Duration>) -> Option<Instant> {
    match delay {
        Some(delay) => {
            let at = Instant::now() + delay;
            Some(follow_up.map_or(at, |current| current.max(at)))
        }
        None => follow_up,
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
