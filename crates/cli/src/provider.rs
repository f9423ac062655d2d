// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wires the store, sync engine, connectivity probe and scheduler together
//! and publishes a single observable [`OfflineState`].
//!
//! Mounting does the start-up housekeeping (expired cache, stuck
//! mutations, old successes) before anything is scheduled. Unmounting stops
//! every task the provider started.

use std::sync::Arc;
use std::time::Duration;

use ac_core::{
    EventBus, MutationQueue, MutationQueueItem, ResponseCache, RetryPolicy, Subscription,
    SyncConflict,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, OfflineApi};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::sync::{
    BackgroundSync, ConnectivityMonitor, PlatformInfo, ProbeHandle, SchedulerOptions, SyncEngine,
    SyncFuture, SyncResult, SyncTarget, SyncTrigger,
};

/// What the UI shows about the outbox.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineState {
    pub is_online: bool,
    pub is_syncing: bool,
    pub pending_count: u64,
    pub last_sync: Option<DateTime<Utc>>,
    pub conflicts: Vec<SyncConflict>,
    /// Mutations paused until the user signs in again.
    pub auth_expired_count: usize,
}

impl OfflineState {
    /// Reads the store-derived fields; `is_syncing` starts false.
    pub fn from_store(queue: &MutationQueue, is_online: bool) -> Result<Self> {
        let mut state = OfflineState {
            is_online,
            ..Default::default()
        };
        fill_from_store(&mut state, queue)?;
        Ok(state)
    }
}

/// Start-up housekeeping and background task settings.
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    pub retry: RetryPolicy,
    pub stuck_after: chrono::Duration,
    pub completed_retention: chrono::Duration,
    /// Connectivity probe cadence; no probe when `None`.
    pub probe_interval: Option<Duration>,
    /// Background scheduler settings; no scheduler when `None`.
    pub scheduler: Option<SchedulerOptions>,
}

impl ProviderOptions {
    pub fn from_config(sync: &SyncConfig) -> Self {
        ProviderOptions {
            retry: sync.retry_policy(),
            stuck_after: sync.stuck_after(),
            completed_retention: sync.completed_retention(),
            probe_interval: Some(sync.probe_interval()),
            scheduler: Some(SchedulerOptions::from_config(sync)),
        }
    }

    /// Housekeeping only: no probe, no scheduler.
    pub fn foreground(sync: &SyncConfig) -> Self {
        ProviderOptions {
            probe_interval: None,
            scheduler: None,
            ..Self::from_config(sync)
        }
    }
}

/// Collaborators the provider is built from.
pub struct ProviderParts {
    pub client: Arc<dyn ApiClient>,
    pub queue: MutationQueue,
    pub cache: ResponseCache,
    pub events: EventBus,
    pub connectivity: ConnectivityMonitor,
    pub platform: Option<Arc<dyn PlatformInfo>>,
}

/// Runs passes on behalf of the provider, keeping `is_syncing` current.
struct SyncRunner {
    engine: Arc<SyncEngine>,
    state: Arc<watch::Sender<OfflineState>>,
}

impl SyncRunner {
    /// Returns `None` without syncing when a pass is already running.
    async fn run(&self, trigger: SyncTrigger) -> Option<Result<SyncResult>> {
        let started = self.state.send_if_modified(|s| {
            if s.is_syncing {
                false
            } else {
                s.is_syncing = true;
                true
            }
        });
        if !started {
            return None;
        }

        let _flag = SyncingFlag(&self.state);
        Some(self.engine.perform_sync(trigger).await)
    }
}

/// Clears `is_syncing` when the pass ends, including when the caller drops
/// the future before it completes.
struct SyncingFlag<'a>(&'a watch::Sender<OfflineState>);

impl Drop for SyncingFlag<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|s| s.is_syncing = false);
    }
}

impl SyncTarget for SyncRunner {
    fn run_sync(&self, trigger: SyncTrigger) -> SyncFuture<'_, Result<SyncResult>> {
        Box::pin(async move {
            self.run(trigger)
                .await
                .unwrap_or_else(|| Ok(SyncResult::skipped()))
        })
    }
}

pub struct OfflineProvider {
    queue: MutationQueue,
    events: EventBus,
    connectivity: ConnectivityMonitor,
    api: OfflineApi,
    runner: Arc<SyncRunner>,
    state: Arc<watch::Sender<OfflineState>>,
    subscription: Option<Subscription>,
    watcher: (CancellationToken, JoinHandle<()>),
    probe: Option<ProbeHandle>,
    scheduler: Option<BackgroundSync>,
}

impl OfflineProvider {
    /// Opens the store, runs housekeeping and starts background tasks.
    ///
    /// Must be called from within a Tokio runtime. Housekeeping failures are
    /// logged and skipped; failing to open the store is an error.
    pub fn mount(parts: ProviderParts, options: ProviderOptions) -> Result<Self> {
        let ProviderParts {
            client,
            queue,
            cache,
            events,
            connectivity,
            platform,
        } = parts;

        queue.store().connection()?;
        housekeeping(&queue, &cache, &options);

        let mut initial = OfflineState {
            is_online: connectivity.is_online(),
            ..Default::default()
        };
        if let Err(e) = fill_from_store(&mut initial, &queue) {
            warn!(error = %e, "could not read outbox state");
        }
        let state = Arc::new(watch::Sender::new(initial));

        let listener_queue = queue.clone();
        let listener_state = Arc::clone(&state);
        let subscription = events.subscribe(move |event| {
            debug!(event = event.name(), "refreshing offline state");
            refresh_state(&listener_state, &listener_queue);
        });

        let watcher = spawn_connectivity_watcher(connectivity.clone(), Arc::clone(&state));

        let engine = Arc::new(SyncEngine::new(
            Arc::clone(&client),
            queue.clone(),
            cache.clone(),
            events.clone(),
            options.retry,
        ));
        let runner = Arc::new(SyncRunner {
            engine,
            state: Arc::clone(&state),
        });

        let probe = options
            .probe_interval
            .map(|interval| connectivity.start_probe(Arc::clone(&client), interval));
        let scheduler = options.scheduler.map(|scheduler_options| {
            BackgroundSync::start(
                scheduler_options,
                Arc::clone(&runner) as Arc<dyn SyncTarget>,
                connectivity.clone(),
                platform,
            )
        });

        let api = OfflineApi::new(client, queue.clone(), cache, connectivity.clone(), events.clone());

        info!("offline provider mounted");
        Ok(OfflineProvider {
            queue,
            events,
            connectivity,
            api,
            runner,
            state,
            subscription: Some(subscription),
            watcher,
            probe,
            scheduler,
        })
    }

    pub fn state(&self) -> OfflineState {
        self.state.borrow().clone()
    }

    /// Receiver notified whenever the state changes.
    pub fn subscribe(&self) -> watch::Receiver<OfflineState> {
        self.state.subscribe()
    }

    pub fn api(&self) -> &OfflineApi {
        &self.api
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    /// Recounts pending mutations and publishes the result.
    pub fn refresh_pending_count(&self) -> Result<u64> {
        let count = self.queue.count_pending()?;
        self.state.send_if_modified(|s| {
            let changed = s.pending_count != count;
            s.pending_count = count;
            changed
        });
        Ok(count)
    }

    /// Runs a manual pass. Returns `None` while another pass is running.
    pub async fn trigger_sync(&self) -> Option<Result<SyncResult>> {
        self.runner.run(SyncTrigger::Manual).await
    }

    /// Dismisses the conflict recorded for `mutation_id`.
    pub fn clear_conflict(&self, mutation_id: &str) -> Result<bool> {
        let cleared = self.queue.clear_conflict(mutation_id)?;
        if cleared {
            refresh_state(&self.state, &self.queue);
        }
        Ok(cleared)
    }

    pub fn auth_expired_mutations(&self) -> Result<Vec<MutationQueueItem>> {
        Ok(self.queue.auth_expired_mutations()?)
    }

    /// Stops the scheduler, the probe and the state watchers.
    pub async fn unmount(mut self) {
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.stop().await;
        }
        if let Some(probe) = self.probe.take() {
            probe.stop().await;
        }
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        let (cancel, task) = self.watcher;
        cancel.cancel();
        let _ = task.await;
        info!("offline provider unmounted");
    }
}

fn housekeeping(queue: &MutationQueue, cache: &ResponseCache, options: &ProviderOptions) {
    match cache.sweep_expired() {
        Ok(swept) if swept > 0 => info!(swept, "removed expired cached responses"),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "cache sweep failed"),
    }
    match queue.clean_stuck_mutations(options.retry.max_retries, options.stuck_after) {
        Ok(cleaned) if cleaned > 0 => info!(cleaned, "cleaned stuck mutations"),
        Ok(_) => {}
        Err(e) => warn!(error = %e, "stuck mutation cleanup failed"),
    }
    if let Err(e) = queue.purge_completed(options.completed_retention) {
        warn!(error = %e, "purging completed mutations failed");
    }
}

fn fill_from_store(state: &mut OfflineState, queue: &MutationQueue) -> ac_core::Result<()> {
    state.pending_count = queue.count_pending()?;
    state.last_sync = queue.last_sync()?;
    state.conflicts = queue.conflicts()?;
    state.auth_expired_count = queue.auth_expired_mutations()?.len();
    Ok(())
}

/// Reloads the store-derived fields, keeping the live flags.
fn refresh_state(state: &watch::Sender<OfflineState>, queue: &MutationQueue) {
    let mut next = state.borrow().clone();
    if let Err(e) = fill_from_store(&mut next, queue) {
        warn!(error = %e, "could not refresh outbox state");
        return;
    }
    state.send_if_modified(|s| {
        next.is_online = s.is_online;
        next.is_syncing = s.is_syncing;
        if *s == next {
            false
        } else {
            *s = next;
            true
        }
    });
}

fn spawn_connectivity_watcher(
    connectivity: ConnectivityMonitor,
    state: Arc<watch::Sender<OfflineState>>,
) -> (CancellationToken, JoinHandle<()>) {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let mut rx = connectivity.subscribe();

    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let online = *rx.borrow_and_update();
                    state.send_if_modified(|s| {
                        let changed = s.is_online != online;
                        s.is_online = online;
                        changed
                    });
                }
            }
        }
    });

    (cancel, task)
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
