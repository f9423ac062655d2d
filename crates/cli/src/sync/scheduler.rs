// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Background sync scheduling.
//!
//! The scheduler runs a pass every `interval`, and once more after each
//! offline → online transition once the connection has held for
//! `debounce`. Every run is gated on connectivity and platform guards.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, Sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::connectivity::ConnectivityMonitor;
use super::engine::{SyncEngine, SyncResult, SyncTrigger};
use super::platform::{PlatformInfo, SyncGuards};
use crate::config::SyncConfig;
use crate::error::Result;

/// Boxed future returned by [`SyncTarget::run_sync`].
pub type SyncFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Something the scheduler can ask to run a pass.
pub trait SyncTarget: Send + Sync {
    fn run_sync(&self, trigger: SyncTrigger) -> SyncFuture<'_, Result<SyncResult>>;
}

impl SyncTarget for SyncEngine {
    fn run_sync(&self, trigger: SyncTrigger) -> SyncFuture<'_, Result<SyncResult>> {
        Box::pin(self.perform_sync(trigger))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub interval: Duration,
    pub debounce: Duration,
    pub guards: SyncGuards,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        SchedulerOptions {
            interval: Duration::from_secs(300),
            debounce: Duration::from_secs(2),
            guards: SyncGuards::default(),
        }
    }
}

impl SchedulerOptions {
    pub fn from_config(sync: &SyncConfig) -> Self {
        SchedulerOptions {
            interval: sync.interval(),
            debounce: sync.debounce(),
            guards: SyncGuards::from_config(sync),
        }
    }
}

/// Handle to the running scheduler task.
pub struct BackgroundSync {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl BackgroundSync {
    /// Spawns the scheduler on the current runtime.
    pub fn start(
        options: SchedulerOptions,
        target: Arc<dyn SyncTarget>,
        connectivity: ConnectivityMonitor,
        platform: Option<Arc<dyn PlatformInfo>>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let scheduler = Scheduler {
            options,
            target,
            connectivity,
            platform,
        };
        let task = tokio::spawn(scheduler.run(cancel.clone()));
        info!(
            interval_secs = options.interval.as_secs(),
            "background sync started"
        );
        BackgroundSync { cancel, task }
    }

    /// Stops scheduling. An in-flight pass finishes first.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.task.await;
        info!("background sync stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

struct Scheduler {
    options: SchedulerOptions,
    target: Arc<dyn SyncTarget>,
    connectivity: ConnectivityMonitor,
    platform: Option<Arc<dyn PlatformInfo>>,
}

impl Scheduler {
    async fn run(self, cancel: CancellationToken) {
        let interval = self.options.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut online_rx = self.connectivity.subscribe();
        let mut was_online = *online_rx.borrow_and_update();
        let mut debounce: Option<Pin<Box<Sleep>>> = None;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                changed = online_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let online = *online_rx.borrow_and_update();
                    if online && !was_online {
                        debounce = Some(Box::pin(tokio::time::sleep(self.options.debounce)));
                    } else if !online {
                        debounce = None;
                    }
                    was_online = online;
                }
                _ = wait_for(&mut debounce) => {
                    debounce = None;
                    self.run_cycle(SyncTrigger::Connectivity).await;
                }
                _ = ticker.tick() => {
                    self.run_cycle(SyncTrigger::Background).await;
                }
            }
        }
    }

    async fn run_cycle(&self, trigger: SyncTrigger) {
        let online = self.connectivity.is_online();
        if let Some(reason) = self
            .options
            .guards
            .skip_reason(online, self.platform.as_deref())
        {
            debug!(%trigger, %reason, "skipping sync");
            return;
        }

        match self.target.run_sync(trigger).await {
            Ok(result) if result.skipped => debug!(%trigger, "sync already running"),
            Ok(_) => {}
            Err(e) => warn!(%trigger, error = %e, "background sync failed"),
        }
    }
}

/// Waits for the debounce timer, or forever when none is armed.
async fn wait_for(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
