// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connectivity tracking.
//!
//! The monitor holds the current online flag in a watch channel so the
//! scheduler and provider can react to transitions. A background probe task
//! asks the backend's health endpoint at a fixed interval and feeds the
//! answer back into the monitor.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::ApiClient;

/// Shared online/offline flag. Clones observe the same state.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    tx: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_online);
        ConnectivityMonitor { tx: Arc::new(tx) }
    }

    pub fn is_online(&self) -> bool {
        *self.tx.borrow()
    }

    /// Records the current connectivity. Returns true on a transition.
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
            if online {
                info!("connection restored");
            } else {
                info!("connection lost, working offline");
            }
        }
        changed
    }

    /// Receiver notified on every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Probes once and records the answer.
    pub async fn check(&self, client: &dyn ApiClient) -> bool {
        let online = client.probe().await;
        self.set_online(online);
        online
    }

    /// Spawns a task that probes the backend every `interval`.
    ///
    /// The first probe runs immediately.
    pub fn start_probe(&self, client: Arc<dyn ApiClient>, interval: Duration) -> ProbeHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let monitor = self.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let online = monitor.check(client.as_ref()).await;
                        debug!(online, "connectivity probe");
                    }
                }
            }
        });

        ProbeHandle { cancel, task }
    }
}

/// Running probe task.
pub struct ProbeHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ProbeHandle {
    /// Cancels the probe and waits for it to exit.
    pub async fn stop(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
