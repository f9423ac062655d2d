// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running mode: probe connectivity, replay the outbox on the
//! scheduler's cadence and print state changes until interrupted.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use ac_core::EventBus;
use tracing::info;

use crate::api::ApiClient;
use crate::config::{get_lock_path, get_log_path};
use crate::error::{Error, Result};
use crate::provider::{OfflineProvider, OfflineState, ProviderOptions, ProviderParts};
use crate::sync::{ConnectivityMonitor, PlatformInfo, SystemPlatform};

use super::Workspace;

pub fn run() -> Result<()> {
    let ws = Workspace::open()?;
    let _lock = acquire_lock(&get_lock_path(&ws.work_dir))?;
    setup_logging(&get_log_path(&ws.work_dir));

    let client: Arc<dyn ApiClient> = ws.client()?;
    let platform: Arc<dyn PlatformInfo> = Arc::new(SystemPlatform::from_config(&ws.config.sync));
    let parts = ProviderParts {
        client,
        queue: ws.queue(),
        cache: ws.cache(),
        events: EventBus::new(),
        connectivity: ConnectivityMonitor::new(false),
        platform: Some(platform),
    };
    let options = ProviderOptions::from_config(&ws.config.sync);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))?;

    runtime.block_on(async move {
        let provider = OfflineProvider::mount(parts, options)?;
        info!(base_url = %ws.config.api.base_url, "watching outbox");
        println!("Watching {} (Ctrl-C to stop)", ws.config.api.base_url);

        let mut rx = provider.subscribe();
        println!("{}", summary(&rx.borrow_and_update()));
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    println!("{}", summary(&rx.borrow_and_update()));
                }
            }
        }

        provider.unmount().await;
        println!("Stopped.");
        Ok::<(), Error>(())
    })
}

/// One-line state summary printed on every change.
pub(crate) fn summary(state: &OfflineState) -> String {
    let mut line = format!(
        "{} | pending: {} | conflicts: {}",
        if state.is_online { "online" } else { "offline" },
        state.pending_count,
        state.conflicts.len()
    );
    if state.is_syncing {
        line.push_str(" | syncing");
    }
    if state.auth_expired_count > 0 {
        line.push_str(&format!(
            " | {} waiting for sign-in",
            state.auth_expired_count
        ));
    }
    line
}

/// Logs go to `sync.log`, or stderr when it cannot be opened. The filter
/// comes from `RUST_LOG` and defaults to `info`.
fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };
    if result.is_err() {
        eprintln!("warning: logging already initialized");
    }
}

/// Holds `watch.lock` so only one watcher runs per workspace.
pub(crate) fn acquire_lock(lock_path: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    file.try_lock_exclusive()
        .map_err(|_| Error::AlreadyRunning)?;

    Ok(file)
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
