// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use ac_core::{EventBus, MutationQueue, ResponseCache, RetryPolicy};

use crate::api::ApiClient;
use crate::cli::OutputFormat;
use crate::display::format_sync_result;
use crate::error::Result;
use crate::sync::{SyncEngine, SyncResult, SyncTrigger};

use super::{print_json, runtime, Workspace};

pub fn run(output: OutputFormat) -> Result<()> {
    let ws = Workspace::open()?;
    let client: Arc<dyn ApiClient> = ws.client()?;
    let queue = ws.queue();
    let policy = ws.config.sync.retry_policy();
    let result = runtime()?.block_on(run_impl(client, queue.clone(), ws.cache(), policy))?;

    let Some(result) = result else {
        let pending = queue.count_pending()?;
        match output {
            OutputFormat::Text => {
                println!("Backend unreachable; {} mutation(s) still pending.", pending)
            }
            OutputFormat::Json => print_json(&serde_json::json!({
                "online": false,
                "pending": pending,
            }))?,
        }
        return Ok(());
    };

    match output {
        OutputFormat::Text => println!("{}", format_sync_result(&result)),
        OutputFormat::Json => print_json(&serde_json::json!({
            "online": true,
            "success": result.success,
            "failed": result.failed,
            "conflicts": result.conflicts,
            "total": result.total,
            "durationMs": result.duration.as_millis() as u64,
            "skipped": result.skipped,
        }))?,
    }
    Ok(())
}

/// Runs one manual pass. Returns `None` without touching the outbox when
/// the backend does not answer the probe.
pub(crate) async fn run_impl(
    client: Arc<dyn ApiClient>,
    queue: MutationQueue,
    cache: ResponseCache,
    policy: RetryPolicy,
) -> Result<Option<SyncResult>> {
    if !client.probe().await {
        return Ok(None);
    }
    let engine = SyncEngine::new(client, queue, cache, EventBus::new(), policy);
    Ok(Some(engine.perform_sync(SyncTrigger::Manual).await?))
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
