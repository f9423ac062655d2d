// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use ac_core::{EventBus, MutationQueue, ResponseCache};
use serde_json::json;

use crate::api::{ApiClient, MutationOutcome, OfflineApi};
use crate::cli::{MutationArgs, OutputFormat};
use crate::error::Result;
use crate::sync::ConnectivityMonitor;

use super::{parse_mutation, print_json, runtime, Workspace};

pub fn run(args: MutationArgs, output: OutputFormat) -> Result<()> {
    let new = parse_mutation(args)?;
    let ws = Workspace::open()?;
    let client: Arc<dyn ApiClient> = ws.client()?;
    let outcome = runtime()?.block_on(async {
        let api = offline_api(client, ws.queue(), ws.cache()).await;
        api.mutate(new).await
    })?;

    match output {
        OutputFormat::Text => match &outcome {
            MutationOutcome::Sent(response) => {
                println!("Sent: HTTP {}", response.status);
                if let Some(body) = &response.body {
                    println!("{}", serde_json::to_string_pretty(body)?);
                }
            }
            MutationOutcome::Queued(item) => {
                println!("Backend unreachable, queued {} for the next sync", item.id);
            }
        },
        OutputFormat::Json => {
            let value = match &outcome {
                MutationOutcome::Sent(response) => json!({
                    "outcome": "sent",
                    "status": response.status,
                    "body": response.body,
                }),
                MutationOutcome::Queued(item) => json!({
                    "outcome": "queued",
                    "mutation": item,
                }),
            };
            print_json(&value)?;
        }
    }
    Ok(())
}

/// Probes the backend once and wraps the client for offline use.
pub(crate) async fn offline_api(
    client: Arc<dyn ApiClient>,
    queue: MutationQueue,
    cache: ResponseCache,
) -> OfflineApi {
    let connectivity = ConnectivityMonitor::new(false);
    connectivity.check(client.as_ref()).await;
    OfflineApi::new(client, queue, cache, connectivity, EventBus::new())
}

#[cfg(test)]
#[path = "send_tests.rs"]
mod tests;
