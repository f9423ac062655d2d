// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use serde_json::json;

use crate::api::{ApiClient, FetchSource};
use crate::cli::OutputFormat;
use crate::error::Result;

use super::send::offline_api;
use super::{print_json, runtime, Workspace};

pub fn run(url: &str, output: OutputFormat) -> Result<()> {
    let ws = Workspace::open()?;
    let client: Arc<dyn ApiClient> = ws.client()?;
    let fetched = runtime()?.block_on(async {
        let api = offline_api(client, ws.queue(), ws.cache()).await;
        api.get(url).await
    })?;

    match output {
        OutputFormat::Text => {
            if let (FetchSource::Cache, Some(at)) = (fetched.source, fetched.cached_at) {
                eprintln!("offline: serving copy cached at {}", at.format("%Y-%m-%d %H:%M:%S"));
            }
            println!("{}", serde_json::to_string_pretty(&fetched.data)?);
        }
        OutputFormat::Json => {
            let source = match fetched.source {
                FetchSource::Network => "network",
                FetchSource::Cache => "cache",
            };
            print_json(&json!({
                "source": source,
                "cachedAt": fetched.cached_at,
                "data": fetched.data,
            }))?;
        }
    }
    Ok(())
}
