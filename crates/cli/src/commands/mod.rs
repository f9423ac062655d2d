// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod cleanup;
pub mod conflicts;
pub mod export;
pub mod get;
pub mod init;
pub mod queue;
pub mod reset;
pub mod send;
pub mod status;
pub mod sync;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ac_core::{MutationQueue, NewMutation, ResponseCache, StoreHandle};
use serde::Serialize;

use crate::api::HttpApiClient;
use crate::cli::MutationArgs;
use crate::config::{find_work_dir, get_db_path, Config};
use crate::env;
use crate::error::{Error, Result};

/// An initialized `.appcopio/` directory with its loaded config.
pub struct Workspace {
    pub work_dir: PathBuf,
    pub config: Config,
    pub store: StoreHandle,
}

impl Workspace {
    /// Finds the workspace from the current directory.
    pub fn open() -> Result<Self> {
        let work_dir = find_work_dir()?;
        Self::at(&work_dir)
    }

    pub fn at(work_dir: &Path) -> Result<Self> {
        let config = Config::load(work_dir)?;
        let store = StoreHandle::at_path(get_db_path(work_dir));
        Ok(Workspace {
            work_dir: work_dir.to_path_buf(),
            config,
            store,
        })
    }

    pub fn queue(&self) -> MutationQueue {
        MutationQueue::new(self.store.clone())
    }

    pub fn cache(&self) -> ResponseCache {
        ResponseCache::new(self.store.clone()).with_horizon(self.config.sync.cache_horizon())
    }

    /// HTTP client for the configured backend, authenticated with
    /// `APPCOPIO_TOKEN` when set.
    pub fn client(&self) -> Result<Arc<HttpApiClient>> {
        Ok(Arc::new(HttpApiClient::new(
            &self.config.api,
            env::api_token(),
        )?))
    }
}

/// Single-threaded runtime for one-shot commands.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Runtime(e.to_string()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Splits `NAME:VALUE`, trimming both sides.
pub fn parse_header(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| Error::InvalidHeader(raw.to_string()))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(Error::InvalidHeader(raw.to_string()));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Builds the mutation described by command-line arguments.
pub fn parse_mutation(args: MutationArgs) -> Result<NewMutation> {
    let mut new = NewMutation::new(args.method, args.url).with_priority(args.priority);
    if let Some(raw) = args.data {
        let data = serde_json::from_str(&raw).map_err(|e| Error::InvalidData(e.to_string()))?;
        new = new.with_data(data);
    }
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        new = new.with_header(name, value);
    }
    new.id = args.id;
    new.entity_type = args.entity_type;
    new.entity_id = args.entity_id;
    new.optimistic_id = args.optimistic_id;
    Ok(new)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
