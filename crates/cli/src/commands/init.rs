// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use ac_core::StoreHandle;

use crate::config::{get_db_path, init_work_dir, write_gitignore, Config};
use crate::error::Result;

pub fn run(api_url: Option<String>, refresh_path: Option<String>) -> Result<()> {
    let target_path = std::env::current_dir()?;
    let work_dir = run_impl(&target_path, api_url, refresh_path)?;
    let config = Config::load(&work_dir)?;

    println!("Initialized offline store at {}", work_dir.display());
    println!("Backend: {}", config.api.base_url);
    if let Some(path) = &config.api.refresh_path {
        println!("Token refresh: {}", path);
    }
    Ok(())
}

/// Writes the config and gitignore and creates the store.
pub(crate) fn run_impl(
    target_path: &Path,
    api_url: Option<String>,
    refresh_path: Option<String>,
) -> Result<PathBuf> {
    let mut config = Config::default();
    if let Some(url) = api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    config.api.refresh_path = refresh_path;

    let work_dir = init_work_dir(target_path, &config)?;
    write_gitignore(&work_dir)?;

    let store = StoreHandle::at_path(get_db_path(&work_dir));
    store.connection()?;
    store.close();

    Ok(work_dir)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
