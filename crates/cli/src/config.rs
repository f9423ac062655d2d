// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace configuration management.
//!
//! Configuration is stored in `.appcopio/config.toml` and has two tables:
//! - `[api]`: where the backend lives and how requests are made
//! - `[sync]`: retry ceiling, backoff, scheduler cadence and guards
//!
//! Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ac_core::RetryPolicy;

use crate::env;
use crate::error::{Error, Result};

const WORK_DIR_NAME: &str = ".appcopio";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "offline.db";
const LOG_FILE_NAME: &str = "sync.log";
const LOCK_FILE_NAME: &str = "watch.lock";
const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Upper bound for the age-based settings (stuck, cache, retention).
const MAX_AGE_SECS: u64 = 10 * 365 * 86_400;
const MAX_BACKOFF_MS: u64 = 86_400_000;

/// Workspace configuration stored in `.appcopio/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL requests are resolved against.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Path probed to decide whether the backend is reachable.
    pub health_path: String,
    /// Token refresh endpoint. Silent refresh is disabled when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_path: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "http://localhost:4000".to_string(),
            timeout_secs: 15,
            health_path: "/api/health".to_string(),
            refresh_path: None,
        }
    }
}

/// Sync engine, scheduler and housekeeping settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Seconds between background passes.
    pub interval_secs: u64,
    /// Quiet period after coming back online before a pass starts.
    pub debounce_ms: u64,
    /// Failed replays allowed before a mutation fails permanently.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
    /// Age after which a `syncing` item is considered abandoned.
    pub stuck_after_secs: u64,
    /// Age after which a cached response without explicit expiry is swept.
    pub cache_horizon_secs: u64,
    /// Age after which successful mutations are purged.
    pub completed_retention_secs: u64,
    /// Seconds between connectivity probes.
    pub probe_interval_secs: u64,
    pub respect_battery: bool,
    pub min_battery_percent: u8,
    pub respect_network: bool,
    /// Connection is metered (e.g. a satellite or cellular uplink).
    pub metered: bool,
    /// User asked to save data.
    pub save_data: bool,
    /// Connection class hint: `slow-2g`, `2g`, `3g` or `4g`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_type: Option<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval_secs: 300,
            debounce_ms: 2000,
            max_retries: 5,
            backoff_base_ms: 1000,
            backoff_max_ms: 300_000,
            stuck_after_secs: 600,
            cache_horizon_secs: 86_400,
            completed_retention_secs: 604_800,
            probe_interval_secs: 30,
            respect_battery: true,
            min_battery_percent: 20,
            respect_network: true,
            metered: false,
            save_data: false,
            effective_type: None,
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn stuck_after(&self) -> chrono::Duration {
        chrono_seconds(self.stuck_after_secs)
    }

    pub fn cache_horizon(&self) -> chrono::Duration {
        chrono_seconds(self.cache_horizon_secs)
    }

    pub fn completed_retention(&self) -> chrono::Duration {
        chrono_seconds(self.completed_retention_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.backoff_base_ms),
            max_delay: Duration::from_millis(self.backoff_max_ms),
        }
    }
}

/// Saturates at `chrono::Duration::MAX` instead of wrapping.
fn chrono_seconds(secs: u64) -> chrono::Duration {
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or(chrono::Duration::MAX)
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Loads and validates configuration from the given `.appcopio/`
    /// directory, then applies environment overrides.
    pub fn load(work_dir: &Path) -> Result<Self> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let mut config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the given `.appcopio/` directory.
    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let config_path = work_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    /// `APPCOPIO_API_URL` replaces the configured base URL.
    pub fn apply_env(&mut self) {
        if let Some(url) = env::api_url() {
            self.api.base_url = url;
        }
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let sync = &self.sync;
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "api.base_url must start with http:// or https://, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::Config("api.timeout_secs must be positive".into()));
        }
        if sync.interval_secs == 0 {
            return Err(Error::Config("sync.interval_secs must be positive".into()));
        }
        if sync.probe_interval_secs == 0 {
            return Err(Error::Config("sync.probe_interval_secs must be positive".into()));
        }
        if sync.max_retries == 0 {
            return Err(Error::Config("sync.max_retries must be at least 1".into()));
        }
        if sync.backoff_base_ms == 0 || sync.backoff_base_ms > sync.backoff_max_ms {
            return Err(Error::Config(format!(
                "sync.backoff_base_ms ({}) must be positive and not exceed sync.backoff_max_ms ({})",
                sync.backoff_base_ms, sync.backoff_max_ms
            )));
        }
        if sync.backoff_max_ms > MAX_BACKOFF_MS {
            return Err(Error::Config(format!(
                "sync.backoff_max_ms must not exceed {} (one day), got {}",
                MAX_BACKOFF_MS, sync.backoff_max_ms
            )));
        }
        for (name, secs) in [
            ("stuck_after_secs", sync.stuck_after_secs),
            ("cache_horizon_secs", sync.cache_horizon_secs),
            ("completed_retention_secs", sync.completed_retention_secs),
        ] {
            if secs > MAX_AGE_SECS {
                return Err(Error::Config(format!(
                    "sync.{} must not exceed {} (ten years), got {}",
                    name, MAX_AGE_SECS, secs
                )));
            }
        }
        if sync.min_battery_percent > 100 {
            return Err(Error::Config(format!(
                "sync.min_battery_percent must be 0-100, got {}",
                sync.min_battery_percent
            )));
        }
        if let Some(kind) = &sync.effective_type {
            if !matches!(kind.as_str(), "slow-2g" | "2g" | "3g" | "4g") {
                return Err(Error::Config(format!(
                    "sync.effective_type must be one of slow-2g, 2g, 3g, 4g, got '{}'",
                    kind
                )));
            }
        }
        Ok(())
    }
}

/// Find the .appcopio directory by walking up from the current directory
pub fn find_work_dir() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;
    loop {
        let work_dir = current.join(WORK_DIR_NAME);
        if work_dir.is_dir() {
            return Ok(work_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

pub fn get_db_path(work_dir: &Path) -> PathBuf {
    work_dir.join(DB_FILE_NAME)
}

pub fn get_log_path(work_dir: &Path) -> PathBuf {
    work_dir.join(LOG_FILE_NAME)
}

pub fn get_lock_path(work_dir: &Path) -> PathBuf {
    work_dir.join(LOCK_FILE_NAME)
}

/// Initialize a new .appcopio directory at the given path
pub fn init_work_dir(path: &Path, config: &Config) -> Result<PathBuf> {
    let work_dir = path.join(WORK_DIR_NAME);

    if work_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(work_dir.display().to_string()));
    }

    config.validate()?;
    fs::create_dir_all(&work_dir)?;
    config.save(&work_dir)?;

    Ok(work_dir)
}

/// Write a .gitignore file to the work directory.
///
/// The store, log and lock are per-machine state.
pub fn write_gitignore(work_dir: &Path) -> Result<()> {
    let gitignore_path = work_dir.join(GITIGNORE_FILE_NAME);
    let content = format!(
        "# Offline store (per machine)\n{DB_FILE_NAME}\n{DB_FILE_NAME}-wal\n{DB_FILE_NAME}-shm\n\n# Runtime state\n{LOG_FILE_NAME}\n{LOCK_FILE_NAME}\n"
    );
    fs::write(&gitignore_path, content)?;
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
