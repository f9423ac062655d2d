// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn test_init_and_load_config() {
    let temp = TempDir::new().unwrap();
    let work_dir = init_work_dir(temp.path(), &Config::default()).unwrap();

    let config = Config::load(&work_dir).unwrap();
    assert_eq!(config.sync.max_retries, 5);
    assert_eq!(config.sync.interval_secs, 300);
    assert!(config.api.refresh_path.is_none());
}

#[test]
fn test_already_initialized() {
    let temp = TempDir::new().unwrap();
    init_work_dir(temp.path(), &Config::default()).unwrap();

    let result = init_work_dir(temp.path(), &Config::default());
    assert!(result.is_err());

    if let Err(e) = result {
        assert!(e.to_string().contains("already initialized"));
    }
}

#[test]
fn test_empty_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("config.toml"), "").unwrap();

    let config = Config::load(temp.path()).unwrap();
    assert_eq!(config.sync, SyncConfig::default());
    assert_eq!(config.api.health_path, "/api/health");
}

#[test]
fn test_partial_tables_fill_defaults() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("config.toml"),
        "[api]\nrefresh_path = \"/api/auth/refresh\"\n\n[sync]\nmax_retries = 3\nmetered = true\n",
    )
    .unwrap();

    let config = Config::load(temp.path()).unwrap();
    assert_eq!(config.api.refresh_path.as_deref(), Some("/api/auth/refresh"));
    assert_eq!(config.api.timeout_secs, 15);
    assert_eq!(config.sync.max_retries, 3);
    assert!(config.sync.metered);
    assert_eq!(config.sync.debounce_ms, 2000);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("config.toml"), "[sync\n").unwrap();

    let err = Config::load(temp.path()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[parameterized(
    zero_interval = { "[sync]\ninterval_secs = 0" },
    zero_retries = { "[sync]\nmax_retries = 0" },
    base_over_cap = { "[sync]\nbackoff_base_ms = 5000\nbackoff_max_ms = 1000" },
    battery_over_100 = { "[sync]\nmin_battery_percent = 101" },
    unknown_effective_type = { "[sync]\neffective_type = \"5g\"" },
    bad_scheme = { "[api]\nbase_url = \"ftp://example\"" },
    stuck_after_overflows = { "[sync]\nstuck_after_secs = 9223372036854775807" },
    retention_past_ten_years = { "[sync]\ncompleted_retention_secs = 10000000000000000" },
    cache_horizon_past_ten_years = { "[sync]\ncache_horizon_secs = 315360001" },
    backoff_cap_over_a_day = { "[sync]\nbackoff_max_ms = 86400001" },
)]
fn test_invalid_values_rejected(toml_src: &str) {
    let config: Config = toml::from_str(toml_src).unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_age_settings_accept_ten_years() {
    let config: Config = toml::from_str(
        "[sync]\nstuck_after_secs = 315360000\ncache_horizon_secs = 315360000\ncompleted_retention_secs = 315360000",
    )
    .unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.sync.stuck_after(), chrono::Duration::days(3650));
}

#[test]
fn test_age_helpers_saturate_instead_of_wrapping() {
    let sync = SyncConfig {
        stuck_after_secs: u64::MAX,
        cache_horizon_secs: u64::MAX,
        completed_retention_secs: 10_000_000_000_000_000,
        ..Default::default()
    };
    assert_eq!(sync.stuck_after(), chrono::Duration::MAX);
    assert_eq!(sync.cache_horizon(), chrono::Duration::MAX);
    assert!(sync.completed_retention() > chrono::Duration::zero());
}

#[test]
fn test_retry_policy_from_sync_config() {
    let sync = SyncConfig {
        max_retries: 7,
        backoff_base_ms: 250,
        backoff_max_ms: 4000,
        ..Default::default()
    };
    let policy = sync.retry_policy();
    assert_eq!(policy.max_retries, 7);
    assert_eq!(policy.base_delay, Duration::from_millis(250));
    assert_eq!(policy.max_delay, Duration::from_secs(4));
}

#[test]
fn test_save_round_trip() {
    let temp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.sync.effective_type = Some("3g".into());
    config.save(temp.path()).unwrap();

    let loaded: Config =
        toml::from_str(&fs::read_to_string(temp.path().join("config.toml")).unwrap()).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_paths_live_in_work_dir() {
    let work_dir = PathBuf::from("/site/.appcopio");
    assert_eq!(get_db_path(&work_dir), PathBuf::from("/site/.appcopio/offline.db"));
    assert_eq!(get_log_path(&work_dir), PathBuf::from("/site/.appcopio/sync.log"));
    assert_eq!(get_lock_path(&work_dir), PathBuf::from("/site/.appcopio/watch.lock"));
}

#[test]
fn test_gitignore_lists_store_files() {
    let temp = TempDir::new().unwrap();
    write_gitignore(temp.path()).unwrap();

    let content = fs::read_to_string(temp.path().join(".gitignore")).unwrap();
    assert!(content.contains("offline.db\n"));
    assert!(content.contains("sync.log"));
}
