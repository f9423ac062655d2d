// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

#[test]
fn summary_for_idle_offline_state() {
    let state = OfflineState {
        pending_count: 4,
        ..Default::default()
    };
    assert_eq!(summary(&state), "offline | pending: 4 | conflicts: 0");
}

#[test]
fn summary_flags_syncing_and_expired_session() {
    let state = OfflineState {
        is_online: true,
        is_syncing: true,
        pending_count: 1,
        auth_expired_count: 2,
        ..Default::default()
    };
    assert_eq!(
        summary(&state),
        "online | pending: 1 | conflicts: 0 | syncing | 2 waiting for sign-in"
    );
}

#[test]
fn second_watcher_is_refused() {
    let temp = TempDir::new().unwrap();
    let lock_path = temp.path().join("watch.lock");

    let held = acquire_lock(&lock_path).unwrap();
    assert!(matches!(acquire_lock(&lock_path), Err(Error::AlreadyRunning)));

    drop(held);
    assert!(acquire_lock(&lock_path).is_ok());
}
