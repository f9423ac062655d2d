// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn opens_lazily_on_first_use() {
    let store = StoreHandle::in_memory();
    assert!(!store.is_open());

    let version = store.with_db(|db| db.schema_version()).unwrap();
    assert_eq!(version, crate::db::SCHEMA_VERSION);
    assert!(store.is_open());
}

#[test]
fn clones_share_one_connection() {
    let store = StoreHandle::in_memory();
    let other = store.clone();

    let a = store.connection().unwrap();
    let b = other.connection().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn concurrent_first_use_yields_same_connection() {
    let store = StoreHandle::in_memory();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || store.connection().unwrap())
        })
        .collect();

    let conns: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for conn in &conns[1..] {
        assert!(Arc::ptr_eq(&conns[0], conn));
    }
}

#[test]
fn close_then_reuse_reopens_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = StoreHandle::at_path(dir.path().join("offline.db"));
    store
        .with_db(|db| {
            db.put_metadata(&crate::record::SyncMetadata::new("center"))
        })
        .unwrap();

    store.close();
    assert!(!store.is_open());

    let meta = store.with_db(|db| db.get_metadata("center")).unwrap();
    assert!(meta.is_some());
}

#[test]
fn connection_lost_error_drops_memoized_connection() {
    let store = StoreHandle::in_memory();
    store.connection().unwrap();

    let result: Result<()> = store.with_db(|_| Err(Error::StoreClosed));
    assert!(result.is_err());
    assert!(!store.is_open());
}

#[test]
fn ordinary_error_keeps_connection() {
    let store = StoreHandle::in_memory();
    let err = store.with_db(|db| db.get_mutation("missing")).unwrap_err();

    assert!(matches!(err, Error::MutationNotFound(_)));
    assert!(store.is_open());
}

#[test]
fn locked_database_reports_blocked_and_calls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("offline.db");

    let blocker = rusqlite::Connection::open(&path).unwrap();
    blocker
        .execute_batch("BEGIN EXCLUSIVE; CREATE TABLE hold (x INTEGER);")
        .unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let store = StoreHandle::at_path(&path);
    let seen = Arc::clone(&calls);
    store.on_blocked(Arc::new(move |_: &str| {
        seen.fetch_add(1, Ordering::SeqCst);
    }));

    let err = store.connection().err().unwrap();
    assert!(matches!(err, Error::StoreBlocked(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!store.is_open());

    blocker.execute_batch("ROLLBACK;").unwrap();
    assert!(store.connection().is_ok());
}
