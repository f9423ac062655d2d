// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    mutation_not_found = { Error::MutationNotFound("mut-1234".into()), "mut-1234" },
    invalid_method = { Error::InvalidMethod("GET".into()), "POST, PUT, PATCH, DELETE" },
    invalid_priority = { Error::InvalidPriority("urgent".into()), "high, normal, low" },
    store_blocked = { Error::StoreBlocked("offline.db".into()), "another process" },
)]
fn error_display_contains(err: Error, expected: &str) {
    assert!(err.to_string().contains(expected));
}

#[test]
fn error_from_io() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn error_from_json() {
    let json_err = serde_json::from_str::<()>("invalid").unwrap_err();
    let err: Error = json_err.into();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn busy_failure_is_busy_not_lost() {
    let err = Error::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
        None,
    ));
    assert!(err.is_busy());
    assert!(!err.is_connection_lost());
}

#[test]
fn io_failure_is_connection_lost() {
    let err = Error::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
        None,
    ));
    assert!(err.is_connection_lost());
    assert!(Error::StoreClosed.is_connection_lost());
    assert!(!Error::MutationNotFound("x".into()).is_connection_lost());
}
