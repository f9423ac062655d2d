// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ac-core operations.

use thiserror::Error;

/// All possible errors that can occur in ac-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("mutation not found: {0}")]
    MutationNotFound(String),

    #[error("invalid method: '{0}'\n  hint: valid methods are: POST, PUT, PATCH, DELETE")]
    InvalidMethod(String),

    #[error(
        "invalid mutation status: '{0}'\n  hint: valid statuses are: pending, syncing, success, error, conflict"
    )]
    InvalidStatus(String),

    #[error("invalid priority: '{0}'\n  hint: valid priorities are: high, normal, low")]
    InvalidPriority(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error(
        "offline store is blocked: {0}\n  hint: another process holds the database; close it and retry"
    )]
    StoreBlocked(String),

    #[error("offline store is closed")]
    StoreClosed,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    /// Returns true if the error means the underlying connection is unusable
    /// and must be reopened.
    pub fn is_connection_lost(&self) -> bool {
        use rusqlite::ErrorCode;

        match self {
            Error::Database(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                ErrorCode::CannotOpen
                    | ErrorCode::NotADatabase
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::DatabaseCorrupt
            ),
            Error::StoreClosed => true,
            _ => false,
        }
    }

    /// Returns true if the error is a lock held by another connection.
    pub fn is_busy(&self) -> bool {
        use rusqlite::ErrorCode;

        matches!(
            self,
            Error::Database(rusqlite::Error::SqliteFailure(e, _))
                if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
        )
    }
}

/// A specialized Result type for ac-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
