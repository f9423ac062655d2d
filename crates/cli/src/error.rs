// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the acrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'ac init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("mutation not found: {0}")]
    MutationNotFound(String),

    #[error("no conflict recorded for mutation: {0}")]
    ConflictNotFound(String),

    #[error("invalid header '{0}'\n  hint: headers are written as NAME:VALUE")]
    InvalidHeader(String),

    #[error("invalid request body: {0}\n  hint: --data takes a JSON document")]
    InvalidData(String),

    #[error("offline and nothing cached for {0}")]
    NotCached(String),

    #[error("request rejected: HTTP {status}")]
    Rejected {
        status: u16,
        body: Option<serde_json::Value>,
    },

    #[error("refusing to delete the offline store\n  hint: pass --yes to confirm")]
    ConfirmationRequired,

    #[error("another 'ac watch' is already running in this workspace")]
    AlreadyRunning,

    #[error("api error: {0}")]
    Api(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error(transparent)]
    Store(ac_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for acrs operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<ac_core::Error> for Error {
    fn from(e: ac_core::Error) -> Self {
        match e {
            ac_core::Error::MutationNotFound(id) => Error::MutationNotFound(id),
            ac_core::Error::Io(e) => Error::Io(e),
            ac_core::Error::Json(e) => Error::Json(e),
            other => Error::Store(other),
        }
    }
}

impl From<crate::api::ApiError> for Error {
    fn from(e: crate::api::ApiError) -> Self {
        Error::Api(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
