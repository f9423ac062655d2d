// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote API access.
//!
//! The [`ApiClient`] trait abstracts the backend so the sync engine and the
//! offline wrapper can be driven by a scripted client in tests:
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ OfflineApi  │────►│  ApiClient  │────►│   Backend   │
//! │ SyncEngine  │◄────│   (trait)   │◄────│  (REST)     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```

mod http;
mod offline;

pub use http::HttpApiClient;
pub use offline::{FetchSource, Fetched, MutationOutcome, OfflineApi};

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use ac_core::{Method, MutationQueueItem};

/// Body `code`/`error` value the backend uses for optimistic-lock failures.
pub const VERSION_MISMATCH: &str = "VERSION_MISMATCH";

/// Error type for requests that never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Boxed future returned by [`ApiClient`] methods.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An outgoing request. `path` is relative to the client's base URL unless
/// it is absolute.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: reqwest::Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
    pub headers: BTreeMap<String, String>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        ApiRequest {
            method: reqwest::Method::GET,
            path: path.into(),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn mutation(
        method: Method,
        path: impl Into<String>,
        body: Option<serde_json::Value>,
        headers: BTreeMap<String, String>,
    ) -> Self {
        ApiRequest {
            method: http_method(method),
            path: path.into(),
            body,
            headers,
        }
    }

    /// The request replaying a queued mutation.
    pub fn replay(item: &MutationQueueItem) -> Self {
        Self::mutation(item.method, &item.url, item.data.clone(), item.headers.clone())
    }
}

pub fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// An HTTP response: status and JSON body, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Option<serde_json::Value>) -> Self {
        ApiResponse { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// Machine-readable error code from the body: `code`, else `error`.
    pub fn error_code(&self) -> Option<&str> {
        let body = self.body.as_ref()?;
        body.get("code")
            .and_then(|v| v.as_str())
            .or_else(|| body.get("error").and_then(|v| v.as_str()))
    }

    /// True if the server rejected the write because its copy changed.
    pub fn is_conflict(&self) -> bool {
        matches!(self.status, 409 | 412) || self.error_code() == Some(VERSION_MISMATCH)
    }
}

/// Backend client.
///
/// Implementations never retry on their own; retry policy belongs to the
/// sync engine.
pub trait ApiClient: Send + Sync {
    /// Sends a request and returns whatever status the server answered.
    fn send(&self, request: ApiRequest) -> ApiFuture<'_, ApiResult<ApiResponse>>;

    /// True if the backend answered a health request.
    fn probe(&self) -> ApiFuture<'_, bool>;

    /// Obtains a fresh access token. Returns false if refresh failed or is
    /// not configured.
    fn refresh_token(&self) -> ApiFuture<'_, bool>;

    /// True if [`ApiClient::refresh_token`] can ever succeed.
    fn supports_refresh(&self) -> bool;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
