// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! reqwest-backed [`ApiClient`].

use std::sync::RwLock;
use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use tracing::{debug, warn};

use super::{ApiClient, ApiError, ApiFuture, ApiRequest, ApiResponse, ApiResult};
use crate::config::ApiConfig;

/// Talks to the backend over HTTP with an optional bearer token.
pub struct HttpApiClient {
    http: reqwest::Client,
    base_url: String,
    health_path: String,
    refresh_path: Option<String>,
    token: RwLock<Option<String>>,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig, token: Option<String>) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout().min(Duration::from_secs(5)))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        Ok(HttpApiClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            health_path: config.health_path.clone(),
            refresh_path: config.refresh_path.clone(),
            token: RwLock::new(token),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolves `path` against the base URL. Absolute URLs pass through.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn set_token(&self, token: String) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token);
        }
    }

    async fn execute(&self, request: ApiRequest) -> ApiResult<ApiResponse> {
        let url = self.url_for(&request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if let Some(token) = self.current_token() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::InvalidRequest(format!("header '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::InvalidRequest(format!("header value: {}", e)))?;
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(method = %request.method, url = %url, "sending request");
        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_reqwest_error)?;
        Ok(ApiResponse::new(status, parse_body(&text)))
    }
}

/// JSON bodies are parsed; anything else is kept as a string.
fn parse_body(text: &str) -> Option<serde_json::Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(
        serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::Value::String(text.to_string())),
    )
}

fn map_reqwest_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else if e.is_builder() {
        ApiError::InvalidRequest(e.to_string())
    } else {
        ApiError::Network(e.to_string())
    }
}

/// Reads the new token from a refresh response.
fn extract_token(body: &serde_json::Value) -> Option<String> {
    ["accessToken", "access_token", "token"]
        .iter()
        .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

impl ApiClient for HttpApiClient {
    fn send(&self, request: ApiRequest) -> ApiFuture<'_, ApiResult<ApiResponse>> {
        Box::pin(self.execute(request))
    }

    fn probe(&self) -> ApiFuture<'_, bool> {
        Box::pin(async move {
            let url = self.url_for(&self.health_path);
            match self.http.get(&url).send().await {
                Ok(_) => true,
                Err(e) => {
                    debug!(url = %url, error = %e, "health probe failed");
                    false
                }
            }
        })
    }

    fn refresh_token(&self) -> ApiFuture<'_, bool> {
        Box::pin(async move {
            let Some(path) = self.refresh_path.clone() else {
                return false;
            };
            let request = ApiRequest {
                method: reqwest::Method::POST,
                path,
                body: None,
                headers: Default::default(),
            };
            match self.execute(request).await {
                Ok(response) if response.is_success() => {
                    match response.body.as_ref().and_then(extract_token) {
                        Some(token) => {
                            self.set_token(token);
                            true
                        }
                        None => {
                            warn!("token refresh succeeded without a token in the body");
                            false
                        }
                    }
                }
                Ok(response) => {
                    debug!(status = response.status, "token refresh rejected");
                    false
                }
                Err(e) => {
                    debug!(error = %e, "token refresh failed");
                    false
                }
            }
        })
    }

    fn supports_refresh(&self) -> bool {
        self.refresh_path.is_some()
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
