// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline-aware request wrapper.
//!
//! Reads go to the network and refresh the response cache; when the backend
//! is unreachable they are served from the cache. Writes are sent right away
//! when online and land in the outbox otherwise.

use std::sync::Arc;

use ac_core::{EventBus, MutationQueue, MutationQueueItem, NewMutation, ResponseCache};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{ApiClient, ApiRequest, ApiResponse};
use crate::error::{Error, Result};
use crate::sync::ConnectivityMonitor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Network,
    Cache,
}

/// Result of [`OfflineApi::get`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub data: serde_json::Value,
    pub source: FetchSource,
    /// When the served copy was cached, for cache hits.
    pub cached_at: Option<DateTime<Utc>>,
}

/// Result of [`OfflineApi::mutate`].
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The server accepted the write.
    Sent(ApiResponse),
    /// The write was queued for a later sync pass.
    Queued(MutationQueueItem),
}

#[derive(Clone)]
pub struct OfflineApi {
    client: Arc<dyn ApiClient>,
    queue: MutationQueue,
    cache: ResponseCache,
    connectivity: ConnectivityMonitor,
    events: EventBus,
}

impl OfflineApi {
    pub fn new(
        client: Arc<dyn ApiClient>,
        queue: MutationQueue,
        cache: ResponseCache,
        connectivity: ConnectivityMonitor,
        events: EventBus,
    ) -> Self {
        OfflineApi {
            client,
            queue,
            cache,
            connectivity,
            events,
        }
    }

    /// Fetches `path`, falling back to the cached copy when offline or when
    /// the backend fails. Client errors are returned, not masked.
    pub async fn get(&self, path: &str) -> Result<Fetched> {
        if self.connectivity.is_online() {
            match self.client.send(ApiRequest::get(path)).await {
                Ok(response) if response.is_success() => {
                    let data = response.body.unwrap_or(serde_json::Value::Null);
                    self.cache.put(path, data.clone(), None)?;
                    return Ok(Fetched {
                        data,
                        source: FetchSource::Network,
                        cached_at: None,
                    });
                }
                Ok(response) if response.is_server_error() => {
                    debug!(path, status = response.status, "server error, trying cache");
                }
                Ok(response) => {
                    return Err(Error::Rejected {
                        status: response.status,
                        body: response.body,
                    });
                }
                Err(e) => debug!(path, error = %e, "request failed, trying cache"),
            }
        }

        match self.cache.get(path)? {
            Some(cached) => Ok(Fetched {
                data: cached.data,
                source: FetchSource::Cache,
                cached_at: Some(cached.timestamp),
            }),
            None => Err(Error::NotCached(path.to_string())),
        }
    }

    /// Sends a write, or queues it when it cannot be delivered now.
    ///
    /// Network failures and 5xx responses queue the write; 4xx responses are
    /// returned to the caller and never queued.
    pub async fn mutate(&self, new: NewMutation) -> Result<MutationOutcome> {
        let method = new.validate()?;

        if self.connectivity.is_online() {
            let request =
                ApiRequest::mutation(method, &new.url, new.data.clone(), new.headers.clone());
            match self.client.send(request).await {
                Ok(response) if response.is_success() => {
                    self.cache.invalidate_for(&new.url)?;
                    return Ok(MutationOutcome::Sent(response));
                }
                Ok(response) if response.is_server_error() => {
                    debug!(url = %new.url, status = response.status, "server error, queueing");
                }
                Ok(response) => {
                    return Err(Error::Rejected {
                        status: response.status,
                        body: response.body,
                    });
                }
                Err(e) => debug!(url = %new.url, error = %e, "request failed, queueing"),
            }
        }

        let item = self.queue.enqueue_mutation(new)?;
        self.events.emit_mutation_queued(item.clone());
        Ok(MutationOutcome::Queued(item))
    }
}

#[cfg(test)]
#[path = "offline_tests.rs"]
mod tests;
