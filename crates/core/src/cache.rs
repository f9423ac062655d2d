// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cache of GET responses served while offline.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::record::CachedResponse;
use crate::store::StoreHandle;

#[derive(Clone)]
pub struct ResponseCache {
    store: StoreHandle,
    clock: Arc<dyn Clock>,
    horizon: Duration,
}

impl ResponseCache {
    /// Default age after which an entry without explicit expiry is swept.
    pub fn default_horizon() -> Duration {
        Duration::hours(24)
    }

    pub fn new(store: StoreHandle) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: StoreHandle, clock: Arc<dyn Clock>) -> Self {
        ResponseCache {
            store,
            clock,
            horizon: Self::default_horizon(),
        }
    }

    pub fn with_horizon(mut self, horizon: Duration) -> Self {
        self.horizon = horizon;
        self
    }

    /// Stores the response body for `url`, replacing any previous entry.
    /// Entries are keyed by [`cache_key`].
    pub fn put(&self, url: &str, data: serde_json::Value, etag: Option<String>) -> Result<CachedResponse> {
        let mut entry = CachedResponse::new(cache_key(url), data, self.clock.now());
        entry.etag = etag;
        self.store.with_db(|db| db.put_cached(&entry))?;
        Ok(entry)
    }

    /// Returns the entry for `url` unless it has expired.
    pub fn get(&self, url: &str) -> Result<Option<CachedResponse>> {
        let now = self.clock.now();
        let entry = self.store.with_db(|db| db.get_cached(&cache_key(url)))?;
        Ok(entry.filter(|e| !e.is_expired(now, self.horizon)))
    }

    pub fn remove(&self, url: &str) -> Result<bool> {
        self.store.with_db(|db| db.delete_cached(&cache_key(url)))
    }

    pub fn entries(&self) -> Result<Vec<CachedResponse>> {
        self.store.with_db(|db| db.all_cached())
    }

    /// Deletes expired entries. Returns how many were removed.
    pub fn sweep_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let cutoff = now
            .checked_sub_signed(self.horizon)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let removed = self
            .store
            .with_db(|db| db.delete_expired_cache(&now, &cutoff))?;
        if removed > 0 {
            tracing::debug!(removed, "swept expired cache entries");
        }
        Ok(removed)
    }

    /// Drops cached GETs for the resource a mutation of `url` touched.
    ///
    /// `/api/centers/C1/status` invalidates `/api/centers` and everything
    /// under `/api/centers/`.
    pub fn invalidate_for(&self, url: &str) -> Result<usize> {
        let root = resource_root(url);
        if root.is_empty() {
            return Ok(0);
        }
        let nested = format!("{root}/");
        let removed = self.store.with_db(|db| {
            db.in_transaction(|db| {
                let mut removed = db.delete_cached_prefix(&nested)?;
                removed += db.delete_cached_prefix(&format!("{root}?"))?;
                if db.delete_cached(&root)? {
                    removed += 1;
                }
                Ok(removed)
            })
        })?;
        if removed > 0 {
            tracing::debug!(root = %root, removed, "invalidated cached responses");
        }
        Ok(removed)
    }
}

/// Origin-relative form of `url`: scheme, host and fragment dropped, query
/// kept, always with a leading `/`.
///
/// `api/centers`, `/api/centers` and `https://host/api/centers` share a key.
pub fn cache_key(url: &str) -> String {
    let path = url
        .split_once("://")
        .map(|(_, rest)| rest.find(['/', '?']).map_or("", |i| &rest[i..]))
        .unwrap_or(url);
    let path = path.split('#').next().unwrap_or_default();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Collection path a URL belongs to: the first segment after `/api`, or the
/// first segment for other paths. Query strings and fragments are ignored.
pub fn resource_root(url: &str) -> String {
    let key = cache_key(url);
    let path = key.split('?').next().unwrap_or_default();

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [] => String::new(),
        ["api", collection, ..] => format!("/api/{collection}"),
        [first, ..] => format!("/{first}"),
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
