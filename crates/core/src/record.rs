// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Records kept next to the mutation queue: cached GET responses, per-entity
//! sync bookkeeping and detected conflicts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::mutation::MutationQueueItem;

/// Metadata key tracking the queue as a whole.
pub const GLOBAL_SYNC_KEY: &str = "_global";

/// A cached GET response, keyed by URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResponse {
    pub url: String,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedResponse {
    pub fn new(url: impl Into<String>, data: serde_json::Value, now: DateTime<Utc>) -> Self {
        CachedResponse {
            url: url.into(),
            data,
            timestamp: now,
            etag: None,
            expires_at: None,
        }
    }

    /// True if the entry should be swept at `now`.
    ///
    /// An explicit `expires_at` wins; otherwise entries older than `horizon`
    /// are expired.
    pub fn is_expired(&self, now: DateTime<Utc>, horizon: Duration) -> bool {
        match self.expires_at {
            Some(at) => at <= now,
            None => self
                .timestamp
                .checked_add_signed(horizon)
                .is_some_and(|at| at <= now),
        }
    }
}

/// Per-entity-type sync bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    pub entity_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_count: Option<u64>,
}

impl SyncMetadata {
    pub fn new(entity_type: impl Into<String>) -> Self {
        SyncMetadata {
            entity_type: entity_type.into(),
            last_sync: None,
            last_attempt: None,
            version: None,
            pending_count: None,
        }
    }

    /// True if no pass was attempted within `interval` before `now`.
    pub fn is_sync_due(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        self.last_attempt.is_none_or(|at| at + interval <= now)
    }
}

/// Divergence between a queued mutation and the server's copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict {
    pub mutation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub local_version: serde_json::Value,
    pub remote_version: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncConflict {
    /// Records a conflict for `item` against the server body.
    pub fn for_item(
        item: &MutationQueueItem,
        remote_version: serde_json::Value,
        error: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        SyncConflict {
            mutation_id: item.id.clone(),
            entity_type: item.entity_type.clone(),
            entity_id: item.entity_id.clone(),
            local_version: item.data.clone().unwrap_or(serde_json::Value::Null),
            remote_version,
            timestamp: now,
            error,
        }
    }
}

/// Row counts for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub cached_responses: u64,
    pub mutations: u64,
    pub pending_mutations: u64,
    pub sync_metadata: u64,
    pub conflicts: u64,
}

/// Full dump of the store, for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreExport {
    pub exported_at: DateTime<Utc>,
    pub mutations: Vec<MutationQueueItem>,
    pub cache: Vec<CachedResponse>,
    pub metadata: Vec<SyncMetadata>,
    pub conflicts: Vec<SyncConflict>,
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
