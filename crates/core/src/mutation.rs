// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Outbox records for HTTP mutations made while offline.
//!
//! A [`MutationQueueItem`] is created by the queue manager from a
//! [`NewMutation`] and is afterwards only changed by the sync engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Error marker for mutations paused until the user re-authenticates.
pub const AUTH_EXPIRED_ERROR: &str = "AUTHENTICATION_EXPIRED";

/// Error marker for mutations reclaimed after being left in `syncing`.
pub const STUCK_ERROR: &str = "STUCK_IN_SYNC";

/// State-changing HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the string representation used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

/// Lifecycle status of a queued mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStatus {
    /// Waiting to be replayed. Initial state.
    Pending,
    /// Picked up by a sync pass.
    Syncing,
    /// Confirmed by the server.
    Success,
    /// Failed permanently, or paused awaiting re-authentication.
    Error,
    /// Rejected because the server copy diverged.
    Conflict,
}

impl MutationStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationStatus::Pending => "pending",
            MutationStatus::Syncing => "syncing",
            MutationStatus::Success => "success",
            MutationStatus::Error => "error",
            MutationStatus::Conflict => "conflict",
        }
    }

    /// Returns true if the sync engine never picks this status up again on
    /// its own.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            MutationStatus::Success | MutationStatus::Error | MutationStatus::Conflict
        )
    }
}

impl fmt::Display for MutationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MutationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(MutationStatus::Pending),
            "syncing" => Ok(MutationStatus::Syncing),
            "success" => Ok(MutationStatus::Success),
            "error" => Ok(MutationStatus::Error),
            "conflict" => Ok(MutationStatus::Conflict),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// Replay priority. Safety-critical changes (e.g. closing a shelter) go
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
        }
    }

    /// Sort rank: lower replays first.
    pub fn rank(&self) -> i64 {
        match self {
            Priority::High => 0,
            Priority::Normal => 1,
            Priority::Low => 2,
        }
    }

    pub fn from_rank(rank: i64) -> Result<Self> {
        match rank {
            0 => Ok(Priority::High),
            1 => Ok(Priority::Normal),
            2 => Ok(Priority::Low),
            _ => Err(Error::InvalidPriority(rank.to_string())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            _ => Err(Error::InvalidPriority(s.to_string())),
        }
    }
}

/// A mutation as submitted by a caller, before it is queued.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewMutation {
    /// Caller-chosen id; generated when absent.
    pub id: Option<String>,
    pub url: String,
    pub method: Option<Method>,
    pub data: Option<serde_json::Value>,
    pub headers: BTreeMap<String, String>,
    pub priority: Priority,
    pub optimistic_id: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
}

impl NewMutation {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        NewMutation {
            url: url.into(),
            method: Some(method),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Checks the fields the queue requires.
    pub fn validate(&self) -> Result<Method> {
        if self.url.trim().is_empty() {
            return Err(Error::InvalidInput("mutation url cannot be empty".to_string()));
        }
        self.method
            .ok_or_else(|| Error::InvalidInput("mutation method is required".to_string()))
    }
}

/// A durable outbox record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationQueueItem {
    pub id: String,
    pub url: String,
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub timestamp: DateTime<Utc>,
    pub retry_count: u32,
    pub status: MutationStatus,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimistic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_attempt_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl MutationQueueItem {
    /// Builds a fresh `pending` record from a validated submission.
    pub fn from_new(id: String, new: NewMutation, method: Method, now: DateTime<Utc>) -> Self {
        MutationQueueItem {
            id,
            url: new.url,
            method,
            data: new.data,
            headers: new.headers,
            timestamp: now,
            retry_count: 0,
            status: MutationStatus::Pending,
            priority: new.priority,
            optimistic_id: new.optimistic_id,
            entity_type: new.entity_type,
            entity_id: new.entity_id,
            error: None,
            next_attempt_at: None,
            updated_at: now,
        }
    }

    /// True if paused on an expired session.
    pub fn is_auth_expired(&self) -> bool {
        self.status == MutationStatus::Error && self.error.as_deref() == Some(AUTH_EXPIRED_ERROR)
    }

    /// True if a sync pass may replay this item at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == MutationStatus::Pending && self.next_attempt_at.is_none_or(|at| at <= now)
    }

    /// True if the item counts towards the pending badge.
    pub fn counts_as_pending(&self) -> bool {
        self.status == MutationStatus::Pending || self.is_auth_expired()
    }
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
