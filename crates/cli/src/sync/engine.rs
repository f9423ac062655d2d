// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Replays the outbox against the backend.
//!
//! A pass claims each due item, sends it, and settles it according to the
//! response class:
//!
//! | response                       | outcome                              |
//! |--------------------------------|--------------------------------------|
//! | 2xx                            | `success`, cache under root dropped  |
//! | 401/403 (after one refresh)    | paused as `AUTHENTICATION_EXPIRED`   |
//! | 409, 412, `VERSION_MISMATCH`   | `conflict` plus a conflict record    |
//! | other 4xx                      | failed permanently                   |
//! | network error, timeout, 5xx    | retried with backoff, then failed    |
//!
//! Only one pass runs at a time; a pass requested while another is in
//! flight returns a skipped result.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ac_core::{
    EventBus, MutationQueue, MutationQueueItem, ResponseCache, RetryPolicy, SyncConflict,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiRequest, ApiResponse, ApiResult};
use crate::error::Result;

/// What asked for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// The user asked for it. Resumes auth-paused items first.
    Manual,
    /// The scheduler's interval elapsed.
    Background,
    /// The device came back online.
    Connectivity,
}

impl fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncTrigger::Manual => write!(f, "manual"),
            SyncTrigger::Background => write!(f, "background"),
            SyncTrigger::Connectivity => write!(f, "connectivity"),
        }
    }
}

/// Counts for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    pub success: usize,
    pub failed: usize,
    pub conflicts: usize,
    pub total: usize,
    pub duration: Duration,
    /// True when the pass did not run because another was in flight.
    pub skipped: bool,
}

impl SyncResult {
    pub fn skipped() -> Self {
        SyncResult {
            skipped: true,
            ..Default::default()
        }
    }
}

/// Why a replay did not succeed.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayError {
    Network(String),
    Server(u16),
    Client(u16),
    AuthenticationExpired,
    Conflict(ApiResponse),
}

impl ReplayError {
    /// True for failures worth retrying later.
    pub fn is_transient(&self) -> bool {
        matches!(self, ReplayError::Network(_) | ReplayError::Server(_))
    }
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::Network(msg) => write!(f, "{}", msg),
            ReplayError::Server(status) | ReplayError::Client(status) => {
                write!(f, "HTTP {}", status)
            }
            ReplayError::AuthenticationExpired => write!(f, "{}", ac_core::AUTH_EXPIRED_ERROR),
            ReplayError::Conflict(response) => match response.error_code() {
                Some(code) => write!(f, "{}", code),
                None => write!(f, "HTTP {}", response.status),
            },
        }
    }
}

/// Sorts a send result into success or a [`ReplayError`].
pub fn classify(result: ApiResult<ApiResponse>) -> std::result::Result<ApiResponse, ReplayError> {
    let response = result.map_err(|e| ReplayError::Network(e.to_string()))?;
    if response.is_success() {
        Ok(response)
    } else if response.is_auth_failure() {
        Err(ReplayError::AuthenticationExpired)
    } else if response.is_conflict() {
        Err(ReplayError::Conflict(response))
    } else if response.is_server_error() {
        Err(ReplayError::Server(response.status))
    } else {
        Err(ReplayError::Client(response.status))
    }
}

/// Token refresh is attempted at most once per pass.
#[derive(Default)]
struct RefreshState {
    attempted: bool,
}

pub struct SyncEngine {
    client: Arc<dyn ApiClient>,
    queue: MutationQueue,
    cache: ResponseCache,
    events: EventBus,
    policy: RetryPolicy,
    lock: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        client: Arc<dyn ApiClient>,
        queue: MutationQueue,
        cache: ResponseCache,
        events: EventBus,
        policy: RetryPolicy,
    ) -> Self {
        SyncEngine {
            client,
            queue,
            cache,
            events,
            policy,
            lock: Mutex::new(()),
        }
    }

    pub fn queue(&self) -> &MutationQueue {
        &self.queue
    }

    pub fn is_syncing(&self) -> bool {
        self.lock.try_lock().is_err()
    }

    /// Runs one pass over the due items.
    ///
    /// Storage errors abort the pass, are emitted as `sync-failed` and
    /// returned. Replay failures never abort it.
    pub async fn perform_sync(&self, trigger: SyncTrigger) -> Result<SyncResult> {
        let Ok(_guard) = self.lock.try_lock() else {
            debug!(%trigger, "sync already in progress");
            return Ok(SyncResult::skipped());
        };

        let started = Instant::now();
        match self.run_pass(trigger).await {
            Ok(mut result) => {
                result.duration = started.elapsed();
                if result.total > 0 {
                    info!(
                        %trigger,
                        success = result.success,
                        failed = result.failed,
                        conflicts = result.conflicts,
                        total = result.total,
                        "sync pass complete"
                    );
                } else {
                    debug!(%trigger, "sync pass found nothing to replay");
                }
                self.events
                    .emit_sync_completed(result.success, result.failed, result.total);
                Ok(result)
            }
            Err(e) => {
                warn!(%trigger, error = %e, "sync pass failed");
                self.events.emit_sync_failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn run_pass(&self, trigger: SyncTrigger) -> Result<SyncResult> {
        if trigger == SyncTrigger::Manual {
            self.queue.resume_auth_expired()?;
        }

        let items = self.queue.due_mutations()?;
        let mut result = SyncResult::default();
        let mut touched = BTreeSet::new();
        let mut refresh = RefreshState::default();

        for item in items {
            if !self.queue.mark_syncing(&item.id)? {
                debug!(id = %item.id, "mutation claimed elsewhere, skipping");
                continue;
            }
            result.total += 1;
            if let Some(entity_type) = &item.entity_type {
                touched.insert(entity_type.clone());
            }

            match self.replay(&item, &mut refresh).await {
                Ok(response) => {
                    self.queue.mark_success(&item.id)?;
                    let dropped = self.cache.invalidate_for(&item.url)?;
                    debug!(id = %item.id, status = response.status, dropped, "replayed mutation");
                    result.success += 1;
                }
                Err(err) => self.settle_failure(&item, err, &mut result)?,
            }
        }

        self.queue.record_sync_pass(&touched, true)?;
        Ok(result)
    }

    async fn replay(
        &self,
        item: &MutationQueueItem,
        refresh: &mut RefreshState,
    ) -> std::result::Result<ApiResponse, ReplayError> {
        let outcome = classify(self.client.send(ApiRequest::replay(item)).await);

        let needs_refresh = matches!(outcome, Err(ReplayError::AuthenticationExpired))
            && self.client.supports_refresh()
            && !refresh.attempted;
        if !needs_refresh {
            return outcome;
        }

        refresh.attempted = true;
        if self.client.refresh_token().await {
            info!("access token refreshed");
            classify(self.client.send(ApiRequest::replay(item)).await)
        } else {
            warn!("token refresh failed, pausing mutations until next manual sync");
            outcome
        }
    }

    fn settle_failure(
        &self,
        item: &MutationQueueItem,
        err: ReplayError,
        result: &mut SyncResult,
    ) -> Result<()> {
        let message = err.to_string();
        match err {
            ReplayError::AuthenticationExpired => {
                self.queue.mark_auth_expired(&item.id)?;
                debug!(id = %item.id, "mutation paused on expired session");
                result.failed += 1;
            }
            ReplayError::Conflict(response) => {
                self.queue.mark_conflict(&item.id, Some(&message))?;
                let conflict = SyncConflict::for_item(
                    item,
                    response.body.unwrap_or(serde_json::Value::Null),
                    Some(message),
                    self.queue.now(),
                );
                self.queue.record_conflict(&conflict)?;
                info!(id = %item.id, status = response.status, "mutation conflicts with server copy");
                result.conflicts += 1;
            }
            ReplayError::Client(status) => {
                self.queue.mark_failed(&item.id, &message)?;
                warn!(id = %item.id, status, url = %item.url, "mutation rejected by server");
                result.failed += 1;
            }
            ReplayError::Network(_) | ReplayError::Server(_) => {
                let attempts = item.retry_count.saturating_add(1);
                if self.policy.can_retry(attempts) {
                    let delay = self.policy.backoff_delay(attempts);
                    let now = self.queue.now();
                    let next = now.checked_add_signed(to_chrono(delay)).unwrap_or(now);
                    self.queue.increment_retry(&item.id, Some(&message), Some(next))?;
                    debug!(id = %item.id, attempts, ?delay, error = %message, "replay failed, will retry");
                } else {
                    self.queue.increment_retry(&item.id, Some(&message), None)?;
                    self.queue.mark_failed(&item.id, &message)?;
                    warn!(id = %item.id, attempts, error = %message, "dropping mutation after retries");
                }
                result.failed += 1;
            }
        }
        Ok(())
    }
}

/// Retries are never scheduled further out than a year.
fn to_chrono(delay: Duration) -> chrono::Duration {
    let max = chrono::Duration::days(365);
    i64::try_from(delay.as_millis())
        .ok()
        .and_then(chrono::Duration::try_milliseconds)
        .map_or(max, |d| d.min(max))
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
