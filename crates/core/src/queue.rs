// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue manager: the only writer of mutation state.
//!
//! Every transition here is a single statement (or one transaction), so a
//! caller never has to read-modify-write an item itself.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::id::generate_unique_id;
use crate::mutation::{
    MutationQueueItem, MutationStatus, NewMutation, AUTH_EXPIRED_ERROR, STUCK_ERROR,
};
use crate::record::{SyncConflict, SyncMetadata, GLOBAL_SYNC_KEY};
use crate::store::StoreHandle;

/// Error recorded on pending items found past the retry ceiling.
pub const RETRIES_EXHAUSTED_ERROR: &str = "MAX_RETRIES_EXCEEDED";

/// Filter for [`MutationQueue::list`].
#[derive(Debug, Clone, Default)]
pub struct MutationFilter {
    pub status: Option<MutationStatus>,
    pub entity_type: Option<String>,
}

/// Durable outbox of HTTP mutations.
#[derive(Clone)]
pub struct MutationQueue {
    store: StoreHandle,
    clock: Arc<dyn Clock>,
}

impl MutationQueue {
    pub fn new(store: StoreHandle) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: StoreHandle, clock: Arc<dyn Clock>) -> Self {
        MutationQueue { store, clock }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Persists a new `pending` mutation and returns the stored record.
    ///
    /// An id is generated when the caller supplies none. Several mutations
    /// for the same entity may be queued at once.
    pub fn enqueue_mutation(&self, new: NewMutation) -> Result<MutationQueueItem> {
        let method = new.validate()?;
        let now = self.clock.now();

        let item = self.store.with_db(|db| {
            let id = match new.id.clone() {
                Some(id) => {
                    if db.mutation_exists(&id)? {
                        return Err(Error::InvalidInput(format!(
                            "mutation '{id}' is already queued"
                        )));
                    }
                    id
                }
                None => generate_unique_id(method, &new.url, &now, |candidate| {
                    db.mutation_exists(candidate)
                })?,
            };

            let item = MutationQueueItem::from_new(id, new, method, now);
            db.put_mutation(&item)?;
            Ok(item)
        })?;

        tracing::debug!(id = %item.id, method = %item.method, url = %item.url, "queued mutation");
        Ok(item)
    }

    pub fn get_mutation(&self, id: &str) -> Result<MutationQueueItem> {
        self.store.with_db(|db| db.get_mutation(id))
    }

    pub fn delete_mutation(&self, id: &str) -> Result<bool> {
        self.store.with_db(|db| db.delete_mutation(id))
    }

    /// All mutations matching `filter`, in enqueue order.
    pub fn list(&self, filter: &MutationFilter) -> Result<Vec<MutationQueueItem>> {
        let items = self.store.with_db(|db| match (&filter.status, &filter.entity_type) {
            (_, Some(entity_type)) => db.mutations_by_entity_type(entity_type),
            (Some(status), None) => db.mutations_by_status(*status),
            (None, None) => db.all_mutations(),
        })?;

        Ok(items
            .into_iter()
            .filter(|m| filter.status.is_none_or(|s| m.status == s))
            .collect())
    }

    /// Replay candidates: high → normal → low, then oldest first, then
    /// enqueue order. Paused auth-expired items are included on request.
    pub fn get_pending_mutations(
        &self,
        include_auth_expired: bool,
    ) -> Result<Vec<MutationQueueItem>> {
        self.store
            .with_db(|db| db.pending_mutations(include_auth_expired))
    }

    /// Pending items whose backoff has elapsed.
    pub fn due_mutations(&self) -> Result<Vec<MutationQueueItem>> {
        let now = self.clock.now();
        Ok(self
            .get_pending_mutations(false)?
            .into_iter()
            .filter(|m| m.is_due(now))
            .collect())
    }

    /// Claims a pending item for replay. Returns false when it is no longer
    /// pending (another pass claimed it first).
    pub fn mark_syncing(&self, id: &str) -> Result<bool> {
        let now = self.clock.now();
        self.store.with_db(|db| db.claim_mutation(id, &now))
    }

    pub fn mark_success(&self, id: &str) -> Result<()> {
        self.set_status(id, MutationStatus::Success, None)
    }

    /// Fails an item permanently.
    pub fn mark_failed(&self, id: &str, error: &str) -> Result<()> {
        self.set_status(id, MutationStatus::Error, Some(error))
    }

    pub fn mark_conflict(&self, id: &str, error: Option<&str>) -> Result<()> {
        self.set_status(id, MutationStatus::Conflict, error)
    }

    /// Pauses an item until a manual sync resumes it. The retry count is
    /// left alone.
    pub fn mark_auth_expired(&self, id: &str) -> Result<()> {
        self.set_status(id, MutationStatus::Error, Some(AUTH_EXPIRED_ERROR))
    }

    /// Returns an item to `pending` without counting an attempt.
    pub fn requeue(&self, id: &str) -> Result<()> {
        self.set_status(id, MutationStatus::Pending, None)
    }

    fn set_status(&self, id: &str, status: MutationStatus, error: Option<&str>) -> Result<()> {
        let now = self.clock.now();
        self.store
            .with_db(|db| db.set_mutation_status(id, status, error, &now))
    }

    /// Counts a failed attempt, returns the item to `pending` not before
    /// `next_attempt_at`, and returns the new retry count.
    pub fn increment_retry(
        &self,
        id: &str,
        error: Option<&str>,
        next_attempt_at: Option<DateTime<Utc>>,
    ) -> Result<u32> {
        let now = self.clock.now();
        self.store
            .with_db(|db| db.increment_retry(id, error, next_attempt_at.as_ref(), &now))
    }

    /// Items still awaiting delivery: `pending` plus paused auth-expired
    /// errors.
    pub fn count_pending(&self) -> Result<u64> {
        self.store.with_db(|db| db.count_pending())
    }

    pub fn auth_expired_mutations(&self) -> Result<Vec<MutationQueueItem>> {
        Ok(self
            .store
            .with_db(|db| db.mutations_by_status(MutationStatus::Error))?
            .into_iter()
            .filter(|m| m.is_auth_expired())
            .collect())
    }

    /// Returns paused auth-expired items to `pending`.
    pub fn resume_auth_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let resumed = self.store.with_db(|db| db.resume_auth_expired(&now))?;
        if resumed > 0 {
            tracing::info!(resumed, "resumed mutations paused on expired session");
        }
        Ok(resumed)
    }

    /// Reclaims items a crashed pass left in `syncing` for longer than
    /// `stale_after`, and fails pending items already past `max_retries`.
    ///
    /// A reclaimed item has its interrupted attempt counted; if that uses up
    /// the last retry it is failed with `STUCK_IN_SYNC`, otherwise it goes
    /// back to `pending`. Returns the number of items cleaned.
    pub fn clean_stuck_mutations(&self, max_retries: u32, stale_after: Duration) -> Result<usize> {
        let now = self.clock.now();
        let cutoff = now
            .checked_sub_signed(stale_after.max(Duration::zero()))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let cleaned = self.store.with_db(|db| {
            db.in_transaction(|db| {
                let mut cleaned = 0;

                for item in db.stale_syncing(&cutoff)? {
                    let attempts = db.increment_retry(&item.id, Some(STUCK_ERROR), None, &now)?;
                    if attempts >= max_retries {
                        db.set_mutation_status(
                            &item.id,
                            MutationStatus::Error,
                            Some(STUCK_ERROR),
                            &now,
                        )?;
                    }
                    tracing::warn!(id = %item.id, attempts, "reclaimed stuck mutation");
                    cleaned += 1;
                }

                for item in db.pending_mutations(false)? {
                    if item.retry_count >= max_retries {
                        db.set_mutation_status(
                            &item.id,
                            MutationStatus::Error,
                            Some(RETRIES_EXHAUSTED_ERROR),
                            &now,
                        )?;
                        tracing::warn!(id = %item.id, retries = item.retry_count, "failed mutation past retry ceiling");
                        cleaned += 1;
                    }
                }

                Ok(cleaned)
            })
        })?;

        Ok(cleaned)
    }

    /// Deletes `success` records last updated more than `older_than` ago.
    pub fn purge_completed(&self, older_than: Duration) -> Result<usize> {
        let before = self
            .clock
            .now()
            .checked_sub_signed(older_than)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let purged = self
            .store
            .with_db(|db| db.delete_mutations_before(MutationStatus::Success, &before))?;
        if purged > 0 {
            tracing::debug!(purged, "purged completed mutations");
        }
        Ok(purged)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Conflicts
    // ─────────────────────────────────────────────────────────────────────

    pub fn record_conflict(&self, conflict: &SyncConflict) -> Result<()> {
        self.store.with_db(|db| db.put_conflict(conflict))
    }

    pub fn conflicts(&self) -> Result<Vec<SyncConflict>> {
        self.store.with_db(|db| db.all_conflicts())
    }

    /// Dismisses the conflict recorded for a mutation. The mutation itself
    /// stays in `conflict` and is never replayed.
    pub fn clear_conflict(&self, mutation_id: &str) -> Result<bool> {
        self.store.with_db(|db| db.delete_conflict(mutation_id))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sync metadata
    // ─────────────────────────────────────────────────────────────────────

    /// Stamps a finished pass on the global row and on each entity type the
    /// pass touched.
    pub fn record_sync_pass(&self, entity_types: &BTreeSet<String>, completed: bool) -> Result<()> {
        let now = self.clock.now();
        self.store.with_db(|db| {
            db.in_transaction(|db| {
                let keys = std::iter::once(GLOBAL_SYNC_KEY).chain(entity_types.iter().map(String::as_str));
                for key in keys {
                    let mut meta = db
                        .get_metadata(key)?
                        .unwrap_or_else(|| SyncMetadata::new(key));
                    meta.last_attempt = Some(now);
                    if completed {
                        meta.last_sync = Some(now);
                        meta.version = Some(meta.version.unwrap_or(0) + 1);
                    }
                    meta.pending_count = Some(if key == GLOBAL_SYNC_KEY {
                        db.count_pending()?
                    } else {
                        db.count_pending_for_entity(key)?
                    });
                    db.put_metadata(&meta)?;
                }
                Ok(())
            })
        })
    }

    pub fn sync_metadata(&self, entity_type: &str) -> Result<Option<SyncMetadata>> {
        self.store.with_db(|db| db.get_metadata(entity_type))
    }

    /// Time of the last completed pass.
    pub fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .sync_metadata(GLOBAL_SYNC_KEY)?
            .and_then(|meta| meta.last_sync))
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
