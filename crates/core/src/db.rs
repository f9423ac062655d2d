// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable store for the offline layer.
//!
//! The [`Database`] struct provides CRUD and indexed queries over the
//! response cache, the mutation queue, sync metadata and sync conflicts.
//! Status transitions are single statements so each one is atomic.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::mutation::{MutationQueueItem, MutationStatus, Priority, AUTH_EXPIRED_ERROR};
use crate::record::{CachedResponse, StoreExport, StoreStats, SyncConflict, SyncMetadata};

/// Current schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 2;

/// Version 1: response cache, mutation queue and sync metadata.
const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS cached_responses (
    url TEXT PRIMARY KEY,
    data TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    etag TEXT,
    expires_at TEXT
);

-- seq keeps enqueue order for items stamped with the same timestamp
CREATE TABLE IF NOT EXISTS mutation_queue (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    url TEXT NOT NULL,
    method TEXT NOT NULL,
    data TEXT,
    headers TEXT,
    timestamp TEXT NOT NULL,
    retry_count INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    optimistic_id TEXT,
    entity_type TEXT,
    entity_id TEXT,
    error TEXT,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sync_metadata (
    entity_type TEXT PRIMARY KEY,
    last_sync TEXT,
    last_attempt TEXT,
    version INTEGER,
    pending_count INTEGER
);

CREATE INDEX IF NOT EXISTS idx_cache_timestamp ON cached_responses(timestamp);
CREATE INDEX IF NOT EXISTS idx_queue_timestamp ON mutation_queue(timestamp);
CREATE INDEX IF NOT EXISTS idx_queue_status ON mutation_queue(status);
CREATE INDEX IF NOT EXISTS idx_queue_entity_type ON mutation_queue(entity_type);
"#;

/// Version 2: conflict records. Queue columns are added separately.
const SCHEMA_V2: &str = r#"
CREATE TABLE IF NOT EXISTS sync_conflicts (
    mutation_id TEXT PRIMARY KEY,
    entity_type TEXT,
    entity_id TEXT,
    local_version TEXT NOT NULL,
    remote_version TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    error TEXT
);

CREATE INDEX IF NOT EXISTS idx_conflicts_timestamp ON sync_conflicts(timestamp);
"#;

const MUTATION_COLUMNS: &str = "id, url, method, data, headers, timestamp, retry_count, status,
     priority, optimistic_id, entity_type, entity_id, error, next_attempt_at, updated_at";

const PENDING_ORDER: &str = "ORDER BY priority ASC, timestamp ASC, seq ASC";

/// Format a timestamp with fixed width so text order matches time order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

fn parse_timestamp_opt(
    value: Option<String>,
    column: &str,
) -> std::result::Result<Option<DateTime<Utc>>, rusqlite::Error> {
    value.map(|s| parse_timestamp(&s, column)).transpose()
}

fn parse_json<T: serde::de::DeserializeOwned>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    serde_json::from_str(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid json in column '{column}': {e}"
            ))),
        )
    })
}

fn row_to_mutation(row: &Row<'_>) -> std::result::Result<MutationQueueItem, rusqlite::Error> {
    let method: String = row.get(2)?;
    let data: Option<String> = row.get(3)?;
    let headers: Option<String> = row.get(4)?;
    let timestamp: String = row.get(5)?;
    let status: String = row.get(7)?;
    let priority: i64 = row.get(8)?;
    let next_attempt_at: Option<String> = row.get(13)?;
    let updated_at: String = row.get(14)?;

    let headers: BTreeMap<String, String> = match headers {
        Some(h) => parse_json(&h, "headers")?,
        None => BTreeMap::new(),
    };

    Ok(MutationQueueItem {
        id: row.get(0)?,
        url: row.get(1)?,
        method: parse_db(&method, "method")?,
        data: data.map(|d| parse_json(&d, "data")).transpose()?,
        headers,
        timestamp: parse_timestamp(&timestamp, "timestamp")?,
        retry_count: row.get(6)?,
        status: parse_db(&status, "status")?,
        priority: Priority::from_rank(priority).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                8,
                rusqlite::types::Type::Integer,
                Box::new(e),
            )
        })?,
        optimistic_id: row.get(9)?,
        entity_type: row.get(10)?,
        entity_id: row.get(11)?,
        error: row.get(12)?,
        next_attempt_at: parse_timestamp_opt(next_attempt_at, "next_attempt_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

fn row_to_cached(row: &Row<'_>) -> std::result::Result<CachedResponse, rusqlite::Error> {
    let data: String = row.get(1)?;
    let timestamp: String = row.get(2)?;
    let expires_at: Option<String> = row.get(4)?;
    Ok(CachedResponse {
        url: row.get(0)?,
        data: parse_json(&data, "data")?,
        timestamp: parse_timestamp(&timestamp, "timestamp")?,
        etag: row.get(3)?,
        expires_at: parse_timestamp_opt(expires_at, "expires_at")?,
    })
}

fn row_to_metadata(row: &Row<'_>) -> std::result::Result<SyncMetadata, rusqlite::Error> {
    Ok(SyncMetadata {
        entity_type: row.get(0)?,
        last_sync: parse_timestamp_opt(row.get(1)?, "last_sync")?,
        last_attempt: parse_timestamp_opt(row.get(2)?, "last_attempt")?,
        version: row.get(3)?,
        pending_count: row.get::<_, Option<i64>>(4)?.map(|c| c.max(0) as u64),
    })
}

fn row_to_conflict(row: &Row<'_>) -> std::result::Result<SyncConflict, rusqlite::Error> {
    let local: String = row.get(3)?;
    let remote: String = row.get(4)?;
    let timestamp: String = row.get(5)?;
    Ok(SyncConflict {
        mutation_id: row.get(0)?,
        entity_type: row.get(1)?,
        entity_id: row.get(2)?,
        local_version: parse_json(&local, "local_version")?,
        remote_version: parse_json(&remote, "remote_version")?,
        timestamp: parse_timestamp(&timestamp, "timestamp")?,
        error: row.get(6)?,
    })
}

/// Run schema creation and all migrations on a database connection.
///
/// Migrations only add tables, columns and indexes so queued mutations
/// survive upgrades. The whole upgrade runs in one immediate transaction;
/// a lock held elsewhere surfaces as a busy error instead of a partial
/// upgrade.
pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let version: i64 = tx.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version > SCHEMA_VERSION {
        return Err(Error::CorruptedData(format!(
            "database schema version {version} is newer than supported version {SCHEMA_VERSION}"
        )));
    }

    if version < 1 {
        tx.execute_batch(SCHEMA_V1)?;
    }
    if version < 2 {
        tx.execute_batch(SCHEMA_V2)?;
        migrate_add_queue_columns(&tx)?;
    }

    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))?;
    tx.commit()?;
    Ok(())
}

/// Migration: add priority and backoff columns to the queue.
fn migrate_add_queue_columns(conn: &Connection) -> Result<()> {
    let columns = [
        ("priority", "INTEGER NOT NULL DEFAULT 1"),
        ("next_attempt_at", "TEXT"),
    ];

    for (column, decl) in columns {
        let has_column: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('mutation_queue') WHERE name = ?1",
                [column],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !has_column {
            let sql = format!("ALTER TABLE mutation_queue ADD COLUMN {column} {decl}");
            conn.execute(&sql, [])?;
        }
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_queue_order
         ON mutation_queue(status, priority, timestamp, seq)",
        [],
    )?;
    Ok(())
}

/// SQLite connection with offline store operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        run_migrations(&mut conn)?;
        Ok(Database { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        run_migrations(&mut conn)?;
        Ok(Database { conn })
    }

    /// Runs `f` inside a transaction, committing only if it succeeds.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(self)?;
        tx.commit()?;
        Ok(value)
    }

    /// Current schema version.
    pub fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutation queue
    // ─────────────────────────────────────────────────────────────────────

    /// Insert or update a mutation, keeping its original enqueue order.
    pub fn put_mutation(&self, item: &MutationQueueItem) -> Result<()> {
        let data = item.data.as_ref().map(serde_json::to_string).transpose()?;
        let headers = if item.headers.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&item.headers)?)
        };

        self.conn.execute(
            "INSERT INTO mutation_queue (id, url, method, data, headers, timestamp, retry_count,
             status, priority, optimistic_id, entity_type, entity_id, error, next_attempt_at,
             updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(id) DO UPDATE SET
                url = excluded.url,
                method = excluded.method,
                data = excluded.data,
                headers = excluded.headers,
                timestamp = excluded.timestamp,
                retry_count = excluded.retry_count,
                status = excluded.status,
                priority = excluded.priority,
                optimistic_id = excluded.optimistic_id,
                entity_type = excluded.entity_type,
                entity_id = excluded.entity_id,
                error = excluded.error,
                next_attempt_at = excluded.next_attempt_at,
                updated_at = excluded.updated_at",
            params![
                item.id,
                item.url,
                item.method.as_str(),
                data,
                headers,
                format_timestamp(&item.timestamp),
                item.retry_count,
                item.status.as_str(),
                item.priority.rank(),
                item.optimistic_id,
                item.entity_type,
                item.entity_id,
                item.error,
                item.next_attempt_at.as_ref().map(format_timestamp),
                format_timestamp(&item.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Get a mutation by ID.
    pub fn get_mutation(&self, id: &str) -> Result<MutationQueueItem> {
        let sql = format!("SELECT {MUTATION_COLUMNS} FROM mutation_queue WHERE id = ?1");
        let item = self
            .conn
            .query_row(&sql, params![id], row_to_mutation)
            .optional()?;
        item.ok_or_else(|| Error::MutationNotFound(id.to_string()))
    }

    /// Check if a mutation exists.
    pub fn mutation_exists(&self, id: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM mutation_queue WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Delete a mutation. Returns false if it did not exist.
    pub fn delete_mutation(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM mutation_queue WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }

    fn query_mutations(
        &self,
        filter: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<MutationQueueItem>> {
        let sql = format!("SELECT {MUTATION_COLUMNS} FROM mutation_queue {filter}");
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params, row_to_mutation)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// All mutations in enqueue order.
    pub fn all_mutations(&self) -> Result<Vec<MutationQueueItem>> {
        self.query_mutations("ORDER BY seq ASC", &[])
    }

    /// Mutations with the given status, oldest first.
    pub fn mutations_by_status(&self, status: MutationStatus) -> Result<Vec<MutationQueueItem>> {
        self.query_mutations(
            "WHERE status = ?1 ORDER BY timestamp ASC, seq ASC",
            &[&status.as_str()],
        )
    }

    /// Mutations for an entity type, oldest first.
    pub fn mutations_by_entity_type(&self, entity_type: &str) -> Result<Vec<MutationQueueItem>> {
        self.query_mutations(
            "WHERE entity_type = ?1 ORDER BY timestamp ASC, seq ASC",
            &[&entity_type],
        )
    }

    /// Mutations created in `[from, to)`, oldest first.
    pub fn mutations_in_range(
        &self,
        from: &DateTime<Utc>,
        to: &DateTime<Utc>,
    ) -> Result<Vec<MutationQueueItem>> {
        self.query_mutations(
            "WHERE timestamp >= ?1 AND timestamp < ?2 ORDER BY timestamp ASC, seq ASC",
            &[&format_timestamp(from), &format_timestamp(to)],
        )
    }

    /// Replay candidates in replay order: priority tier, then age, then
    /// enqueue order. Paused auth-expired items are included on request.
    pub fn pending_mutations(&self, include_auth_expired: bool) -> Result<Vec<MutationQueueItem>> {
        if include_auth_expired {
            self.query_mutations(
                &format!(
                    "WHERE status = 'pending' OR (status = 'error' AND error = ?1) {PENDING_ORDER}"
                ),
                &[&AUTH_EXPIRED_ERROR],
            )
        } else {
            self.query_mutations(&format!("WHERE status = 'pending' {PENDING_ORDER}"), &[])
        }
    }

    /// Mutations left in `syncing` since before `before`.
    pub fn stale_syncing(&self, before: &DateTime<Utc>) -> Result<Vec<MutationQueueItem>> {
        self.query_mutations(
            "WHERE status = 'syncing' AND updated_at < ?1 ORDER BY seq ASC",
            &[&format_timestamp(before)],
        )
    }

    /// Count items that still await delivery.
    pub fn count_pending(&self) -> Result<u64> {
        self.count_pending_where("", &[])
    }

    /// Count items of one entity type that still await delivery.
    pub fn count_pending_for_entity(&self, entity_type: &str) -> Result<u64> {
        self.count_pending_where(" AND entity_type = ?2", &[&entity_type])
    }

    fn count_pending_where(&self, extra: &str, extra_params: &[&dyn rusqlite::ToSql]) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM mutation_queue
             WHERE (status = 'pending' OR (status = 'error' AND error = ?1)){extra}"
        );
        let mut params: Vec<&dyn rusqlite::ToSql> = vec![&AUTH_EXPIRED_ERROR];
        params.extend_from_slice(extra_params);
        let count: i64 = self
            .conn
            .query_row(&sql, params.as_slice(), |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Claim a pending mutation for replay. Returns false if another pass
    /// already holds it or it is no longer pending.
    pub fn claim_mutation(&self, id: &str, now: &DateTime<Utc>) -> Result<bool> {
        let affected = self.conn.execute(
            "UPDATE mutation_queue SET status = 'syncing', updated_at = ?1
             WHERE id = ?2 AND status = 'pending'",
            params![format_timestamp(now), id],
        )?;
        Ok(affected > 0)
    }

    /// Set a mutation's status and error message.
    pub fn set_mutation_status(
        &self,
        id: &str,
        status: MutationStatus,
        error: Option<&str>,
        now: &DateTime<Utc>,
    ) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE mutation_queue SET status = ?1, error = ?2, next_attempt_at = NULL,
             updated_at = ?3 WHERE id = ?4",
            params![status.as_str(), error, format_timestamp(now), id],
        )?;

        if affected == 0 {
            return Err(Error::MutationNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Count one more failed attempt and return the item to `pending`.
    /// Returns the new retry count.
    pub fn increment_retry(
        &self,
        id: &str,
        error: Option<&str>,
        next_attempt_at: Option<&DateTime<Utc>>,
        now: &DateTime<Utc>,
    ) -> Result<u32> {
        let count = self
            .conn
            .query_row(
                "UPDATE mutation_queue SET retry_count = retry_count + 1, status = 'pending',
                 error = ?1, next_attempt_at = ?2, updated_at = ?3
                 WHERE id = ?4 RETURNING retry_count",
                params![
                    error,
                    next_attempt_at.map(format_timestamp),
                    format_timestamp(now),
                    id
                ],
                |row| row.get(0),
            )
            .optional()?;
        count.ok_or_else(|| Error::MutationNotFound(id.to_string()))
    }

    /// Return every auth-expired item to `pending`. Returns how many moved.
    pub fn resume_auth_expired(&self, now: &DateTime<Utc>) -> Result<usize> {
        let affected = self.conn.execute(
            "UPDATE mutation_queue SET status = 'pending', error = NULL, next_attempt_at = NULL,
             updated_at = ?1 WHERE status = 'error' AND error = ?2",
            params![format_timestamp(now), AUTH_EXPIRED_ERROR],
        )?;
        Ok(affected)
    }

    /// Delete items with `status` last updated before `before`.
    pub fn delete_mutations_before(
        &self,
        status: MutationStatus,
        before: &DateTime<Utc>,
    ) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM mutation_queue WHERE status = ?1 AND updated_at < ?2",
            params![status.as_str(), format_timestamp(before)],
        )?;
        Ok(affected)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Response cache
    // ─────────────────────────────────────────────────────────────────────

    /// Insert or overwrite a cached response.
    pub fn put_cached(&self, entry: &CachedResponse) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cached_responses (url, data, timestamp, etag, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.url,
                serde_json::to_string(&entry.data)?,
                format_timestamp(&entry.timestamp),
                entry.etag,
                entry.expires_at.as_ref().map(format_timestamp),
            ],
        )?;
        Ok(())
    }

    /// Get a cached response by URL.
    pub fn get_cached(&self, url: &str) -> Result<Option<CachedResponse>> {
        Ok(self
            .conn
            .query_row(
                "SELECT url, data, timestamp, etag, expires_at FROM cached_responses WHERE url = ?1",
                params![url],
                row_to_cached,
            )
            .optional()?)
    }

    /// Delete a cached response. Returns false if it did not exist.
    pub fn delete_cached(&self, url: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM cached_responses WHERE url = ?1", params![url])?;
        Ok(affected > 0)
    }

    /// Delete every cached response whose URL starts with `prefix`.
    pub fn delete_cached_prefix(&self, prefix: &str) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM cached_responses WHERE substr(url, 1, length(?1)) = ?1",
            params![prefix],
        )?;
        Ok(affected)
    }

    /// All cached responses, by URL.
    pub fn all_cached(&self) -> Result<Vec<CachedResponse>> {
        self.query_cached("ORDER BY url ASC", &[])
    }

    /// Cached responses stored before `before`, oldest first.
    pub fn cached_before(&self, before: &DateTime<Utc>) -> Result<Vec<CachedResponse>> {
        self.query_cached(
            "WHERE timestamp < ?1 ORDER BY timestamp ASC",
            &[&format_timestamp(before)],
        )
    }

    fn query_cached(
        &self,
        filter: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<CachedResponse>> {
        let sql =
            format!("SELECT url, data, timestamp, etag, expires_at FROM cached_responses {filter}");
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params, row_to_cached)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Delete entries past their explicit expiry, or stored before
    /// `horizon_cutoff` when they have none.
    pub fn delete_expired_cache(
        &self,
        now: &DateTime<Utc>,
        horizon_cutoff: &DateTime<Utc>,
    ) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM cached_responses
             WHERE (expires_at IS NOT NULL AND expires_at <= ?1)
                OR (expires_at IS NULL AND timestamp <= ?2)",
            params![format_timestamp(now), format_timestamp(horizon_cutoff)],
        )?;
        Ok(affected)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sync metadata
    // ─────────────────────────────────────────────────────────────────────

    /// Insert or overwrite metadata for an entity type.
    pub fn put_metadata(&self, meta: &SyncMetadata) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sync_metadata
             (entity_type, last_sync, last_attempt, version, pending_count)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                meta.entity_type,
                meta.last_sync.as_ref().map(format_timestamp),
                meta.last_attempt.as_ref().map(format_timestamp),
                meta.version,
                meta.pending_count.map(|c| c as i64),
            ],
        )?;
        Ok(())
    }

    /// Get metadata for an entity type.
    pub fn get_metadata(&self, entity_type: &str) -> Result<Option<SyncMetadata>> {
        Ok(self
            .conn
            .query_row(
                "SELECT entity_type, last_sync, last_attempt, version, pending_count
                 FROM sync_metadata WHERE entity_type = ?1",
                params![entity_type],
                row_to_metadata,
            )
            .optional()?)
    }

    /// Delete metadata for an entity type.
    pub fn delete_metadata(&self, entity_type: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM sync_metadata WHERE entity_type = ?1",
            params![entity_type],
        )?;
        Ok(affected > 0)
    }

    /// All metadata rows.
    pub fn all_metadata(&self) -> Result<Vec<SyncMetadata>> {
        let mut stmt = self.conn.prepare(
            "SELECT entity_type, last_sync, last_attempt, version, pending_count
             FROM sync_metadata ORDER BY entity_type ASC",
        )?;
        let rows = stmt
            .query_map([], row_to_metadata)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Conflicts
    // ─────────────────────────────────────────────────────────────────────

    /// Insert or overwrite the conflict recorded for a mutation.
    pub fn put_conflict(&self, conflict: &SyncConflict) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sync_conflicts
             (mutation_id, entity_type, entity_id, local_version, remote_version, timestamp, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                conflict.mutation_id,
                conflict.entity_type,
                conflict.entity_id,
                serde_json::to_string(&conflict.local_version)?,
                serde_json::to_string(&conflict.remote_version)?,
                format_timestamp(&conflict.timestamp),
                conflict.error,
            ],
        )?;
        Ok(())
    }

    /// Get the conflict recorded for a mutation.
    pub fn get_conflict(&self, mutation_id: &str) -> Result<Option<SyncConflict>> {
        Ok(self
            .conn
            .query_row(
                "SELECT mutation_id, entity_type, entity_id, local_version, remote_version,
                        timestamp, error
                 FROM sync_conflicts WHERE mutation_id = ?1",
                params![mutation_id],
                row_to_conflict,
            )
            .optional()?)
    }

    /// Delete the conflict recorded for a mutation.
    pub fn delete_conflict(&self, mutation_id: &str) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM sync_conflicts WHERE mutation_id = ?1",
            params![mutation_id],
        )?;
        Ok(affected > 0)
    }

    /// All conflicts, oldest first.
    pub fn all_conflicts(&self) -> Result<Vec<SyncConflict>> {
        let mut stmt = self.conn.prepare(
            "SELECT mutation_id, entity_type, entity_id, local_version, remote_version,
                    timestamp, error
             FROM sync_conflicts ORDER BY timestamp ASC, mutation_id ASC",
        )?;
        let rows = stmt
            .query_map([], row_to_conflict)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Whole-store operations
    // ─────────────────────────────────────────────────────────────────────

    /// Remove every row from every collection.
    pub fn clear_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM cached_responses;
             DELETE FROM mutation_queue;
             DELETE FROM sync_metadata;
             DELETE FROM sync_conflicts;",
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Dump every collection.
    pub fn export_all(&self, now: DateTime<Utc>) -> Result<StoreExport> {
        Ok(StoreExport {
            exported_at: now,
            mutations: self.all_mutations()?,
            cache: self.all_cached()?,
            metadata: self.all_metadata()?,
            conflicts: self.all_conflicts()?,
        })
    }

    /// Row counts per collection.
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |table: &str| -> Result<u64> {
            let n: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n as u64)
        };

        Ok(StoreStats {
            cached_responses: count("cached_responses")?,
            mutations: count("mutation_queue")?,
            pending_mutations: self.count_pending()?,
            sync_metadata: count("sync_metadata")?,
            conflicts: count("sync_conflicts")?,
        })
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;
