// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared, lazily opened access to the offline database.
//!
//! A [`StoreHandle`] memoizes one connection. Clones share it, the first
//! use opens and migrates it, and a connection-fatal failure drops it so the
//! next call reopens.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::db::Database;
use crate::error::{Error, Result};

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Path(PathBuf),
    /// Private in-memory database; lost when the handle reopens.
    InMemory,
}

/// Invoked with the error text when opening is blocked by another process.
pub type BlockedCallback = Arc<dyn Fn(&str) + Send + Sync>;

struct Inner {
    location: StoreLocation,
    conn: Mutex<Option<Arc<Mutex<Database>>>>,
    on_blocked: Mutex<Option<BlockedCallback>>,
}

/// Cloneable accessor to the memoized database connection.
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<Inner>,
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle")
            .field("location", &self.inner.location)
            .field("open", &self.is_open())
            .finish()
    }
}

impl StoreHandle {
    pub fn new(location: StoreLocation) -> Self {
        StoreHandle {
            inner: Arc::new(Inner {
                location,
                conn: Mutex::new(None),
                on_blocked: Mutex::new(None),
            }),
        }
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreLocation::Path(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(StoreLocation::InMemory)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.inner.location
    }

    /// Registers the callback run when opening hits a lock held elsewhere.
    pub fn on_blocked(&self, callback: BlockedCallback) {
        if let Ok(mut slot) = self.inner.on_blocked.lock() {
            *slot = Some(callback);
        }
    }

    /// True if a connection is currently memoized.
    pub fn is_open(&self) -> bool {
        self.inner
            .conn
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Returns the memoized connection, opening it on first use.
    pub fn connection(&self) -> Result<Arc<Mutex<Database>>> {
        let mut slot = self.inner.conn.lock().map_err(|_| Error::StoreClosed)?;
        if let Some(db) = slot.as_ref() {
            return Ok(Arc::clone(db));
        }

        let db = Arc::new(Mutex::new(self.open()?));
        *slot = Some(Arc::clone(&db));
        Ok(db)
    }

    fn open(&self) -> Result<Database> {
        let result = match &self.inner.location {
            StoreLocation::Path(path) => Database::open(path),
            StoreLocation::InMemory => Database::open_in_memory(),
        };

        match result {
            Ok(db) => {
                tracing::debug!(location = ?self.inner.location, "opened offline store");
                Ok(db)
            }
            Err(e) if e.is_busy() => {
                let message = e.to_string();
                tracing::warn!(error = %message, "offline store upgrade blocked");
                let callback = self
                    .inner
                    .on_blocked
                    .lock()
                    .ok()
                    .and_then(|slot| slot.clone());
                if let Some(callback) = callback {
                    callback(&message);
                }
                Err(Error::StoreBlocked(message))
            }
            Err(e) => Err(e),
        }
    }

    /// Runs `f` against the database, dropping the memoized connection when
    /// the failure means it is unusable.
    pub fn with_db<T>(&self, f: impl FnOnce(&mut Database) -> Result<T>) -> Result<T> {
        let db = self.connection()?;
        let result = match db.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(_) => Err(Error::StoreClosed),
        };

        if let Err(e) = &result {
            if e.is_connection_lost() {
                tracing::warn!(error = %e, "offline store connection lost, resetting");
                self.reset();
            }
        }
        result
    }

    fn reset(&self) {
        if let Ok(mut slot) = self.inner.conn.lock() {
            *slot = None;
        }
    }

    /// Drops the memoized connection. The next use reopens it.
    pub fn close(&self) {
        self.reset();
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
