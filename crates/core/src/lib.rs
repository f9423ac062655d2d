// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ac-core: durable offline outbox for AppCopio field clients
//!
//! This crate provides the data model, the SQLite store, the queue manager,
//! the response cache and the event bus used by the `ac` CLI and its sync
//! engine.

pub mod backoff;
pub mod cache;
pub mod clock;
pub mod db;
pub mod error;
pub mod events;
pub mod id;
pub mod mutation;
pub mod queue;
pub mod record;
pub mod store;

pub use backoff::RetryPolicy;
pub use cache::ResponseCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use db::Database;
pub use error::{Error, Result};
pub use events::{EventBus, Subscription, SyncEvent};
pub use mutation::{
    Method, MutationQueueItem, MutationStatus, NewMutation, Priority, AUTH_EXPIRED_ERROR,
    STUCK_ERROR,
};
pub use queue::{MutationFilter, MutationQueue};
pub use record::{CachedResponse, StoreExport, StoreStats, SyncConflict, SyncMetadata};
pub use store::{StoreHandle, StoreLocation};
