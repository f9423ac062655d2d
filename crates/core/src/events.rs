// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process publish/subscribe for sync lifecycle events.
//!
//! Listeners are plain callbacks. Events are not persisted; an event emitted
//! while nobody listens is dropped.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::mutation::MutationQueueItem;

/// Event published on the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A sync pass finished.
    SyncCompleted {
        success: usize,
        failed: usize,
        total: usize,
    },
    /// A sync pass aborted on a storage error.
    SyncFailed { error: String },
    /// A mutation was written to the outbox.
    MutationQueued { item: MutationQueueItem },
}

impl SyncEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            SyncEvent::SyncCompleted { .. } => "sync-completed",
            SyncEvent::SyncFailed { .. } => "sync-failed",
            SyncEvent::MutationQueued { .. } => "mutation-queued",
        }
    }
}

pub type Listener = Arc<dyn Fn(&SyncEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl Registry {
    fn remove(&self, id: u64) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.retain(|(lid, _)| *lid != id);
        }
    }
}

/// Cloneable event bus. Clones share listeners.
#[derive(Clone, Default)]
pub struct EventBus {
    registry: Arc<Registry>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. It stays registered until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SyncEvent) + Send + Sync + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.registry.listeners.lock() {
            listeners.push((id, Arc::new(listener)));
        }
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry
            .listeners
            .lock()
            .map(|l| l.len())
            .unwrap_or(0)
    }

    /// Delivers `event` to every current listener, in registration order.
    pub fn emit(&self, event: SyncEvent) {
        // Snapshot so listeners may (un)subscribe while being called.
        let listeners: Vec<Listener> = match self.registry.listeners.lock() {
            Ok(l) => l.iter().map(|(_, f)| Arc::clone(f)).collect(),
            Err(_) => return,
        };
        tracing::trace!(event = event.name(), listeners = listeners.len(), "emit");
        for listener in listeners {
            listener(&event);
        }
    }

    pub fn emit_sync_completed(&self, success: usize, failed: usize, total: usize) {
        self.emit(SyncEvent::SyncCompleted {
            success,
            failed,
            total,
        });
    }

    pub fn emit_sync_failed(&self, error: impl Into<String>) {
        self.emit(SyncEvent::SyncFailed {
            error: error.into(),
        });
    }

    pub fn emit_mutation_queued(&self, item: MutationQueueItem) {
        self.emit(SyncEvent::MutationQueued { item });
    }
}

/// Disposer for a registered listener.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<Registry>,
    id: u64,
}

impl Subscription {
    /// Removes the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
