// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::mutation::{Method, NewMutation};
use chrono::Utc;
use yare::parameterized;

fn recorder(bus: &EventBus) -> (Subscription, Arc<Mutex<Vec<SyncEvent>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = bus.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
    (sub, seen)
}

#[parameterized(
    completed = { SyncEvent::SyncCompleted { success: 1, failed: 0, total: 1 }, "sync-completed" },
    failed = { SyncEvent::SyncFailed { error: "disk".into() }, "sync-failed" },
)]
fn event_names(event: SyncEvent, name: &str) {
    assert_eq!(event.name(), name);
}

#[test]
fn listeners_receive_typed_events() {
    let bus = EventBus::new();
    let (_sub, seen) = recorder(&bus);

    bus.emit_sync_completed(2, 1, 3);
    bus.emit_sync_failed("database is locked");

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            SyncEvent::SyncCompleted {
                success: 2,
                failed: 1,
                total: 3
            },
            SyncEvent::SyncFailed {
                error: "database is locked".into()
            },
        ]
    );
}

#[test]
fn mutation_queued_carries_item() {
    let bus = EventBus::new();
    let (_sub, seen) = recorder(&bus);
    let new = NewMutation::new(Method::Post, "/api/centers");
    let item = MutationQueueItem::from_new("m1".into(), new, Method::Post, Utc::now());

    bus.emit_mutation_queued(item.clone());

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].name(), "mutation-queued");
    assert_eq!(seen[0], SyncEvent::MutationQueued { item });
}

#[test]
fn dropping_subscription_unsubscribes() {
    let bus = EventBus::new();
    let (sub, seen) = recorder(&bus);
    assert_eq!(bus.listener_count(), 1);

    sub.unsubscribe();
    bus.emit_sync_failed("x");

    assert_eq!(bus.listener_count(), 0);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn emit_without_listeners_is_dropped() {
    let bus = EventBus::new();
    bus.emit_sync_completed(0, 0, 0);
    assert_eq!(bus.listener_count(), 0);
}

#[test]
fn clones_share_listeners() {
    let bus = EventBus::new();
    let other = bus.clone();
    let (_sub, seen) = recorder(&bus);

    other.emit_sync_completed(1, 0, 1);

    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn subscription_outliving_bus_is_harmless() {
    let bus = EventBus::new();
    let (sub, _seen) = recorder(&bus);
    drop(bus);
    drop(sub);
}
