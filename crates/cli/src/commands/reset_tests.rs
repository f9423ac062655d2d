// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::Fixture;
use ac_core::{Method, NewMutation};

#[test]
fn requires_confirmation() {
    let fx = Fixture::new();
    fx.queue
        .enqueue_mutation(NewMutation::new(Method::Post, "/api/residents"))
        .unwrap();

    assert!(matches!(run_impl(&fx.store, false), Err(Error::ConfirmationRequired)));
    assert_eq!(fx.queue.count_pending().unwrap(), 1);
}

#[test]
fn clears_every_collection() {
    let fx = Fixture::new();
    fx.queue
        .enqueue_mutation(NewMutation::new(Method::Post, "/api/residents"))
        .unwrap();
    fx.cache.put("/api/centers", serde_json::json!([]), None).unwrap();

    run_impl(&fx.store, true).unwrap();

    let stats = fx.store.with_db(|db| db.stats()).unwrap();
    assert_eq!(stats, ac_core::StoreStats::default());
}
