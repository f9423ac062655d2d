// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::Fixture;
use ac_core::{Method, MutationStatus, NewMutation, AUTH_EXPIRED_ERROR};

fn enqueue(fx: &Fixture, url: &str) -> String {
    fx.queue
        .enqueue_mutation(NewMutation::new(Method::Post, url))
        .unwrap()
        .id
}

#[tokio::test]
async fn offline_leaves_outbox_untouched() {
    let fx = Fixture::new();
    fx.client.set_online(false);
    let id = enqueue(&fx, "/api/residents");

    let result = run_impl(fx.client.clone(), fx.queue.clone(), fx.cache.clone(), RetryPolicy::default())
        .await
        .unwrap();

    assert!(result.is_none());
    let item = fx.queue.get_mutation(&id).unwrap();
    assert_eq!(item.status, MutationStatus::Pending);
    assert_eq!(item.retry_count, 0);
    assert_eq!(fx.client.request_count(), 0);
}

#[tokio::test]
async fn online_pass_replays_outbox() {
    let fx = Fixture::new();
    enqueue(&fx, "/api/residents");
    enqueue(&fx, "/api/supplies");

    let result = run_impl(fx.client.clone(), fx.queue.clone(), fx.cache.clone(), RetryPolicy::default())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.success, 2);
    assert_eq!(fx.queue.count_pending().unwrap(), 0);
}

#[tokio::test]
async fn manual_pass_resumes_expired_session() {
    let fx = Fixture::new();
    let id = enqueue(&fx, "/api/residents");
    fx.queue.mark_syncing(&id).unwrap();
    fx.queue.mark_auth_expired(&id).unwrap();
    assert_eq!(
        fx.queue.get_mutation(&id).unwrap().error.as_deref(),
        Some(AUTH_EXPIRED_ERROR)
    );

    let result = run_impl(fx.client.clone(), fx.queue.clone(), fx.cache.clone(), RetryPolicy::default())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.success, 1);
    assert_eq!(fx.queue.get_mutation(&id).unwrap().status, MutationStatus::Success);
}
