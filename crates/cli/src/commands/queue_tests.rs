// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::Error;
use crate::test_helpers::Fixture;
use ac_core::{Method, Priority};

fn args(method: Method, url: &str) -> MutationArgs {
    MutationArgs {
        method,
        url: url.to_string(),
        data: None,
        headers: Vec::new(),
        priority: Priority::Normal,
        entity_type: None,
        entity_id: None,
        optimistic_id: None,
        id: None,
    }
}

#[test]
fn add_queues_pending_item() {
    let fx = Fixture::new();
    let mut a = args(Method::Post, "/api/residents");
    a.data = Some(r#"{"name":"Ana"}"#.into());

    let item = add_impl(&fx.queue, a).unwrap();
    assert_eq!(item.status, MutationStatus::Pending);
    assert!(item.id.starts_with("mut-"));
    assert_eq!(fx.queue.count_pending().unwrap(), 1);
}

#[test]
fn add_with_bad_header_queues_nothing() {
    let fx = Fixture::new();
    let mut a = args(Method::Post, "/api/residents");
    a.headers = vec!["no-colon".into()];

    assert!(matches!(add_impl(&fx.queue, a), Err(Error::InvalidHeader(_))));
    assert_eq!(fx.queue.count_pending().unwrap(), 0);
}

#[test]
fn add_with_duplicate_id_fails() {
    let fx = Fixture::new();
    let mut a = args(Method::Put, "/api/centers/C1");
    a.id = Some("mut-fixed".into());
    add_impl(&fx.queue, a.clone()).unwrap();

    assert!(add_impl(&fx.queue, a).is_err());
}

#[test]
fn list_filters_by_status_and_entity() {
    let fx = Fixture::new();
    let mut center = args(Method::Patch, "/api/centers/C1/status");
    center.entity_type = Some("center".into());
    let center = add_impl(&fx.queue, center).unwrap();
    let resident = add_impl(&fx.queue, args(Method::Post, "/api/residents")).unwrap();
    fx.queue.mark_syncing(&resident.id).unwrap();
    fx.queue.mark_success(&resident.id).unwrap();

    assert_eq!(list_impl(&fx.queue, None, None).unwrap().len(), 2);

    let pending = list_impl(&fx.queue, Some(MutationStatus::Pending), None).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, center.id);

    let centers = list_impl(&fx.queue, None, Some("center".into())).unwrap();
    assert_eq!(centers.len(), 1);

    let none = list_impl(&fx.queue, Some(MutationStatus::Success), Some("center".into())).unwrap();
    assert!(none.is_empty());
}
