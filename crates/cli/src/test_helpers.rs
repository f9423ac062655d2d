// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers: a scripted API client and in-memory queues.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ac_core::{EventBus, ManualClock, MutationQueue, ResponseCache, StoreHandle};
use chrono::{TimeZone, Utc};

use crate::api::{ApiClient, ApiError, ApiFuture, ApiRequest, ApiResponse, ApiResult};

/// Mock API client for testing without a server.
///
/// Replies are scripted per `"METHOD path"` key and consumed in order; once
/// a key runs out, the default reply is used.
pub struct MockApiClient {
    replies: Mutex<HashMap<String, VecDeque<ApiResult<ApiResponse>>>>,
    default_reply: Mutex<ApiResult<ApiResponse>>,
    /// Requests that were sent via send().
    requests: Mutex<Vec<ApiRequest>>,
    online: AtomicBool,
    refresh_enabled: AtomicBool,
    refresh_succeeds: AtomicBool,
    refresh_calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl MockApiClient {
    pub fn new() -> Self {
        MockApiClient {
            replies: Mutex::new(HashMap::new()),
            default_reply: Mutex::new(Ok(ApiResponse::new(200, None))),
            requests: Mutex::new(Vec::new()),
            online: AtomicBool::new(true),
            refresh_enabled: AtomicBool::new(false),
            refresh_succeeds: AtomicBool::new(false),
            refresh_calls: AtomicUsize::new(0),
            delay: Mutex::new(None),
        }
    }

    /// Queue a reply for the next `method path` request.
    pub fn reply(&self, method: &str, path: &str, reply: ApiResult<ApiResponse>) {
        self.replies
            .lock()
            .unwrap()
            .entry(format!("{} {}", method, path))
            .or_default()
            .push_back(reply);
    }

    pub fn reply_status(&self, method: &str, path: &str, status: u16) {
        self.reply(method, path, Ok(ApiResponse::new(status, None)));
    }

    pub fn reply_json(&self, method: &str, path: &str, status: u16, body: serde_json::Value) {
        self.reply(method, path, Ok(ApiResponse::new(status, Some(body))));
    }

    pub fn reply_network_error(&self, method: &str, path: &str) {
        self.reply(method, path, Err(ApiError::Network("connection refused".into())));
    }

    /// Reply used when no scripted reply is queued.
    pub fn set_default(&self, reply: ApiResult<ApiResponse>) {
        *self.default_reply.lock().unwrap() = reply;
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Enables token refresh; `succeeds` decides its outcome.
    pub fn enable_refresh(&self, succeeds: bool) {
        self.refresh_enabled.store(true, Ordering::SeqCst);
        self.refresh_succeeds.store(succeeds, Ordering::SeqCst);
    }

    /// Makes every send take `delay` before replying.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Get all requests that were sent.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let key = format!("{} {}", request.method, request.path);
        let scripted = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| self.default_reply.lock().unwrap().clone())
    }
}

impl Default for MockApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient for MockApiClient {
    fn send(&self, request: ApiRequest) -> ApiFuture<'_, ApiResult<ApiResponse>> {
        Box::pin(async move {
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let reply = self.next_reply(&request);
            self.requests.lock().unwrap().push(request);
            reply
        })
    }

    fn probe(&self) -> ApiFuture<'_, bool> {
        Box::pin(async move { self.online.load(Ordering::SeqCst) })
    }

    fn refresh_token(&self) -> ApiFuture<'_, bool> {
        Box::pin(async move {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            self.refresh_enabled.load(Ordering::SeqCst) && self.refresh_succeeds.load(Ordering::SeqCst)
        })
    }

    fn supports_refresh(&self) -> bool {
        self.refresh_enabled.load(Ordering::SeqCst)
    }
}

/// Everything a sync test needs, sharing one in-memory store and clock.
pub struct Fixture {
    pub store: StoreHandle,
    pub clock: Arc<ManualClock>,
    pub queue: MutationQueue,
    pub cache: ResponseCache,
    pub events: EventBus,
    pub client: Arc<MockApiClient>,
}

impl Fixture {
    pub fn new() -> Self {
        let store = StoreHandle::in_memory();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ));
        let queue = MutationQueue::with_clock(store.clone(), clock.clone());
        let cache = ResponseCache::with_clock(store.clone(), clock.clone());
        Fixture {
            store,
            clock,
            queue,
            cache,
            events: EventBus::new(),
            client: Arc::new(MockApiClient::new()),
        }
    }
}
