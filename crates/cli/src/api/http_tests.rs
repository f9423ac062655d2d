// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use yare::parameterized;

fn client(base_url: &str, refresh_path: Option<&str>) -> HttpApiClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 2,
        health_path: "/api/health".to_string(),
        refresh_path: refresh_path.map(str::to_string),
    };
    HttpApiClient::new(&config, Some("t0".into())).unwrap()
}

/// Serves one canned HTTP response and returns the raw request it received.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let n = socket.read(&mut buf).await.unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&buf[..n]).to_string()
    });
    (format!("http://{}", addr), handle)
}

#[parameterized(
    rooted = { "/api/centers", "http://api.test/api/centers" },
    relative = { "api/centers", "http://api.test/api/centers" },
    absolute = { "https://other.test/x", "https://other.test/x" },
)]
fn url_resolution(path: &str, expected: &str) {
    let client = client("http://api.test/", None);
    assert_eq!(client.url_for(path), expected);
}

#[test]
fn body_parsing() {
    assert_eq!(parse_body(""), None);
    assert_eq!(parse_body("{\"ok\":true}"), Some(json!({"ok": true})));
    assert_eq!(parse_body("Bad Gateway"), Some(json!("Bad Gateway")));
}

#[parameterized(
    camel = { json!({"accessToken": "a"}), Some("a") },
    snake = { json!({"access_token": "b"}), Some("b") },
    plain = { json!({"token": "c"}), Some("c") },
    missing = { json!({"user": "x"}), None },
)]
fn token_extraction(body: serde_json::Value, expected: Option<&str>) {
    assert_eq!(extract_token(&body).as_deref(), expected);
}

#[test]
fn refresh_support_follows_config() {
    assert!(!client("http://api.test", None).supports_refresh());
    assert!(client("http://api.test", Some("/api/auth/refresh")).supports_refresh());
}

#[tokio::test]
async fn refresh_without_endpoint_fails_fast() {
    assert!(!client("http://api.test", None).refresh_token().await);
}

#[tokio::test]
async fn probe_unreachable_host_is_offline() {
    let client = client("http://127.0.0.1:9", None);
    assert!(!client.probe().await);
}

#[tokio::test]
async fn send_unreachable_host_is_network_error() {
    let client = client("http://127.0.0.1:9", None);
    let err = client.send(ApiRequest::get("/api/centers")).await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_) | ApiError::Timeout));
}

#[tokio::test]
async fn send_returns_status_and_json_body() {
    let (base, server) = serve_once("201 Created", "{\"id\":\"C1\"}").await;
    let client = client(&base, None);

    let mut request = ApiRequest::mutation(
        ac_core::Method::Post,
        "/api/centers",
        Some(json!({"name": "Liceo"})),
        Default::default(),
    );
    request.headers.insert("X-Client".into(), "ac".into());
    let response = client.send(request).await.unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.body, Some(json!({"id": "C1"})));

    let raw = server.await.unwrap().to_lowercase();
    assert!(raw.starts_with("post /api/centers"));
    assert!(raw.contains("authorization: bearer t0"));
    assert!(raw.contains("x-client: ac"));
}

#[tokio::test]
async fn server_errors_are_responses_not_errors() {
    let (base, _server) = serve_once("503 Service Unavailable", "").await;
    let response = client(&base, None)
        .send(ApiRequest::get("/api/centers"))
        .await
        .unwrap();
    assert_eq!(response.status, 503);
    assert!(response.body.is_none());
}

#[tokio::test]
async fn refresh_stores_new_token() {
    let (base, server) = serve_once("200 OK", "{\"accessToken\":\"t1\"}").await;
    let client = client(&base, Some("/api/auth/refresh"));

    assert!(client.refresh_token().await);
    assert_eq!(client.current_token().as_deref(), Some("t1"));
    assert!(server.await.unwrap().starts_with("POST /api/auth/refresh"));
}
