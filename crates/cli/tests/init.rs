// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;
use yare::parameterized;

#[test]
fn creates_work_dir() {
    let temp = TempDir::new().unwrap();

    ac().arg("init")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized offline store"))
        .stdout(predicate::str::contains("http://localhost:4000"));

    assert!(temp.path().join(".appcopio/config.toml").exists());
    assert!(temp.path().join(".appcopio/offline.db").exists());
    assert!(temp.path().join(".appcopio/.gitignore").exists());
}

#[test]
fn fails_if_already_initialized() {
    let temp = init_temp();

    ac().arg("init")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn records_backend_options() {
    let temp = TempDir::new().unwrap();

    ac().args([
        "init",
        "--api-url",
        "https://api.example.org",
        "--refresh-path",
        "/api/auth/refresh",
    ])
    .current_dir(temp.path())
    .assert()
    .success()
    .stdout(predicate::str::contains("Token refresh: /api/auth/refresh"));

    let config = std::fs::read_to_string(temp.path().join(".appcopio/config.toml")).unwrap();
    assert!(config.contains("base_url = \"https://api.example.org\""));
}

#[test]
fn rejects_url_without_scheme() {
    let temp = TempDir::new().unwrap();

    ac().args(["init", "--api-url", "api.example.org"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with http://"));
}

#[test]
fn directory_flag_targets_other_path() {
    let temp = TempDir::new().unwrap();

    ac().args(["-C", temp.path().to_str().unwrap(), "init"])
        .assert()
        .success();

    assert!(temp.path().join(".appcopio/config.toml").exists());
}

#[parameterized(
    status = { &["status"] },
    queue_list = { &["queue", "list"] },
    sync = { &["sync"] },
    conflicts = { &["conflicts", "list"] },
    export = { &["export"] },
    reset = { &["reset", "--yes"] },
)]
fn commands_require_init(args: &[&str]) {
    let temp = TempDir::new().unwrap();

    ac().args(args)
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("ac init"));
}
