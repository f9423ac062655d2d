// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Nothing listens here, so every request fails fast.
pub const UNREACHABLE_API: &str = "http://127.0.0.1:9";

pub fn ac() -> Command {
    let mut cmd = cargo_bin_cmd!("ac");
    cmd.env_remove("APPCOPIO_API_URL")
        .env_remove("APPCOPIO_TOKEN")
        .env("NO_COLOR", "1");
    cmd
}

/// Helper to create an initialized temp directory pointing at an
/// unreachable backend.
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    ac().arg("init")
        .arg("--api-url")
        .arg(UNREACHABLE_API)
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Queue a mutation without sending it and return its id.
pub fn queue_mutation(temp: &TempDir, method: &str, url: &str) -> String {
    let output = ac()
        .args(["queue", "add", method, url])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "queue add failed: {:?}", output);

    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .find(|s| s.starts_with("mut-"))
        .unwrap()
        .to_string()
}

pub fn json_output(temp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = ac().args(args).current_dir(temp.path()).output().unwrap();
    assert!(output.status.success(), "{:?} failed: {:?}", args, output);
    serde_json::from_slice(&output.stdout).unwrap()
}
