// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Bearer token from `APPCOPIO_TOKEN`, if set and non-empty.
pub fn api_token() -> Option<String> {
    std::env::var(vars::APPCOPIO_TOKEN)
        .ok()
        .filter(|t| !t.trim().is_empty())
}

/// Base URL override from `APPCOPIO_API_URL`, if set and non-empty.
pub fn api_url() -> Option<String> {
    std::env::var(vars::APPCOPIO_API_URL)
        .ok()
        .filter(|u| !u.trim().is_empty())
}

/// Returns `true` if `NO_COLOR=1`.
pub fn no_color() -> bool {
    std::env::var(vars::NO_COLOR).is_ok_and(|v| v == "1")
}

/// Returns `true` if `COLOR=1`.
pub fn force_color() -> bool {
    std::env::var(vars::COLOR).is_ok_and(|v| v == "1")
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
