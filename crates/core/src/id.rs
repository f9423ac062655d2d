// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::mutation::Method;

/// Prefix for generated mutation ids.
pub const MUTATION_ID_PREFIX: &str = "mut";

/// Generate a mutation ID from method, url, and timestamp.
/// Format: mut-{hash} where hash is first 8 hex chars of SHA256(method + url + timestamp)
pub fn generate_id(method: Method, url: &str, created_at: &DateTime<Utc>) -> String {
    let input = format!(
        "{}{}{}",
        method.as_str(),
        url,
        created_at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
    );
    let hash = Sha256::digest(input.as_bytes());
    let short_hash = hex::encode(&hash[..4]);
    format!("{}-{}", MUTATION_ID_PREFIX, short_hash)
}

/// Generate a unique ID, handling collisions by appending incrementing suffix.
/// An error from `exists` aborts generation.
pub fn generate_unique_id<F, E>(
    method: Method,
    url: &str,
    created_at: &DateTime<Utc>,
    exists: F,
) -> Result<String, E>
where
    F: Fn(&str) -> Result<bool, E>,
{
    let base_id = generate_id(method, url, created_at);

    if !exists(&base_id)? {
        return Ok(base_id);
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id)? {
            return Ok(id);
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
