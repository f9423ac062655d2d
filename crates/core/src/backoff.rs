// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Retry policy for replaying queued mutations.
//!
//! The delay before the next attempt is a pure function of the item's
//! `retry_count`: `min(base * 2^retry_count, cap)`.

use std::time::Duration;

/// Retry ceiling and exponential backoff bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Failed replays allowed before an item is failed permanently.
    pub max_retries: u32,
    /// Delay after the first failure.
    pub base_delay: Duration,
    /// Upper bound on any delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(300),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after `retry_count` failed attempts.
    pub fn backoff_delay(&self, retry_count: u32) -> Duration {
        backoff_delay(self.base_delay, self.max_delay, retry_count)
    }

    /// True if an item that has failed `retry_count` times may be retried.
    pub fn can_retry(&self, retry_count: u32) -> bool {
        retry_count < self.max_retries
    }
}

/// `min(base * 2^retry_count, cap)`, saturating instead of overflowing.
pub fn backoff_delay(base: Duration, cap: Duration, retry_count: u32) -> Duration {
    let factor = 1u32.checked_shl(retry_count).unwrap_or(u32::MAX);
    base.saturating_mul(factor).min(cap)
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
