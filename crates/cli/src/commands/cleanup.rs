// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ac_core::{MutationQueue, ResponseCache};

use crate::config::SyncConfig;
use crate::error::Result;

use super::Workspace;

/// What one cleanup run removed or reclaimed.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CleanupReport {
    pub stuck: usize,
    pub purged: usize,
    pub swept: usize,
}

pub fn run(max_retries: Option<u32>) -> Result<()> {
    let ws = Workspace::open()?;
    let report = run_impl(&ws.queue(), &ws.cache(), &ws.config.sync, max_retries)?;
    println!(
        "Cleaned {} stuck mutation(s), purged {} completed, swept {} cached response(s)",
        report.stuck, report.purged, report.swept
    );
    Ok(())
}

pub(crate) fn run_impl(
    queue: &MutationQueue,
    cache: &ResponseCache,
    sync: &SyncConfig,
    max_retries: Option<u32>,
) -> Result<CleanupReport> {
    let max_retries = max_retries.unwrap_or(sync.max_retries);
    Ok(CleanupReport {
        stuck: queue.clean_stuck_mutations(max_retries, sync.stuck_after())?,
        purged: queue.purge_completed(sync.completed_retention())?,
        swept: cache.sweep_expired()?,
    })
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
