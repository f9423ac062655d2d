// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ac_core::{MutationQueueItem, MutationStatus, SyncConflict};
use chrono::{DateTime, Utc};

use crate::provider::OfflineState;
use crate::sync::SyncResult;

fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format a single mutation line for list output
pub fn format_mutation_line(item: &MutationQueueItem) -> String {
    let mut line = format!(
        "- [{}] {} {} {}",
        item.status, item.id, item.method, item.url
    );
    let mut tags = Vec::new();
    if item.priority != ac_core::Priority::Normal {
        tags.push(item.priority.to_string());
    }
    if item.retry_count > 0 {
        tags.push(format!("retries: {}", item.retry_count));
    }
    if let Some(error) = &item.error {
        tags.push(error.clone());
    }
    if !tags.is_empty() {
        line.push_str(&format!(" ({})", tags.join(", ")));
    }
    line
}

/// Format mutation details for show command
pub fn format_mutation_details(item: &MutationQueueItem) -> String {
    let mut output = vec![
        format!("{} {}", item.method, item.url),
        format!("Id: {}", item.id),
        format!("Status: {}", item.status),
        format!("Priority: {}", item.priority),
        format!("Queued: {}", format_time(&item.timestamp)),
        format!("Updated: {}", format_time(&item.updated_at)),
    ];
    if item.retry_count > 0 {
        output.push(format!("Retries: {}", item.retry_count));
    }
    if let Some(next) = &item.next_attempt_at {
        if item.status == MutationStatus::Pending {
            output.push(format!("Next attempt: {}", format_time(next)));
        }
    }
    if let Some(error) = &item.error {
        output.push(format!("Error: {}", error));
    }
    match (&item.entity_type, &item.entity_id) {
        (Some(t), Some(id)) => output.push(format!("Entity: {} {}", t, id)),
        (Some(t), None) => output.push(format!("Entity: {}", t)),
        _ => {}
    }
    if let Some(optimistic) = &item.optimistic_id {
        output.push(format!("Optimistic id: {}", optimistic));
    }
    if !item.headers.is_empty() {
        output.push(String::new());
        output.push("Headers:".to_string());
        for (name, value) in &item.headers {
            output.push(format!("  {}: {}", name, value));
        }
    }
    if let Some(data) = &item.data {
        output.push(String::new());
        output.push("Body:".to_string());
        let pretty = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
        for line in pretty.lines() {
            output.push(format!("  {}", line));
        }
    }
    output.join("\n")
}

pub fn format_conflict(conflict: &SyncConflict) -> String {
    let entity = match (&conflict.entity_type, &conflict.entity_id) {
        (Some(t), Some(id)) => format!(" {} {}", t, id),
        (Some(t), None) => format!(" {}", t),
        _ => String::new(),
    };
    let mut lines = vec![format!(
        "- {}{} at {}{}",
        conflict.mutation_id,
        entity,
        format_time(&conflict.timestamp),
        conflict
            .error
            .as_ref()
            .map(|e| format!(" ({})", e))
            .unwrap_or_default()
    )];
    lines.push(format!("    local:  {}", conflict.local_version));
    lines.push(format!("    remote: {}", conflict.remote_version));
    lines.join("\n")
}

/// Status summary, with a sign-in banner when mutations are paused on an
/// expired session.
pub fn format_status(state: &OfflineState, paused: &[MutationQueueItem]) -> String {
    let mut output = vec![
        format!(
            "Connectivity: {}",
            if state.is_online { "online" } else { "offline" }
        ),
        format!("Pending: {}", state.pending_count),
        format!(
            "Last sync: {}",
            state
                .last_sync
                .as_ref()
                .map(format_time)
                .unwrap_or_else(|| "never".to_string())
        ),
        format!("Conflicts: {}", state.conflicts.len()),
    ];

    if !paused.is_empty() {
        output.push(String::new());
        output.push(format!(
            "! Session expired: {} mutation(s) are waiting for you to sign in again.",
            paused.len()
        ));
        for item in paused {
            output.push(format!("    {} {} {}", item.id, item.method, item.url));
        }
        output.push("  Set a fresh token (APPCOPIO_TOKEN) and run 'ac sync' to resume.".to_string());
    }

    output.join("\n")
}

pub fn format_sync_result(result: &SyncResult) -> String {
    if result.skipped {
        return "A sync pass is already running.".to_string();
    }
    if result.total == 0 {
        return "Nothing to sync.".to_string();
    }
    format!(
        "Replayed {} mutation(s): {} succeeded, {} failed, {} conflict(s) in {}ms",
        result.total,
        result.success,
        result.failed,
        result.conflicts,
        result.duration.as_millis()
    )
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
