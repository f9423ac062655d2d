// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ac_core::MutationQueue;

use crate::cli::OutputFormat;
use crate::display::format_conflict;
use crate::error::{Error, Result};

use super::{print_json, Workspace};

pub fn list(output: OutputFormat) -> Result<()> {
    let ws = Workspace::open()?;
    let conflicts = ws.queue().conflicts()?;
    match output {
        OutputFormat::Text if conflicts.is_empty() => println!("No conflicts."),
        OutputFormat::Text => {
            for conflict in &conflicts {
                println!("{}", format_conflict(conflict));
            }
        }
        OutputFormat::Json => print_json(&conflicts)?,
    }
    Ok(())
}

pub fn clear(mutation_id: &str) -> Result<()> {
    let ws = Workspace::open()?;
    clear_impl(&ws.queue(), mutation_id)?;
    println!("Cleared conflict for {}", mutation_id);
    Ok(())
}

pub(crate) fn clear_impl(queue: &MutationQueue, mutation_id: &str) -> Result<()> {
    if queue.clear_conflict(mutation_id)? {
        Ok(())
    } else {
        Err(Error::ConflictNotFound(mutation_id.to_string()))
    }
}

#[cfg(test)]
#[path = "conflicts_tests.rs"]
mod tests;
