// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ac_core::{MutationFilter, MutationQueue, MutationQueueItem, MutationStatus};

use crate::cli::{MutationArgs, OutputFormat};
use crate::display::{format_mutation_details, format_mutation_line};
use crate::error::Result;

use super::{parse_mutation, print_json, Workspace};

pub fn list(
    status: Option<MutationStatus>,
    entity_type: Option<String>,
    output: OutputFormat,
) -> Result<()> {
    let ws = Workspace::open()?;
    let items = list_impl(&ws.queue(), status, entity_type)?;
    match output {
        OutputFormat::Text if items.is_empty() => println!("No mutations queued."),
        OutputFormat::Text => {
            for item in &items {
                println!("{}", format_mutation_line(item));
            }
        }
        OutputFormat::Json => print_json(&items)?,
    }
    Ok(())
}

pub(crate) fn list_impl(
    queue: &MutationQueue,
    status: Option<MutationStatus>,
    entity_type: Option<String>,
) -> Result<Vec<MutationQueueItem>> {
    let filter = MutationFilter {
        status,
        entity_type,
    };
    Ok(queue.list(&filter)?)
}

pub fn show(id: &str, output: OutputFormat) -> Result<()> {
    let ws = Workspace::open()?;
    let item = ws.queue().get_mutation(id)?;
    match output {
        OutputFormat::Text => println!("{}", format_mutation_details(&item)),
        OutputFormat::Json => print_json(&item)?,
    }
    Ok(())
}

pub fn add(args: MutationArgs, output: OutputFormat) -> Result<()> {
    let ws = Workspace::open()?;
    let item = add_impl(&ws.queue(), args)?;
    match output {
        OutputFormat::Text => println!("Queued {} {} {}", item.id, item.method, item.url),
        OutputFormat::Json => print_json(&item)?,
    }
    Ok(())
}

pub(crate) fn add_impl(queue: &MutationQueue, args: MutationArgs) -> Result<MutationQueueItem> {
    let new = parse_mutation(args)?;
    Ok(queue.enqueue_mutation(new)?)
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
