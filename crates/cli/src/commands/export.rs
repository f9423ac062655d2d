// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ac_core::{MutationQueue, StoreExport};

use crate::error::Result;

use super::Workspace;

pub fn run(file: Option<&Path>) -> Result<()> {
    let ws = Workspace::open()?;
    let export = run_impl(&ws.queue())?;

    match file {
        Some(path) => {
            write_export(&export, path)?;
            println!(
                "Exported {} mutation(s), {} cached response(s) and {} conflict(s) to {}",
                export.mutations.len(),
                export.cache.len(),
                export.conflicts.len(),
                path.display()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&export)?),
    }
    Ok(())
}

pub(crate) fn run_impl(queue: &MutationQueue) -> Result<StoreExport> {
    let now = queue.now();
    Ok(queue.store().with_db(|db| db.export_all(now))?)
}

pub(crate) fn write_export(export: &StoreExport, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, export)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[path = "export_tests.rs"]
mod tests;
