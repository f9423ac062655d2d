// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ac_core::MutationQueue;

use crate::api::ApiClient;
use crate::cli::OutputFormat;
use crate::display::format_status;
use crate::error::Result;
use crate::provider::OfflineState;

use super::{print_json, runtime, Workspace};

pub fn run(output: OutputFormat) -> Result<()> {
    let ws = Workspace::open()?;
    let client = ws.client()?;
    let online = runtime()?.block_on(client.probe());
    run_impl(&ws.queue(), online, output)
}

pub(crate) fn run_impl(queue: &MutationQueue, online: bool, output: OutputFormat) -> Result<()> {
    let state = OfflineState::from_store(queue, online)?;
    match output {
        OutputFormat::Text => {
            let paused = queue.auth_expired_mutations()?;
            println!("{}", format_status(&state, &paused));
        }
        OutputFormat::Json => print_json(&state)?,
    }
    Ok(())
}
