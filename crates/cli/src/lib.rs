// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! acrs - offline outbox and sync engine for AppCopio field clients.
//!
//! This crate provides the functionality behind the `ac` CLI: writes made
//! without connectivity are stored in a local SQLite outbox (see
//! [`ac_core`]) and replayed against the backend once it is reachable.
//!
//! # Main Components
//!
//! - [`api`] - HTTP client and the offline-aware request wrapper
//! - [`sync`] - connectivity probe, sync engine, platform guards and scheduler
//! - [`provider`] - wires everything together behind one observable state
//! - [`Config`] - workspace configuration (`.appcopio/config.toml`)
//! - [`Error`] - error types for all operations
//!
//! # Embedding
//!
//! ```rust,ignore
//! use acrs::provider::{OfflineProvider, ProviderOptions, ProviderParts};
//!
//! let provider = OfflineProvider::mount(parts, ProviderOptions::from_config(&config.sync))?;
//! let mut state = provider.subscribe();
//! provider.api().mutate(new_mutation).await?;
//! provider.unmount().await;
//! ```

mod cli;
pub mod colors;
mod commands;
mod display;
pub mod help;

pub mod api;
pub mod config;
pub mod env;
pub mod error;
pub mod provider;
pub mod sync;

#[cfg(test)]
mod test_helpers;

pub use cli::{Cli, Command, ConflictsCommand, MutationArgs, OutputFormat, QueueCommand};
pub use config::{find_work_dir, get_db_path, init_work_dir, Config};
pub use error::{Error, Result};

use clap::CommandFactory;
use clap_complete::generate;

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init {
            api_url,
            refresh_path,
        } => commands::init::run(api_url, refresh_path),
        Command::Status { output } => commands::status::run(output),
        Command::Queue(cmd) => match cmd {
            QueueCommand::List {
                status,
                entity_type,
                output,
            } => commands::queue::list(status, entity_type, output),
            QueueCommand::Show { id, output } => commands::queue::show(&id, output),
            QueueCommand::Add { mutation, output } => commands::queue::add(mutation, output),
        },
        Command::Send { mutation, output } => commands::send::run(mutation, output),
        Command::Get { url, output } => commands::get::run(&url, output),
        Command::Sync { output } => commands::sync::run(output),
        Command::Conflicts(cmd) => match cmd {
            ConflictsCommand::List { output } => commands::conflicts::list(output),
            ConflictsCommand::Clear { mutation_id } => commands::conflicts::clear(&mutation_id),
        },
        Command::Cleanup { max_retries } => commands::cleanup::run(max_retries),
        Command::Export { file } => commands::export::run(file.as_deref()),
        Command::Reset { yes } => commands::reset::run(yes),
        Command::Watch => commands::watch::run(),
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "ac", &mut std::io::stdout());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
