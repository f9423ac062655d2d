// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use crate::colors;
use crate::help;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

pub use args::{parse_method, parse_priority, parse_status, MutationArgs};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "ac")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(disable_version_flag = true)]
#[command(about = "Offline outbox and sync for AppCopio field clients")]
#[command(
    long_about = "Offline outbox and sync for AppCopio field clients.\n\n\
    Writes made without connectivity are queued in a local store and replayed\n\
    against the backend once it is reachable again."
)]
#[command(help_template = help::template())]
#[command(before_help = help::commands())]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
// Allow the unit type field pattern which is required for clap's ArgAction::Version/Help
#[allow(clippy::manual_non_exhaustive)]
pub struct Cli {
    /// Run as if ac was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    /// Print version
    #[arg(short = 'v', short_alias = 'V', long = "version", action = clap::ArgAction::Version)]
    version: (),

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Initialize an offline store in the current directory
    #[command(after_help = colors::examples("\
Examples:
  ac init                                          Use the default backend URL
  ac init --api-url https://api.example.org        Point at a backend
  ac init --refresh-path /api/auth/refresh         Enable silent token refresh"))]
    Init {
        /// Backend base URL
        #[arg(long)]
        api_url: Option<String>,

        /// Token refresh endpoint
        #[arg(long)]
        refresh_path: Option<String>,
    },

    /// Show connectivity, pending count, last sync and conflicts
    Status {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Inspect or add queued mutations
    #[command(subcommand)]
    Queue(QueueCommand),

    /// Send a write now; queue it if the backend is unreachable
    #[command(after_help = colors::examples("\
Examples:
  ac send PATCH /api/centers/C1/status --data '{\"status\":\"closed\"}' -p high
  ac send POST /api/residents -d '{\"name\":\"Ana\"}' --entity-type resident
  ac send DELETE /api/supplies/S4 -H If-Match:\\\"v3\\\""))]
    Send {
        #[command(flatten)]
        mutation: MutationArgs,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Fetch a resource, serving the cached copy when offline
    Get {
        /// Resource path, e.g. /api/centers
        url: String,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Replay the outbox now, resuming mutations paused on an expired session
    Sync {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List or clear sync conflicts
    #[command(subcommand)]
    Conflicts(ConflictsCommand),

    /// Reclaim stuck mutations, fail exhausted ones and sweep expired cache
    Cleanup {
        /// Retry ceiling (defaults to sync.max_retries)
        #[arg(long)]
        max_retries: Option<u32>,
    },

    /// Dump the whole store as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long = "output", short = 'o', value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Delete every record in the offline store
    Reset {
        /// Confirm deletion
        #[arg(long, short)]
        yes: bool,
    },

    /// Probe connectivity and sync in the background until interrupted
    Watch,

    /// Generate shell completions
    #[command(arg_required_else_help = true)]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// List queued mutations
    List {
        /// Only mutations with this status
        #[arg(long, short, value_parser = parse_status)]
        status: Option<ac_core::MutationStatus>,

        /// Only mutations touching this entity type
        #[arg(long)]
        entity_type: Option<String>,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show one mutation
    Show {
        id: String,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Queue a mutation without trying to send it
    Add {
        #[command(flatten)]
        mutation: MutationArgs,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
pub enum ConflictsCommand {
    /// List recorded conflicts
    List {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Dismiss the conflict recorded for a mutation
    Clear {
        /// Mutation id
        mutation_id: String,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
