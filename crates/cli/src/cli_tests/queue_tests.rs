// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use ac_core::MutationStatus;
use clap::Parser;

#[test]
fn queue_list_filters() {
    let cli = Cli::try_parse_from([
        "ac", "queue", "list", "-s", "error", "--entity-type", "center", "-o", "json",
    ])
    .unwrap();
    match cli.command {
        Command::Queue(QueueCommand::List {
            status,
            entity_type,
            output,
        }) => {
            assert_eq!(status, Some(MutationStatus::Error));
            assert_eq!(entity_type.as_deref(), Some("center"));
            assert_eq!(output, OutputFormat::Json);
        }
        _ => panic!("expected queue list"),
    }
}

#[test]
fn queue_list_rejects_unknown_status() {
    assert!(Cli::try_parse_from(["ac", "queue", "list", "--status", "lost"]).is_err());
}

#[test]
fn conflicts_clear_needs_id() {
    assert!(Cli::try_parse_from(["ac", "conflicts", "clear"]).is_err());
    let cli = Cli::try_parse_from(["ac", "conflicts", "clear", "mut-1"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Conflicts(ConflictsCommand::Clear { mutation_id }) if mutation_id == "mut-1"
    ));
}

#[test]
fn export_takes_a_file() {
    let cli = Cli::try_parse_from(["ac", "export", "-o", "dump.json"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Export { file: Some(ref f) } if f.to_str() == Some("dump.json")
    ));
}

#[test]
fn reset_flag() {
    let cli = Cli::try_parse_from(["ac", "reset", "-y"]).unwrap();
    assert!(matches!(cli.command, Command::Reset { yes: true }));
}
