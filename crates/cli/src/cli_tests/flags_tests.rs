// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use clap::{CommandFactory, Parser};
use yare::parameterized;

/// Every short flag the CLI defines, keyed by the subcommand path.
const SHORT_FLAGS: &[(&str, char, &str)] = &[
    ("ac", 'C', "directory"),
    ("ac", 'v', "version"),
    ("ac status", 'o', "output"),
    ("ac queue list", 's', "status"),
    ("ac queue list", 'o', "output"),
    ("ac queue show", 'o', "output"),
    ("ac queue add", 'd', "data"),
    ("ac queue add", 'H', "header"),
    ("ac queue add", 'p', "priority"),
    ("ac queue add", 'o', "output"),
    ("ac send", 'd', "data"),
    ("ac send", 'H', "header"),
    ("ac send", 'p', "priority"),
    ("ac send", 'o', "output"),
    ("ac get", 'o', "output"),
    ("ac sync", 'o', "output"),
    ("ac conflicts list", 'o', "output"),
    ("ac export", 'o', "output"),
    ("ac reset", 'y', "yes"),
];

fn collect_shorts(cmd: &clap::Command, path: &str, out: &mut Vec<(String, char, String)>) {
    for arg in cmd.get_arguments() {
        if let (Some(short), Some(long)) = (arg.get_short(), arg.get_long()) {
            if long != "help" {
                out.push((path.to_string(), short, long.to_string()));
            }
        }
    }
    for sub in cmd.get_subcommands() {
        collect_shorts(sub, &format!("{path} {}", sub.get_name()), out);
    }
}

#[test]
fn short_flags_match_the_table() {
    let mut found = Vec::new();
    collect_shorts(&Cli::command(), "ac", &mut found);
    found.sort();

    let mut expected: Vec<_> = SHORT_FLAGS
        .iter()
        .map(|(path, short, long)| (path.to_string(), *short, long.to_string()))
        .collect();
    expected.sort();

    assert_eq!(found, expected);
}

#[parameterized(
    send_short = { &["ac", "send", "post", "/api/residents", "-d", "{}", "-H", "X-Center: C1", "-p", "high", "-o", "json"] },
    send_long = { &["ac", "send", "post", "/api/residents", "--data", "{}", "--header", "X-Center: C1", "--priority", "high", "--output", "json"] },
    add_short = { &["ac", "queue", "add", "post", "/api/residents", "-d", "{}", "-H", "X-Center: C1", "-p", "high", "-o", "json"] },
)]
fn short_and_long_mutation_flags_agree(args: &[&str]) {
    let cli = Cli::try_parse_from(args).unwrap();
    let (mutation, output) = match cli.command {
        Command::Send { mutation, output } => (mutation, output),
        Command::Queue(QueueCommand::Add { mutation, output }) => (mutation, output),
        _ => panic!("expected a mutation command"),
    };
    assert_eq!(mutation.data.as_deref(), Some("{}"));
    assert_eq!(mutation.headers.len(), 1);
    assert_eq!(mutation.priority, ac_core::Priority::High);
    assert_eq!(output, OutputFormat::Json);
}

#[parameterized(
    short = { &["ac", "reset", "-y"] },
    long = { &["ac", "reset", "--yes"] },
)]
fn reset_confirmation_flag(args: &[&str]) {
    let cli = Cli::try_parse_from(args).unwrap();
    assert!(matches!(cli.command, Command::Reset { yes: true }));
}

#[test]
fn export_output_is_a_file_not_a_format() {
    let cli = Cli::try_parse_from(["ac", "export", "-o", "backup.json"]).unwrap();
    let Command::Export { file } = cli.command else {
        panic!("expected export command");
    };
    assert_eq!(file.as_deref(), Some(std::path::Path::new("backup.json")));
}

#[test]
fn test_clap_definition_is_valid() {
    Cli::command().debug_assert();
}
