// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

/// Strip all ANSI escape sequences from a string
fn strip_ansi(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

#[parameterized(
    two_spaces = { "cmd  desc", Some(3) },
    many_spaces = { "ac queue list     List queued", Some(13) },
    single_spaces = { "ac sync now", None },
    trailing_only = { "ac sync  ", None },
)]
fn description_start(line: &str, expected: Option<usize>) {
    assert_eq!(find_description_start(line), expected);
}

#[test]
fn help_colors_use_256_palette() {
    assert_eq!(header("Options:"), "\x1b[38;5;74mOptions:\x1b[0m");
    assert_eq!(literal("sync"), "\x1b[38;5;250msync\x1b[0m");
    assert_eq!(context("<id>"), "\x1b[38;5;245m<id>\x1b[0m");
}

#[test]
fn command_text_survives_colorizing() {
    let cmd = "ac send PATCH /api/centers/C1 --data \"{}\" <id>";
    assert_eq!(strip_ansi(&colorize_command(cmd)), cmd);
}

#[test]
fn placeholders_and_quotes_are_context() {
    let colored = colorize_command("ac queue show <id>");
    assert!(colored.contains(&context("<id>")));

    let colored = colorize_command("ac get \"/api/x\"");
    assert!(colored.contains(&context("\"/api/x\"")));
}

#[test]
fn unterminated_placeholder_runs_to_end() {
    let colored = colorize_command("ac show <id");
    assert!(colored.ends_with(&context("<id")));
}
