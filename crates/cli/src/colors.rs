// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal colors for help and status output.
//!
//! Respects environment variables:
//! - `NO_COLOR=1`: Disables colors
//! - `COLOR=1`: Forces colors even without TTY

use std::io::IsTerminal;

use crate::env;

/// ANSI 256-color codes.
pub mod codes {
    /// Section headers: steel blue
    pub const HEADER: u8 = 74;
    /// Commands and literals: light grey
    pub const LITERAL: u8 = 250;
    /// Hints and placeholders: medium grey
    pub const CONTEXT: u8 = 245;
    /// Things waiting on the user: amber
    pub const WARN: u8 = 179;
    /// Settled successfully: green
    pub const OK: u8 = 114;
    /// Failed: red
    pub const BAD: u8 = 167;
}

const RESET: &str = "\x1b[0m";

/// Check if colors should be enabled based on TTY and environment variables.
pub fn should_colorize() -> bool {
    if env::no_color() {
        return false;
    }
    if env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

fn paint(code: u8, text: &str) -> String {
    if should_colorize() {
        format!("\x1b[38;5;{code}m{text}{RESET}")
    } else {
        text.to_string()
    }
}

/// Help-text variants always carry escapes; clap strips them when needed.
fn paint_always(code: u8, text: &str) -> String {
    format!("\x1b[38;5;{code}m{text}{RESET}")
}

pub fn header(text: &str) -> String {
    paint_always(codes::HEADER, text)
}

pub fn literal(text: &str) -> String {
    paint_always(codes::LITERAL, text)
}

pub fn context(text: &str) -> String {
    paint_always(codes::CONTEXT, text)
}

pub fn warn(text: &str) -> String {
    paint(codes::WARN, text)
}

pub fn ok(text: &str) -> String {
    paint(codes::OK, text)
}

pub fn bad(text: &str) -> String {
    paint(codes::BAD, text)
}

pub fn dim(text: &str) -> String {
    paint(codes::CONTEXT, text)
}

/// Colorize an examples help block.
///
/// Lines ending in `:` are headers; on other lines the command (everything
/// before the first run of two spaces) is a literal, with quoted text and
/// `<placeholders>` dimmed.
pub fn examples(text: &str) -> String {
    if !should_colorize() {
        return text.to_string();
    }

    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            let indent = &line[..line.len() - trimmed.len()];
            if trimmed.ends_with(':') && !trimmed.contains("  ") {
                format!("{}{}", indent, header(trimmed))
            } else if let Some(end) = find_description_start(trimmed) {
                format!(
                    "{}{}{}",
                    indent,
                    colorize_command(&trimmed[..end]),
                    &trimmed[end..]
                )
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Literal words, with quoted spans and `<placeholders>` as context.
pub fn colorize_command(cmd: &str) -> String {
    let mut result = String::with_capacity(cmd.len() + 64);
    let mut rest = cmd;

    while !rest.is_empty() {
        let (closer, start) = match rest.find(['"', '<']) {
            Some(i) if rest.as_bytes()[i] == b'"' => ('"', i),
            Some(i) => ('>', i),
            None => {
                result.push_str(&literal(rest));
                break;
            }
        };
        if start > 0 {
            result.push_str(&literal(&rest[..start]));
        }
        let end = rest[start + 1..]
            .find(closer)
            .map(|i| start + 1 + i + 1)
            .unwrap_or(rest.len());
        result.push_str(&context(&rest[start..end]));
        rest = &rest[end..];
    }

    result
}

/// Find where the description starts (after 2+ spaces following the command).
pub fn find_description_start(line: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(offset) = line[search_from..].find("  ") {
        let start = search_from + offset;
        let after = line[start..].trim_start_matches(' ');
        if !after.is_empty() {
            return Some(start);
        }
        search_from = start + 2;
        if search_from >= line.len() {
            break;
        }
    }
    None
}

#[cfg(test)]
#[path = "colors_tests.rs"]
mod tests;
