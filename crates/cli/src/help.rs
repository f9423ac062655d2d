// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use crate::colors;
use clap::builder::styling::Styles;

/// clap Styles matching the palette in [`colors::codes`].
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let fg = |code: u8| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));

    Styles::styled()
        .header(fg(colors::codes::HEADER))
        .usage(fg(colors::codes::HEADER))
        .literal(fg(colors::codes::LITERAL))
        .placeholder(fg(colors::codes::CONTEXT))
        .valid(fg(colors::codes::CONTEXT))
}

/// Main help template with colorized Options header.
pub fn template() -> String {
    format!(
        "{{about-with-newline}}
{{usage-heading}} {{usage}}

{{before-help}}{}
{{options}}{{after-help}}",
        colors::header("Options:")
    )
}

/// Commands list shown before options in main help.
pub fn commands() -> String {
    // Pad the visible name to a 12-column field.
    let pad = |name: &str| {
        format!(
            "  {}{}",
            colors::literal(name),
            " ".repeat(12usize.saturating_sub(name.len()))
        )
    };

    format!(
        "\
{outbox}
{queue}List, inspect or add queued mutations
{send}Send a write now, queueing it when offline
{get}Fetch a resource, falling back to the cache
{conflicts}List or clear sync conflicts

{sync_header}
{sync}Replay the outbox now
{status}Show connectivity, pending count and conflicts
{watch}Sync in the background until interrupted

{setup}
{init}Initialize an offline store here
{cleanup}Reclaim stuck mutations and expired cache
{export}Dump the store as JSON
{reset}Delete every stored record
{completion}Generate shell completions
",
        outbox = colors::header("Outbox:"),
        sync_header = colors::header("Sync:"),
        setup = colors::header("Setup & Maintenance:"),
        queue = pad("queue"),
        send = pad("send"),
        get = pad("get"),
        conflicts = pad("conflicts"),
        sync = pad("sync"),
        status = pad("status"),
        watch = pad("watch"),
        init = pad("init"),
        cleanup = pad("cleanup"),
        export = pad("export"),
        reset = pad("reset"),
        completion = pad("completion"),
    )
}

/// Quickstart help shown after options in main help.
pub fn quickstart() -> String {
    colors::examples(
        "\
Get started:
  ac init --api-url https://api.example.org    Create .appcopio/ here
  ac send PATCH /api/centers/C1/status --data '{\"status\":\"closed\"}'
  ac status                                    See what is waiting to sync
  ac sync                                      Replay the outbox now",
    )
}

#[cfg(test)]
#[path = "help_tests.rs"]
mod tests;
