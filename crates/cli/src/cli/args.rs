// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Argument groups shared by several subcommands.

use ac_core::{Method, Priority};
use clap::Args;

/// Parse an HTTP write method (case-insensitive).
pub fn parse_method(s: &str) -> Result<Method, String> {
    s.parse().map_err(|e: ac_core::Error| e.to_string())
}

pub fn parse_priority(s: &str) -> Result<Priority, String> {
    s.parse().map_err(|e: ac_core::Error| e.to_string())
}

pub fn parse_status(s: &str) -> Result<ac_core::MutationStatus, String> {
    s.parse().map_err(|e: ac_core::Error| e.to_string())
}

/// A write request as typed on the command line.
#[derive(Args, Clone, Debug)]
pub struct MutationArgs {
    /// HTTP method (POST, PUT, PATCH, DELETE)
    #[arg(value_parser = parse_method)]
    pub method: Method,

    /// Resource path, e.g. /api/centers/C1/status
    pub url: String,

    /// JSON request body
    #[arg(long, short)]
    pub data: Option<String>,

    /// Extra request header as NAME:VALUE (repeatable)
    #[arg(long = "header", short = 'H', value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Replay priority (high, normal, low)
    #[arg(long, short, value_parser = parse_priority, default_value = "normal")]
    pub priority: Priority,

    /// Entity type the write touches, e.g. center
    #[arg(long)]
    pub entity_type: Option<String>,

    /// Entity id the write touches
    #[arg(long)]
    pub entity_id: Option<String>,

    /// Client-side id of an optimistically created record
    #[arg(long)]
    pub optimistic_id: Option<String>,

    /// Use this mutation id instead of generating one
    #[arg(long, hide = true)]
    pub id: Option<String>,
}
