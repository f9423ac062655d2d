// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use acrs::Cli;
use clap::Parser;

fn main() {
    let cli = Cli::parse();
    if let Some(dir) = &cli.directory {
        if let Err(e) = std::env::set_current_dir(dir) {
            eprintln!("error: cannot change to '{}': {}", dir, e);
            std::process::exit(1);
        }
    }
    if let Err(e) = acrs::run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
