// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ac_core::StoreHandle;

use crate::error::{Error, Result};

use super::Workspace;

pub fn run(yes: bool) -> Result<()> {
    let ws = Workspace::open()?;
    run_impl(&ws.store, yes)?;
    println!("Offline store cleared.");
    Ok(())
}

pub(crate) fn run_impl(store: &StoreHandle, yes: bool) -> Result<()> {
    if !yes {
        return Err(Error::ConfirmationRequired);
    }
    store.with_db(|db| db.clear_all())?;
    tracing::info!("offline store cleared");
    Ok(())
}

#[cfg(test)]
#[path = "reset_tests.rs"]
mod tests;
