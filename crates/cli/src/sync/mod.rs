// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline sync: replaying the outbox and deciding when to do it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐   ticks, reconnects   ┌──────────────┐
//! │ ConnectivityMonitor │──────────────────────►│BackgroundSync│
//! └─────────────────────┘                       └──────┬───────┘
//!           ▲ probe                                    │ run_sync
//!           │                                          ▼
//! ┌─────────┴───────────┐        replay         ┌──────────────┐
//! │      ApiClient      │◄──────────────────────│  SyncEngine  │
//! └─────────────────────┘                       └──────────────┘
//! ```

mod connectivity;
mod engine;
mod platform;
mod scheduler;

pub use connectivity::{ConnectivityMonitor, ProbeHandle};
pub use engine::{classify, ReplayError, SyncEngine, SyncResult, SyncTrigger};
pub use platform::{
    BatteryStatus, NetworkStatus, PlatformInfo, SkipReason, StaticPlatform, SyncGuards,
    SystemPlatform,
};
pub use scheduler::{BackgroundSync, SchedulerOptions, SyncFuture, SyncTarget};
