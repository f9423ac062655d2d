// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Battery and network hints used to hold back background passes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SyncConfig;

const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    pub level_percent: u8,
    pub charging: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkStatus {
    pub metered: bool,
    pub save_data: bool,
    /// `slow-2g`, `2g`, `3g` or `4g`.
    pub effective_type: Option<String>,
}

impl NetworkStatus {
    pub fn is_slow(&self) -> bool {
        matches!(self.effective_type.as_deref(), Some("slow-2g" | "2g"))
    }
}

/// Source of platform hints. `None` means the platform cannot tell, which
/// disables the matching guard.
pub trait PlatformInfo: Send + Sync {
    fn battery(&self) -> Option<BatteryStatus>;
    fn network(&self) -> Option<NetworkStatus>;
}

/// Reads the battery from sysfs and the network hints from configuration.
pub struct SystemPlatform {
    power_supply_dir: PathBuf,
    network: Option<NetworkStatus>,
}

impl SystemPlatform {
    pub fn from_config(sync: &SyncConfig) -> Self {
        let configured = sync.metered || sync.save_data || sync.effective_type.is_some();
        SystemPlatform {
            power_supply_dir: PathBuf::from(POWER_SUPPLY_DIR),
            network: configured.then(|| NetworkStatus {
                metered: sync.metered,
                save_data: sync.save_data,
                effective_type: sync.effective_type.clone(),
            }),
        }
    }

    pub fn with_power_supply_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.power_supply_dir = dir.into();
        self
    }
}

impl PlatformInfo for SystemPlatform {
    fn battery(&self) -> Option<BatteryStatus> {
        read_battery(&self.power_supply_dir)
    }

    fn network(&self) -> Option<NetworkStatus> {
        self.network.clone()
    }
}

/// First supply of type `Battery` with a readable capacity.
fn read_battery(dir: &Path) -> Option<BatteryStatus> {
    let mut supplies: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    supplies.sort();

    supplies.into_iter().find_map(|supply| {
        let kind = fs::read_to_string(supply.join("type")).ok()?;
        if kind.trim() != "Battery" {
            return None;
        }
        let capacity: u8 = fs::read_to_string(supply.join("capacity"))
            .ok()?
            .trim()
            .parse()
            .ok()?;
        let status = fs::read_to_string(supply.join("status")).unwrap_or_default();
        Some(BatteryStatus {
            level_percent: capacity.min(100),
            charging: status.trim() != "Discharging",
        })
    })
}

/// Fixed hints, for tests and hosts without sysfs.
#[derive(Debug, Clone, Default)]
pub struct StaticPlatform {
    pub battery: Option<BatteryStatus>,
    pub network: Option<NetworkStatus>,
}

impl PlatformInfo for StaticPlatform {
    fn battery(&self) -> Option<BatteryStatus> {
        self.battery
    }

    fn network(&self) -> Option<NetworkStatus> {
        self.network.clone()
    }
}

/// Which platform conditions hold back a background pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncGuards {
    pub respect_battery: bool,
    pub min_battery_percent: u8,
    pub respect_network: bool,
}

impl Default for SyncGuards {
    fn default() -> Self {
        SyncGuards {
            respect_battery: true,
            min_battery_percent: 20,
            respect_network: true,
        }
    }
}

impl SyncGuards {
    pub fn from_config(sync: &SyncConfig) -> Self {
        SyncGuards {
            respect_battery: sync.respect_battery,
            min_battery_percent: sync.min_battery_percent,
            respect_network: sync.respect_network,
        }
    }

    /// Why a pass should not run now, if any.
    pub fn skip_reason(
        &self,
        online: bool,
        platform: Option<&dyn PlatformInfo>,
    ) -> Option<SkipReason> {
        if !online {
            return Some(SkipReason::Offline);
        }
        let platform = platform?;

        if self.respect_network {
            if let Some(network) = platform.network() {
                if network.save_data {
                    return Some(SkipReason::SaveData);
                }
                if network.metered {
                    return Some(SkipReason::Metered);
                }
                if network.is_slow() {
                    return Some(SkipReason::SlowConnection);
                }
            }
        }

        if self.respect_battery {
            if let Some(battery) = platform.battery() {
                if !battery.charging && battery.level_percent < self.min_battery_percent {
                    return Some(SkipReason::LowBattery(battery.level_percent));
                }
            }
        }

        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Offline,
    Metered,
    SaveData,
    SlowConnection,
    LowBattery(u8),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Offline => write!(f, "offline"),
            SkipReason::Metered => write!(f, "metered connection"),
            SkipReason::SaveData => write!(f, "data saver enabled"),
            SkipReason::SlowConnection => write!(f, "slow connection"),
            SkipReason::LowBattery(level) => write!(f, "battery low ({}%)", level),
        }
    }
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
