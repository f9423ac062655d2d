// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

fn platform(level: Option<(u8, bool)>, network: Option<NetworkStatus>) -> StaticPlatform {
    StaticPlatform {
        battery: level.map(|(level_percent, charging)| BatteryStatus {
            level_percent,
            charging,
        }),
        network,
    }
}

fn network(metered: bool, save_data: bool, effective_type: Option<&str>) -> NetworkStatus {
    NetworkStatus {
        metered,
        save_data,
        effective_type: effective_type.map(str::to_string),
    }
}

#[test]
fn offline_always_skips() {
    let guards = SyncGuards::default();
    assert_eq!(guards.skip_reason(false, None), Some(SkipReason::Offline));
}

#[test]
fn missing_platform_disables_guards() {
    let guards = SyncGuards::default();
    assert_eq!(guards.skip_reason(true, None), None);

    let unknown = platform(None, None);
    assert_eq!(guards.skip_reason(true, Some(&unknown)), None);
}

#[parameterized(
    metered = { network(true, false, None), Some(SkipReason::Metered) },
    save_data = { network(false, true, Some("4g")), Some(SkipReason::SaveData) },
    two_g = { network(false, false, Some("2g")), Some(SkipReason::SlowConnection) },
    slow_two_g = { network(false, false, Some("slow-2g")), Some(SkipReason::SlowConnection) },
    three_g = { network(false, false, Some("3g")), None },
    four_g = { network(false, false, Some("4g")), None },
)]
fn network_guard(status: NetworkStatus, expected: Option<SkipReason>) {
    let guards = SyncGuards::default();
    let p = platform(None, Some(status));
    assert_eq!(guards.skip_reason(true, Some(&p)), expected);
}

#[test]
fn network_guard_can_be_disabled() {
    let guards = SyncGuards {
        respect_network: false,
        ..Default::default()
    };
    let p = platform(None, Some(network(true, true, Some("2g"))));
    assert_eq!(guards.skip_reason(true, Some(&p)), None);
}

#[parameterized(
    low_discharging = { 10, false, Some(SkipReason::LowBattery(10)) },
    low_charging = { 10, true, None },
    at_threshold = { 20, false, None },
    full = { 95, false, None },
)]
fn battery_guard(level: u8, charging: bool, expected: Option<SkipReason>) {
    let guards = SyncGuards::default();
    let p = platform(Some((level, charging)), None);
    assert_eq!(guards.skip_reason(true, Some(&p)), expected);
}

#[test]
fn battery_guard_can_be_disabled() {
    let guards = SyncGuards {
        respect_battery: false,
        ..Default::default()
    };
    let p = platform(Some((5, false)), None);
    assert_eq!(guards.skip_reason(true, Some(&p)), None);
}

#[test]
fn system_platform_network_from_config() {
    let default = SystemPlatform::from_config(&SyncConfig::default());
    assert_eq!(default.network(), None);

    let sync = SyncConfig {
        metered: true,
        ..Default::default()
    };
    let p = SystemPlatform::from_config(&sync);
    assert_eq!(p.network(), Some(network(true, false, None)));
}

fn write_supply(root: &Path, name: &str, kind: &str, capacity: &str, status: &str) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("type"), format!("{}\n", kind)).unwrap();
    fs::write(dir.join("capacity"), format!("{}\n", capacity)).unwrap();
    fs::write(dir.join("status"), format!("{}\n", status)).unwrap();
}

#[test]
fn sysfs_battery_is_read() {
    let temp = TempDir::new().unwrap();
    write_supply(temp.path(), "AC", "Mains", "0", "");
    write_supply(temp.path(), "BAT0", "Battery", "42", "Discharging");

    let p = SystemPlatform::from_config(&SyncConfig::default())
        .with_power_supply_dir(temp.path());
    assert_eq!(
        p.battery(),
        Some(BatteryStatus {
            level_percent: 42,
            charging: false
        })
    );
}

#[test]
fn sysfs_without_battery_is_unknown() {
    let temp = TempDir::new().unwrap();
    write_supply(temp.path(), "AC", "Mains", "0", "");

    let p = SystemPlatform::from_config(&SyncConfig::default())
        .with_power_supply_dir(temp.path());
    assert_eq!(p.battery(), None);

    let missing = SystemPlatform::from_config(&SyncConfig::default())
        .with_power_supply_dir(temp.path().join("nope"));
    assert_eq!(missing.battery(), None);
}
