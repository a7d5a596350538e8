// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use scsi_bus_rs::{
    bus::bus::UnitAddress,
    unit::unit::{DiscoveryState, UnitFlags},
};

use crate::integration_tests::common::{
    attach_mem_disk, disk_config, init_test_logger, load_config, scanned_bus,
};

#[test]
fn scan_finds_only_the_mem_disk() -> Result<()> {
    let (bus, disk, md) = scanned_bus()?;

    let addrs: Vec<UnitAddress> = bus.units().map(|(a, _)| *a).collect();
    assert_eq!(addrs, vec![UnitAddress {
        target: md.target,
        lun: md.lun
    }]);

    let unit = bus.unit(md.target, md.lun).expect("WTF");
    assert_eq!(unit.state(), DiscoveryState::Ready);
    assert!(unit.is_ready());
    assert_eq!(unit.flags(), UnitFlags::PRESENT);
    assert_eq!(unit.capacity(), md.blocks);
    assert_eq!(unit.block_size(), md.block_size);
    assert_eq!(unit.sector_shift(), 9);

    // One probe per empty target, two for the disk.
    let probes = bus.max_targets() as usize - 1 + 2;
    assert_eq!(disk.submitted(), probes);
    Ok(())
}

#[test]
fn scan_all_luns_probes_every_address() -> Result<()> {
    init_test_logger();
    let mut cfg = load_config()?;
    cfg.runtime.scan_luns = true.into();
    let md = disk_config(&cfg)?;
    let (mut bus, disk) = attach_mem_disk(&cfg)?;

    let found = bus.scan(cfg.runtime.scan_luns.as_bool())?;
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].target, md.target);

    let addresses = bus.max_targets() as usize * bus.max_luns() as usize;
    assert_eq!(disk.submitted(), addresses - 1 + 2);
    Ok(())
}

#[test]
fn rescan_keeps_configured_units() -> Result<()> {
    let (mut bus, disk, md) = scanned_bus()?;
    let first = disk.submitted();

    let found = bus.scan(false)?;
    assert_eq!(found, vec![UnitAddress {
        target: md.target,
        lun: md.lun
    }]);

    let unit = bus.unit(md.target, md.lun).expect("WTF");
    assert!(unit.is_ready());
    assert_eq!(unit.capacity(), md.blocks);

    // Only the empty targets are probed again.
    assert_eq!(disk.submitted() - first, bus.max_targets() as usize - 1);

    let mut h = bus.unit_handle(md.target, md.lun).expect("WTF");
    h.test_unit_ready()?;
    Ok(())
}

#[test]
fn dispose_releases_everything() -> Result<()> {
    let (mut bus, _disk, md) = scanned_bus()?;
    assert!(bus.host_private().is_some_and(|p| p.len() as u64 >= md.blocks * md.block_size as u64));

    bus.dispose();
    assert!(!bus.has_interface());
    assert!(bus.unit(md.target, md.lun).is_none());
    assert!(bus.unit_handle(md.target, md.lun).is_none());
    bus.dispose();
    Ok(())
}
