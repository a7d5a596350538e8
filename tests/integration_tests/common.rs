// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use scsi_bus_rs::{
    backends::mem_disk::MemDisk,
    bus::bus::Bus,
    cfg::{
        config::{Config, MemDiskConfig},
        logger::init_logger,
    },
};

pub fn test_path() -> String {
    std::env::var("TEST_CONFIG").unwrap_or_else(|_| "tests/config.yaml".into())
}

pub fn load_config() -> Result<Config> {
    let path = test_path();
    let pb = PathBuf::from(path);
    let cfg = Config::load_from_file(&pb).with_context(|| format!("failed to load {:?}", pb))?;
    Ok(cfg)
}

/// Installs the JSON logger once per test binary; later calls are no-ops.
pub fn init_test_logger() {
    let _ = init_logger("tests/config_logger.yaml").map(std::mem::forget);
}

pub fn disk_config(cfg: &Config) -> Result<MemDiskConfig> {
    cfg.mem_disk.clone().context("config has no mem_disk section")
}

/// Bus built from `cfg` with the in-memory disk attached. The disk handle
/// stays shared so tests can inject faults.
pub fn attach_mem_disk(cfg: &Config) -> Result<(Bus, Arc<MemDisk>)> {
    let disk = Arc::new(MemDisk::new(disk_config(cfg)?));
    let bus = Bus::new(cfg.bus_config(), Some(Box::new(disk.clone())));
    Ok((bus, disk))
}

/// Loads the test config, attaches the disk and scans the bus.
pub fn scanned_bus() -> Result<(Bus, Arc<MemDisk>, MemDiskConfig)> {
    init_test_logger();
    let cfg = load_config()?;
    let md = disk_config(&cfg)?;
    let (mut bus, disk) = attach_mem_disk(&cfg)?;
    bus.scan(cfg.runtime.scan_luns.as_bool())?;
    Ok((bus, disk, md))
}
