// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use scsi_bus_rs::{
    backends::mem_disk::MemDisk,
    bus::bus::Bus,
    cfg::{cli::Cli, config::Config, logger::init_logger},
    control_block::inquiry::parse_inquiry_standard,
};
use tracing::info;

fn main() -> Result<()> {
    let paths = Cli::parse().resolve()?;
    let _init_logger = init_logger(&paths.logger.to_string_lossy())?;

    let config = Config::load_from_file(&paths.config).context("failed to load config")?;
    let Some(disk_cfg) = config.mem_disk.clone() else {
        bail!("config has no mem_disk section, nothing to attach");
    };

    let mut bus = Bus::new(
        config.bus_config(),
        Some(Box::new(MemDisk::new(disk_cfg.clone()))),
    );
    let found = bus.scan(config.runtime.scan_luns.as_bool())?;
    info!("scan: {found:?}");

    let mut h = bus
        .unit_handle(disk_cfg.target, disk_cfg.lun)
        .context("configured unit missing after scan")?;

    let id = parse_inquiry_standard(h.unit().inquiry_data())?;
    info!(
        "{} {} {}: {} blocks x {} bytes",
        id.vendor_id,
        id.product_id,
        id.product_rev,
        h.unit().capacity(),
        h.unit().block_size()
    );

    h.test_unit_ready()?;

    let bs = h.unit().block_size() as usize;
    let pattern: Vec<u8> = (0..bs * 2).map(|i| (i % 251) as u8).collect();
    let written = h.write32(0, 2, &pattern)?;
    let mut back = vec![0u8; bs * 2];
    let read = h.read64(0, 2, &mut back)?;
    ensure!(back == pattern, "read-back mismatch");
    info!("wrote {written} bytes, read back {read} bytes");

    h.synchronize_cache()?;

    bus.dispose();
    Ok(())
}
