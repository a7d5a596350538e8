// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    bus::{
        bus::{BusConfig, DEFAULT_MAX_LUNS, DEFAULT_MAX_TARGETS},
        interface::{BusFeature, BusFeatures},
    },
    cfg::enums::{DeviceType, YesNo},
    unit::unit::DEFAULT_TIMEOUT_MS,
};

/// Largest medium the in-memory backend will allocate.
pub const MEM_DISK_MAX_BYTES: u64 = 1 << 30;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Declared host adapter parameters.
    pub bus: BusSection,
    /// Implementation/runtime parameters.
    pub runtime: RuntimeConfig,
    /// Optional RAM-backed target attached to the bus.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mem_disk: Option<MemDiskConfig>,
}

/// Bus construction parameters as declared by a host adapter.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct BusSection {
    #[serde(default, rename = "BusNumber")]
    pub bus_number: u8,

    #[serde(default, rename = "MaxTargets")]
    /// 0 selects 16.
    pub max_targets: u8,

    #[serde(default, rename = "MaxLUNs")]
    /// 0 selects 8.
    pub max_luns: u8,

    #[serde(default, rename = "Features")]
    pub features: Vec<BusFeature>,

    #[serde(default, rename = "CommandQueueDepth")]
    pub command_queue_depth: u32,

    #[serde(default, rename = "InterfaceDataSize")]
    /// Size of the backend private block in bytes.
    pub interface_data_size: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Runtime-only settings.
pub struct RuntimeConfig {
    #[serde(default = "default_timeout_ms", rename = "DefaultTimeoutMs")]
    /// Timeout for commands that do not carry their own.
    pub default_timeout_ms: u32,

    #[serde(default, rename = "ScanLuns")]
    /// Probe every LUN during a scan instead of LUN 0 only.
    pub scan_luns: YesNo,
}

fn default_timeout_ms() -> u32 {
    DEFAULT_TIMEOUT_MS
}

fn default_block_size() -> u32 {
    512
}

#[derive(Deserialize, Serialize, Debug, Clone)]
/// Geometry and identity of the in-memory target.
pub struct MemDiskConfig {
    #[serde(default, rename = "Target")]
    pub target: u8,
    #[serde(default, rename = "Lun")]
    pub lun: u8,
    #[serde(default = "default_block_size", rename = "BlockSize")]
    pub block_size: u32,
    #[serde(rename = "Blocks")]
    pub blocks: u64,
    #[serde(default, rename = "DeviceType")]
    pub device_type: DeviceType,
    #[serde(default, rename = "Removable")]
    pub removable: YesNo,
    #[serde(default = "yes", rename = "SupportsReadCapacity16")]
    /// When `No`, READ CAPACITY(16) is rejected as an unknown opcode.
    pub supports_read_capacity16: YesNo,
}

fn yes() -> YesNo {
    YesNo::Yes
}

impl MemDiskConfig {
    /// Direct-access disk at 0:0 with READ CAPACITY(16) support.
    pub fn disk(blocks: u64, block_size: u32) -> Self {
        Self {
            target: 0,
            lun: 0,
            block_size,
            blocks,
            device_type: DeviceType::DirectAccess,
            removable: YesNo::No,
            supports_read_capacity16: YesNo::Yes,
        }
    }

    #[inline]
    pub fn medium_bytes(&self) -> u64 {
        self.blocks.saturating_mul(self.block_size as u64)
    }
}

impl Config {
    /// Loads the configuration from YAML, validates it, and returns the
    /// ready-to-use value.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {path:?}"))?;
        let mut cfg: Config =
            serde_yaml::from_str(&s).context("failed to parse config YAML")?;
        cfg.validate_and_normalize()?;
        Ok(cfg)
    }

    /// Validates invariants and normalizes derived fields.
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        if self.bus.max_targets == 0 {
            self.bus.max_targets = DEFAULT_MAX_TARGETS;
        }
        if self.bus.max_luns == 0 {
            self.bus.max_luns = DEFAULT_MAX_LUNS;
        }
        if self.runtime.default_timeout_ms == 0 {
            self.runtime.default_timeout_ms = DEFAULT_TIMEOUT_MS;
        }

        ensure!(
            self.bus.max_targets <= DEFAULT_MAX_TARGETS,
            "MaxTargets must be <= {DEFAULT_MAX_TARGETS}"
        );
        ensure!(
            self.bus.max_luns <= DEFAULT_MAX_LUNS,
            "MaxLUNs must be <= {DEFAULT_MAX_LUNS}"
        );

        if let Some(md) = &self.mem_disk {
            ensure!(md.block_size > 0, "mem_disk.BlockSize must be > 0");
            ensure!(md.blocks > 0, "mem_disk.Blocks must be > 0");
            ensure!(
                md.medium_bytes() <= MEM_DISK_MAX_BYTES,
                "mem_disk medium exceeds {MEM_DISK_MAX_BYTES} bytes"
            );
            ensure!(
                md.target < self.bus.max_targets,
                "mem_disk.Target must be < MaxTargets"
            );
            ensure!(md.lun < self.bus.max_luns, "mem_disk.Lun must be < MaxLUNs");

            // The medium lives in the backend private block.
            let need = md.medium_bytes() as usize;
            if self.bus.interface_data_size < need {
                self.bus.interface_data_size = need;
            }
        }

        Ok(())
    }

    /// Construction parameters for [`Bus::new`](crate::bus::bus::Bus::new).
    pub fn bus_config(&self) -> BusConfig {
        BusConfig {
            bus_number: self.bus.bus_number,
            max_targets: self.bus.max_targets,
            max_luns: self.bus.max_luns,
            features: self.bus.features.iter().copied().collect::<BusFeatures>(),
            queue_depth: self.bus.command_queue_depth,
            private_size: self.bus.interface_data_size,
            default_timeout_ms: self.runtime.default_timeout_ms,
        }
    }
}
