// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{collections::BTreeMap, fmt};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::{
    bus::interface::{
        BusFeatures, HostCapabilities, HostInterface, NullCapabilities, ResetFlags,
        TargetSettings,
    },
    error::{ScsiError, ScsiResult},
    state_machine::{common::StateMachineCtx, discovery_states::DiscoveryCtx},
    unit::{handle::UnitHandle, unit::Unit},
};

pub const DEFAULT_MAX_TARGETS: u8 = 16;
pub const DEFAULT_MAX_LUNS: u8 = 8;

/// Construction parameters for a [`Bus`]. Zero `max_targets`/`max_luns`
/// select the defaults (16 and 8).
#[derive(Debug, Clone, Default)]
pub struct BusConfig {
    pub bus_number: u8,
    pub max_targets: u8,
    pub max_luns: u8,
    pub features: BusFeatures,
    pub queue_depth: u32,
    /// Size of the backend private block.
    pub private_size: usize,
    /// Timeout for commands that do not carry one; 0 keeps 30 s.
    pub default_timeout_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitAddress {
    pub target: u8,
    pub lun: u8,
}

impl fmt::Display for UnitAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target, self.lun)
    }
}

/// A SCSI bus: the host adapter's capability set, its private data, and
/// the units discovered behind it.
///
/// Not thread-safe by itself; callers serialise access per bus.
pub struct Bus {
    number: u8,
    max_targets: u8,
    max_luns: u8,
    features: BusFeatures,
    queue_depth: u32,
    default_timeout_ms: u32,
    interface: Option<HostInterface>,
    units: BTreeMap<UnitAddress, Unit>,
    selected: Option<UnitAddress>,
}

impl Bus {
    /// Builds a bus. A host interface is allocated when `caps` is given or
    /// the backend declared a private block; in the latter case without
    /// capabilities every call reports "not implemented".
    pub fn new(cfg: BusConfig, caps: Option<Box<dyn HostCapabilities>>) -> Self {
        let interface = if caps.is_some() || cfg.private_size != 0 {
            let caps = caps.unwrap_or_else(|| Box::new(NullCapabilities));
            Some(HostInterface::new(caps, cfg.private_size))
        } else {
            None
        };

        let bus = Self {
            number: cfg.bus_number,
            max_targets: if cfg.max_targets == 0 {
                DEFAULT_MAX_TARGETS
            } else {
                cfg.max_targets
            },
            max_luns: if cfg.max_luns == 0 {
                DEFAULT_MAX_LUNS
            } else {
                cfg.max_luns
            },
            features: cfg.features,
            queue_depth: cfg.queue_depth,
            default_timeout_ms: cfg.default_timeout_ms,
            interface,
            units: BTreeMap::new(),
            selected: None,
        };
        debug!("{:?}", bus);
        bus
    }

    /// Releases the host interface and every unit. Idempotent.
    pub fn dispose(&mut self) {
        if self.interface.take().is_some() {
            debug!(bus = self.number, "host interface released");
        }
        self.units.clear();
        self.selected = None;
    }

    /// Bus is ready for discovery.
    pub fn start(&mut self) -> ScsiResult<()> {
        if self.interface.is_none() {
            warn!(bus = self.number, "start without host interface");
            return Err(ScsiError::Configuration);
        }
        info!(bus = self.number, "bus started");
        Ok(())
    }

    #[inline]
    pub fn number(&self) -> u8 {
        self.number
    }

    #[inline]
    pub fn max_targets(&self) -> u8 {
        self.max_targets
    }

    #[inline]
    pub fn max_luns(&self) -> u8 {
        self.max_luns
    }

    #[inline]
    pub fn features(&self) -> BusFeatures {
        self.features
    }

    #[inline]
    pub fn queue_depth(&self) -> u32 {
        self.queue_depth
    }

    #[inline]
    pub fn has_interface(&self) -> bool {
        self.interface.is_some()
    }

    /// Size of the backend private block, 0 without an interface.
    #[inline]
    pub fn private_size(&self) -> usize {
        self.interface.as_ref().map_or(0, HostInterface::private_size)
    }

    pub fn host_private(&self) -> Option<&[u8]> {
        self.interface.as_ref().map(HostInterface::private_data)
    }

    pub fn host_private_mut(&mut self) -> Option<&mut [u8]> {
        self.interface.as_mut().map(HostInterface::private_data_mut)
    }

    pub fn reset(&mut self, flags: ResetFlags) -> ScsiResult<()> {
        let iface = self.interface.as_mut().ok_or(ScsiError::Configuration)?;
        if iface.reset(flags) {
            Ok(())
        } else {
            Err(ScsiError::ProtocolPhase)
        }
    }

    pub fn configure_target(&mut self, target: u8, settings: &TargetSettings) -> ScsiResult<()> {
        if target >= self.max_targets {
            return Err(ScsiError::InvalidRequest("target id out of range"));
        }
        let iface = self.interface.as_mut().ok_or(ScsiError::Configuration)?;
        if iface.configure_target(target, settings) {
            Ok(())
        } else {
            Err(ScsiError::ProtocolPhase)
        }
    }

    /// Lets the backend make progress; a no-op without an interface.
    pub fn poll(&mut self) {
        if let Some(iface) = self.interface.as_mut() {
            iface.poll();
        }
    }

    /// Creates the unit at `target:lun` (or returns the existing one).
    pub fn add_unit(&mut self, target: u8, lun: u8) -> ScsiResult<&mut Unit> {
        if target >= self.max_targets {
            return Err(ScsiError::InvalidRequest("target id out of range"));
        }
        if lun >= self.max_luns {
            return Err(ScsiError::InvalidRequest("LUN out of range"));
        }
        let (number, timeout) = (self.number, self.default_timeout_ms);
        Ok(self
            .units
            .entry(UnitAddress { target, lun })
            .or_insert_with(|| Unit::new(number, target, lun).with_default_timeout(timeout)))
    }

    pub fn unit(&self, target: u8, lun: u8) -> Option<&Unit> {
        self.units.get(&UnitAddress { target, lun })
    }

    pub fn units(&self) -> impl Iterator<Item = (&UnitAddress, &Unit)> {
        self.units.iter()
    }

    /// Unit the last command was issued to.
    #[inline]
    pub fn selected_unit(&self) -> Option<UnitAddress> {
        self.selected
    }

    /// Borrows a unit together with the host interface so commands can be
    /// issued to it, and records it as the selected unit.
    pub fn unit_handle(&mut self, target: u8, lun: u8) -> Option<UnitHandle<'_>> {
        let addr = UnitAddress { target, lun };
        let unit = self.units.get_mut(&addr)?;
        self.selected = Some(addr);
        Some(UnitHandle::new(unit, self.interface.as_mut()))
    }

    /// Runs discovery on `target:lun`, creating the unit first if needed.
    pub fn discover(&mut self, target: u8, lun: u8) -> Result<()> {
        self.add_unit(target, lun)?;
        let addr = UnitAddress { target, lun };
        self.selected = Some(addr);
        let unit = self
            .units
            .get_mut(&addr)
            .context("unit vanished after insert")?;
        DiscoveryCtx::new(unit, self.interface.as_mut()).execute()
    }

    /// Probes every target (and every LUN when `all_luns` is set, else LUN
    /// 0 only). Units already configured are kept without re-probing;
    /// units that fail discovery are dropped. Returns the configured
    /// addresses.
    pub fn scan(&mut self, all_luns: bool) -> ScsiResult<Vec<UnitAddress>> {
        self.start()?;
        let luns = if all_luns { self.max_luns } else { 1 };
        let mut found = Vec::new();

        for target in 0..self.max_targets {
            for lun in 0..luns {
                let addr = UnitAddress { target, lun };
                if self.units.get(&addr).is_some_and(|u| u.is_ready()) {
                    found.push(addr);
                    continue;
                }
                match self.discover(target, lun) {
                    Ok(()) => found.push(addr),
                    Err(e) => {
                        debug!(bus = self.number, "{target}:{lun} not configured: {e:#}");
                        self.units.remove(&addr);
                    },
                }
            }
        }
        self.selected = None;
        info!(bus = self.number, "scan found {} unit(s)", found.len());
        Ok(found)
    }
}

impl Drop for Bus {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus")
            .field("number", &self.number)
            .field("max_targets", &self.max_targets)
            .field("max_luns", &self.max_luns)
            .field("features", &self.features)
            .field("queue_depth", &self.queue_depth)
            .field("interface", &self.interface)
            .field("units", &self.units.len())
            .finish()
    }
}
