// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt;

use bitflags::bitflags;

use crate::{
    control_block::{inquiry::INQUIRY_DATA_LEN, read_capacity::DEFAULT_BLOCK_SIZE},
    models::sense::SenseTriple,
    unit::dispatch::{UnitDispatch, UnsupportedOps},
    utils::unit_number,
};

/// Timeout applied to commands that do not set one.
pub const DEFAULT_TIMEOUT_MS: u32 = 30_000;
/// Sector shift used when the block size is not a power of two.
pub const FALLBACK_SECTOR_SHIFT: u8 = 9;

bitflags! {
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UnitFlags: u8 {
        const REMOVABLE = 1 << 0;
        const PRESENT   = 1 << 1;
        const TAGGED    = 1 << 2;
        const SYNC      = 1 << 3;
        const CHANGED   = 1 << 4;
    }
}

bitflags! {
    /// Transfer modes a unit supports / uses.
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct XferModes: u32 {
        /// Packet-style (ATAPI-like) transfers for non direct-access devices.
        const PACKET = 1 << 0;
    }
}

impl fmt::Debug for UnitFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter_names().map(|(n, _)| n).collect();
        write!(f, "UnitFlags({})", names.join("|"))
    }
}

impl fmt::Debug for XferModes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter_names().map(|(n, _)| n).collect();
        write!(f, "XferModes({})", names.join("|"))
    }
}

/// Where a unit is in its discovery lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryState {
    #[default]
    Uninitialized,
    Discovering,
    Ready,
    Failed,
}

/// Legacy CHS view; cylinders mirror the block count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub cylinders: u32,
    pub heads: u8,
    pub sectors: u8,
}

/// Everything discovery publishes on a unit, staged before the commit.
#[derive(Debug, Clone)]
pub(crate) struct UnitSetup {
    pub device_type: u8,
    pub removable: bool,
    pub inquiry: [u8; INQUIRY_DATA_LEN],
    pub block_size: u32,
    pub capacity: u64,
    pub sector_shift: u8,
    pub xfer_modes: XferModes,
    pub geometry: Geometry,
}

/// One logical unit on a bus.
pub struct Unit {
    target: u8,
    lun: u8,
    number: u32,
    device_type: u8,
    flags: UnitFlags,
    block_size: u32,
    capacity: u64,
    capacity48: u64,
    sector_shift: u8,
    xfer_modes: XferModes,
    use_modes: XferModes,
    geometry: Geometry,
    inquiry: [u8; INQUIRY_DATA_LEN],
    state: DiscoveryState,
    dispatch: UnitDispatch,

    /// Sense of the last CHECK CONDITION, zeroed before every submission.
    pub(crate) sense: SenseTriple,
    /// Bytes moved by the last command, zeroed before every submission.
    pub(crate) last_actual: u32,
    pub(crate) default_timeout_ms: u32,
}

impl Unit {
    pub fn new(bus_number: u8, target: u8, lun: u8) -> Self {
        Self {
            target,
            lun,
            number: unit_number(bus_number, target, lun),
            device_type: 0,
            flags: UnitFlags::empty(),
            block_size: DEFAULT_BLOCK_SIZE,
            capacity: 0,
            capacity48: 0,
            sector_shift: 0,
            xfer_modes: XferModes::empty(),
            use_modes: XferModes::empty(),
            geometry: Geometry::default(),
            inquiry: [0u8; INQUIRY_DATA_LEN],
            state: DiscoveryState::Uninitialized,
            dispatch: UnsupportedOps.into(),
            sense: SenseTriple::default(),
            last_actual: 0,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_default_timeout(mut self, timeout_ms: u32) -> Self {
        if timeout_ms != 0 {
            self.default_timeout_ms = timeout_ms;
        }
        self
    }

    #[inline]
    pub fn target(&self) -> u8 {
        self.target
    }

    #[inline]
    pub fn lun(&self) -> u8 {
        self.lun
    }

    /// `bus << 8 | target << 4 | lun`
    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[inline]
    pub fn device_type(&self) -> u8 {
        self.device_type
    }

    #[inline]
    pub fn flags(&self) -> UnitFlags {
        self.flags
    }

    #[inline]
    pub fn is_present(&self) -> bool {
        self.flags.contains(UnitFlags::PRESENT)
    }

    #[inline]
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Total number of logical blocks.
    #[inline]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    #[inline]
    pub fn capacity48(&self) -> u64 {
        self.capacity48
    }

    #[inline]
    pub fn sector_shift(&self) -> u8 {
        self.sector_shift
    }

    #[inline]
    pub fn xfer_modes(&self) -> XferModes {
        self.xfer_modes
    }

    #[inline]
    pub fn use_modes(&self) -> XferModes {
        self.use_modes
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[inline]
    pub fn inquiry_data(&self) -> &[u8; INQUIRY_DATA_LEN] {
        &self.inquiry
    }

    #[inline]
    pub fn sense(&self) -> SenseTriple {
        self.sense
    }

    #[inline]
    pub fn last_actual(&self) -> u32 {
        self.last_actual
    }

    #[inline]
    pub fn state(&self) -> DiscoveryState {
        self.state
    }

    #[inline]
    pub fn dispatch(&self) -> UnitDispatch {
        self.dispatch
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self.dispatch, UnitDispatch::ReadyOps(_))
    }

    pub(crate) fn set_state(&mut self, state: DiscoveryState) {
        self.state = state;
    }

    /// Publishes a completed discovery and installs the ready table in one
    /// step. Nothing on the unit changes before this call.
    pub(crate) fn commit_setup(&mut self, setup: UnitSetup, ready: UnitDispatch) {
        self.device_type = setup.device_type;
        self.inquiry = setup.inquiry;
        if setup.removable {
            self.flags |= UnitFlags::REMOVABLE;
        }
        self.flags |= UnitFlags::PRESENT;
        self.block_size = setup.block_size;
        self.capacity = setup.capacity;
        self.capacity48 = setup.capacity;
        self.sector_shift = setup.sector_shift;
        self.xfer_modes = setup.xfer_modes;
        self.use_modes = setup.xfer_modes;
        self.geometry = setup.geometry;
        self.dispatch = ready;
        self.state = DiscoveryState::Ready;
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("number", &format_args!("{:#06x}", self.number))
            .field("target", &self.target)
            .field("lun", &self.lun)
            .field("device_type", &self.device_type)
            .field("flags", &self.flags)
            .field("block_size", &self.block_size)
            .field("capacity", &self.capacity)
            .field("sector_shift", &self.sector_shift)
            .field("state", &self.state)
            .field("sense", &self.sense)
            .finish()
    }
}

/// Smallest shift in `0..=31` with `1 << shift >= block_size`, replaced by
/// 9 when that power of two is not exactly `block_size`.
pub fn sector_shift(block_size: u32) -> u8 {
    let mut shift: u8 = 0;
    while (1u32 << shift) < block_size && shift < 31 {
        shift += 1;
    }
    if (1u32 << shift) != block_size {
        FALLBACK_SECTOR_SHIFT
    } else {
        shift
    }
}
