// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;

use crate::{
    bus::interface::HostInterface,
    control_block::{request_sense, test_unit_ready},
    error::ScsiResult,
    handlers::perform_command::perform_command,
    models::command::request::ScsiCommand,
    state_machine::{common::StateMachineCtx, discovery_states::DiscoveryCtx},
    unit::{dispatch::BlockOps, unit::Unit},
};

/// A unit borrowed together with its bus's host interface.
///
/// Block I/O goes through the unit's installed dispatch table, so it fails
/// with `Unsupported` until discovery has run.
#[derive(Debug)]
pub struct UnitHandle<'a> {
    unit: &'a mut Unit,
    host: Option<&'a mut HostInterface>,
}

impl<'a> UnitHandle<'a> {
    pub fn new(unit: &'a mut Unit, host: Option<&'a mut HostInterface>) -> Self {
        Self { unit, host }
    }

    #[inline]
    pub fn unit(&self) -> &Unit {
        self.unit
    }

    pub fn read32(&mut self, block: u32, count: u32, buf: &mut [u8]) -> ScsiResult<u32> {
        let ops = self.unit.dispatch();
        ops.read32(self.unit, self.host.as_deref_mut(), block, count, buf)
    }

    pub fn write32(&mut self, block: u32, count: u32, buf: &[u8]) -> ScsiResult<u32> {
        let ops = self.unit.dispatch();
        ops.write32(self.unit, self.host.as_deref_mut(), block, count, buf)
    }

    pub fn read64(&mut self, block: u64, count: u32, buf: &mut [u8]) -> ScsiResult<u32> {
        let ops = self.unit.dispatch();
        ops.read64(self.unit, self.host.as_deref_mut(), block, count, buf)
    }

    pub fn write64(&mut self, block: u64, count: u32, buf: &[u8]) -> ScsiResult<u32> {
        let ops = self.unit.dispatch();
        ops.write64(self.unit, self.host.as_deref_mut(), block, count, buf)
    }

    pub fn synchronize_cache(&mut self) -> ScsiResult<()> {
        let ops = self.unit.dispatch();
        ops.synchronize_cache(self.unit, self.host.as_deref_mut())
    }

    /// Pass-through of a caller-built command via the dispatch table.
    pub fn direct_scsi(&mut self, cmd: &mut ScsiCommand<'_>) -> ScsiResult<()> {
        let ops = self.unit.dispatch();
        ops.direct_scsi(self.unit, self.host.as_deref_mut(), cmd)
    }

    /// Submits `cmd` directly, whatever table is installed.
    pub fn perform(&mut self, cmd: &mut ScsiCommand<'_>) -> ScsiResult<()> {
        perform_command(self.unit, self.host.as_deref_mut(), cmd)
    }

    pub fn test_unit_ready(&mut self) -> ScsiResult<()> {
        let mut cmd = test_unit_ready()?;
        self.perform(&mut cmd)
    }

    /// REQUEST SENSE into `buf`; returns the number of bytes received.
    pub fn request_sense(&mut self, buf: &mut [u8]) -> ScsiResult<u32> {
        let mut cmd = request_sense(buf)?;
        perform_command(self.unit, self.host.as_deref_mut(), &mut cmd)?;
        Ok(cmd.actual_length)
    }

    pub fn discover(&mut self) -> Result<()> {
        DiscoveryCtx::new(self.unit, self.host.as_deref_mut()).execute()
    }
}
