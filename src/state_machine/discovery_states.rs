// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, warn};

use crate::{
    bus::interface::HostInterface,
    control_block::{
        common::{DEVICE_TYPE_DIRECT_ACCESS, SA_READ_CAPACITY_16},
        inquiry::{INQUIRY_DATA_LEN, device_type_str, inquiry},
        read_capacity::{
            Capacity, RC10_DATA_LEN, RC16_DATA_LEN, parse_read_capacity10_zerocopy,
            parse_read_capacity16_zerocopy, read_capacity,
        },
    },
    error::ScsiResult,
    handlers::perform_command::perform_command,
    state_machine::common::{StateMachine, StateMachineCtx, Transition},
    unit::{
        dispatch::ReadyOps,
        unit::{DiscoveryState, Geometry, Unit, UnitSetup, XferModes, sector_shift},
    },
};

/// Probes one unit and, on success, publishes its identity and capacity
/// and installs the ready dispatch table.
///
/// Sequence: INQUIRY(96) → READ CAPACITY(16) → on any failure READ
/// CAPACITY(10) → configure. Everything learned is staged in the context
/// and committed to the unit in one step at the end, so a failed run leaves
/// the unit absent with its unsupported table.
#[derive(Debug)]
pub struct DiscoveryCtx<'a> {
    pub unit: &'a mut Unit,
    host: Option<&'a mut HostInterface>,

    inquiry: [u8; INQUIRY_DATA_LEN],
    capacity_buf: [u8; RC16_DATA_LEN],
    capacity: Option<Capacity>,
    state: Option<DiscoveryStates>,
}

impl<'a> DiscoveryCtx<'a> {
    pub fn new(unit: &'a mut Unit, host: Option<&'a mut HostInterface>) -> Self {
        Self {
            unit,
            host,
            inquiry: [0u8; INQUIRY_DATA_LEN],
            capacity_buf: [0u8; RC16_DATA_LEN],
            capacity: None,
            state: Some(DiscoveryStates::Inquiry(Inquiry)),
        }
    }

    fn send_inquiry(&mut self) -> ScsiResult<()> {
        let mut cmd = inquiry(0, &mut self.inquiry)?;
        perform_command(self.unit, self.host.as_deref_mut(), &mut cmd)
    }

    fn send_read_capacity16(&mut self) -> Result<Capacity> {
        self.capacity_buf.fill(0);
        let mut cmd = read_capacity(SA_READ_CAPACITY_16, &mut self.capacity_buf)?;
        perform_command(self.unit, self.host.as_deref_mut(), &mut cmd)?;
        Ok(parse_read_capacity16_zerocopy(&self.capacity_buf)?.capacity())
    }

    fn send_read_capacity10(&mut self) -> Result<Capacity> {
        self.capacity_buf.fill(0);
        let mut cmd = read_capacity(0, &mut self.capacity_buf[..RC10_DATA_LEN])?;
        perform_command(self.unit, self.host.as_deref_mut(), &mut cmd)?;
        let raw = parse_read_capacity10_zerocopy(&self.capacity_buf)?;
        if raw.indicates_overflow() {
            warn!(unit = self.unit.number(), "READ CAPACITY(10) saturated, capacity truncated");
        }
        Ok(raw.capacity())
    }

    fn stage(&self) -> Result<UnitSetup> {
        let cap = self
            .capacity
            .ok_or_else(|| anyhow!("capacity not probed"))?;
        let device_type = self.inquiry[0] & 0x1F;
        debug!(unit = self.unit.number(), bytes = %cap.total_bytes(), "medium size");

        let mut xfer_modes = XferModes::empty();
        if device_type != DEVICE_TYPE_DIRECT_ACCESS {
            xfer_modes |= XferModes::PACKET;
        }

        Ok(UnitSetup {
            device_type,
            removable: self.inquiry[1] & 0x80 != 0,
            inquiry: self.inquiry,
            block_size: cap.block_size,
            capacity: cap.blocks,
            sector_shift: sector_shift(cap.block_size),
            xfer_modes,
            geometry: Geometry {
                cylinders: u32::try_from(cap.blocks).unwrap_or(u32::MAX),
                heads: 1,
                sectors: 1,
            },
        })
    }
}

#[derive(Debug)]
pub struct Inquiry;
#[derive(Debug)]
pub struct ReadCapacity16;
#[derive(Debug)]
pub struct ReadCapacity10;
#[derive(Debug)]
pub struct Configure;

#[derive(Debug)]
pub enum DiscoveryStates {
    Inquiry(Inquiry),
    ReadCapacity16(ReadCapacity16),
    ReadCapacity10(ReadCapacity10),
    Configure(Configure),
}

type DiscoveryStepOut = Transition<DiscoveryStates, Result<()>>;

impl<'ctx> StateMachine<DiscoveryCtx<'ctx>, DiscoveryStepOut> for Inquiry {
    fn step(&self, ctx: &mut DiscoveryCtx<'ctx>) -> DiscoveryStepOut {
        match ctx.send_inquiry() {
            Ok(()) => Transition::Next(
                DiscoveryStates::ReadCapacity16(ReadCapacity16),
                Ok(()),
            ),
            Err(e) => Transition::Done(Err(anyhow::Error::new(e).context("INQUIRY failed"))),
        }
    }
}

impl<'ctx> StateMachine<DiscoveryCtx<'ctx>, DiscoveryStepOut> for ReadCapacity16 {
    fn step(&self, ctx: &mut DiscoveryCtx<'ctx>) -> DiscoveryStepOut {
        match ctx.send_read_capacity16() {
            Ok(cap) => {
                ctx.capacity = Some(cap);
                Transition::Next(DiscoveryStates::Configure(Configure), Ok(()))
            },
            Err(e) => {
                debug!(unit = ctx.unit.number(), "READ CAPACITY(16) failed: {e:#}, trying (10)");
                Transition::Next(DiscoveryStates::ReadCapacity10(ReadCapacity10), Ok(()))
            },
        }
    }
}

impl<'ctx> StateMachine<DiscoveryCtx<'ctx>, DiscoveryStepOut> for ReadCapacity10 {
    fn step(&self, ctx: &mut DiscoveryCtx<'ctx>) -> DiscoveryStepOut {
        match ctx.send_read_capacity10() {
            Ok(cap) => {
                ctx.capacity = Some(cap);
                Transition::Next(DiscoveryStates::Configure(Configure), Ok(()))
            },
            Err(e) => Transition::Done(Err(e.context("READ CAPACITY(10) failed"))),
        }
    }
}

impl<'ctx> StateMachine<DiscoveryCtx<'ctx>, DiscoveryStepOut> for Configure {
    fn step(&self, ctx: &mut DiscoveryCtx<'ctx>) -> DiscoveryStepOut {
        match ctx.stage() {
            Ok(setup) => {
                info!(
                    unit = ctx.unit.number(),
                    "{} {} blocks x {} bytes, shift {}",
                    device_type_str(setup.device_type),
                    setup.capacity,
                    setup.block_size,
                    setup.sector_shift
                );
                ctx.unit.commit_setup(setup, ReadyOps.into());
                Transition::Done(Ok(()))
            },
            Err(e) => Transition::Done(Err(e)),
        }
    }
}

impl<'ctx> StateMachineCtx<DiscoveryCtx<'ctx>> for DiscoveryCtx<'ctx> {
    fn execute(&mut self) -> Result<()> {
        match self.unit.state() {
            DiscoveryState::Ready => bail!("unit {:#06x} already configured", self.unit.number()),
            DiscoveryState::Discovering => {
                bail!("unit {:#06x} discovery already running", self.unit.number())
            },
            DiscoveryState::Uninitialized | DiscoveryState::Failed => {},
        }

        debug!(unit = self.unit.number(), "Loop discovery");
        self.unit.set_state(DiscoveryState::Discovering);

        let res = self.run();
        if let Err(e) = &res {
            warn!(unit = self.unit.number(), "discovery failed: {e:#}");
            self.unit.set_state(DiscoveryState::Failed);
        }
        res
    }
}

impl DiscoveryCtx<'_> {
    fn run(&mut self) -> Result<()> {
        loop {
            let state = self.state.take().context("state must be set DiscoveryCtx")?;
            let tr = match state {
                DiscoveryStates::Inquiry(s) => s.step(self),
                DiscoveryStates::ReadCapacity16(s) => s.step(self),
                DiscoveryStates::ReadCapacity10(s) => s.step(self),
                DiscoveryStates::Configure(s) => s.step(self),
            };

            match tr {
                Transition::Next(next, r) => {
                    r?;
                    self.state = Some(next);
                },
                Transition::Stay(Ok(_)) => {},
                Transition::Stay(Err(e)) => return Err(e),
                Transition::Done(r) => return r,
            }
        }
    }
}
