// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use enum_dispatch::enum_dispatch;
use tracing::debug;

use crate::{
    bus::interface::HostInterface,
    control_block::{read_write, synchronize_cache},
    error::{ScsiError, ScsiResult},
    handlers::perform_command::perform_command,
    models::command::request::{DataBuffer, ScsiCommand},
    unit::unit::Unit,
};

/// Block I/O entry points of a unit.
///
/// Every call returns the number of bytes moved on success; a failed call
/// leaves [`Unit::last_actual`] at zero.
#[enum_dispatch]
pub trait BlockOps {
    fn read32(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
        block: u32,
        count: u32,
        buf: &mut [u8],
    ) -> ScsiResult<u32>;

    fn write32(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
        block: u32,
        count: u32,
        buf: &[u8],
    ) -> ScsiResult<u32>;

    fn read64(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
        block: u64,
        count: u32,
        buf: &mut [u8],
    ) -> ScsiResult<u32>;

    fn write64(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
        block: u64,
        count: u32,
        buf: &[u8],
    ) -> ScsiResult<u32>;

    fn synchronize_cache(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
    ) -> ScsiResult<()>;

    /// Raw pass-through of a caller-built command.
    fn direct_scsi(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
        cmd: &mut ScsiCommand<'_>,
    ) -> ScsiResult<()>;
}

/// Table installed on construction: nothing reaches the bus.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedOps;

impl UnsupportedOps {
    #[inline]
    fn reject(unit: &mut Unit) -> ScsiError {
        unit.last_actual = 0;
        debug!(unit = unit.number(), "unsupported operation on unit");
        ScsiError::Unsupported
    }
}

impl BlockOps for UnsupportedOps {
    fn read32(
        &self,
        unit: &mut Unit,
        _host: Option<&mut HostInterface>,
        _block: u32,
        _count: u32,
        _buf: &mut [u8],
    ) -> ScsiResult<u32> {
        Err(Self::reject(unit))
    }

    fn write32(
        &self,
        unit: &mut Unit,
        _host: Option<&mut HostInterface>,
        _block: u32,
        _count: u32,
        _buf: &[u8],
    ) -> ScsiResult<u32> {
        Err(Self::reject(unit))
    }

    fn read64(
        &self,
        unit: &mut Unit,
        _host: Option<&mut HostInterface>,
        _block: u64,
        _count: u32,
        _buf: &mut [u8],
    ) -> ScsiResult<u32> {
        Err(Self::reject(unit))
    }

    fn write64(
        &self,
        unit: &mut Unit,
        _host: Option<&mut HostInterface>,
        _block: u64,
        _count: u32,
        _buf: &[u8],
    ) -> ScsiResult<u32> {
        Err(Self::reject(unit))
    }

    fn synchronize_cache(
        &self,
        unit: &mut Unit,
        _host: Option<&mut HostInterface>,
    ) -> ScsiResult<()> {
        Err(Self::reject(unit))
    }

    fn direct_scsi(
        &self,
        unit: &mut Unit,
        _host: Option<&mut HostInterface>,
        cmd: &mut ScsiCommand<'_>,
    ) -> ScsiResult<()> {
        cmd.actual_length = 0;
        Err(Self::reject(unit))
    }
}

/// Table installed by discovery: 32-bit entries use 10-byte CDBs, 64-bit
/// entries 16-byte CDBs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadyOps;

impl ReadyOps {
    fn transfer(
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
        block: u64,
        count: u32,
        data: DataBuffer<'_>,
        write: bool,
        use16: bool,
    ) -> ScsiResult<u32> {
        unit.last_actual = 0;
        let mut cmd = read_write(block, count, unit.block_size(), data, write, use16)?;
        let requested = cmd.data_length;

        perform_command(unit, host, &mut cmd)?;

        // Backends that do not report a length moved the whole request.
        let actual = if cmd.actual_length != 0 {
            cmd.actual_length
        } else {
            requested
        };
        unit.last_actual = actual;
        Ok(actual)
    }
}

impl BlockOps for ReadyOps {
    fn read32(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
        block: u32,
        count: u32,
        buf: &mut [u8],
    ) -> ScsiResult<u32> {
        Self::transfer(unit, host, block as u64, count, DataBuffer::In(buf), false, false)
    }

    fn write32(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
        block: u32,
        count: u32,
        buf: &[u8],
    ) -> ScsiResult<u32> {
        Self::transfer(unit, host, block as u64, count, DataBuffer::Out(buf), true, false)
    }

    fn read64(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
        block: u64,
        count: u32,
        buf: &mut [u8],
    ) -> ScsiResult<u32> {
        Self::transfer(unit, host, block, count, DataBuffer::In(buf), false, true)
    }

    fn write64(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
        block: u64,
        count: u32,
        buf: &[u8],
    ) -> ScsiResult<u32> {
        Self::transfer(unit, host, block, count, DataBuffer::Out(buf), true, true)
    }

    fn synchronize_cache(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
    ) -> ScsiResult<()> {
        let mut cmd = synchronize_cache()?;
        perform_command(unit, host, &mut cmd)
    }

    fn direct_scsi(
        &self,
        unit: &mut Unit,
        host: Option<&mut HostInterface>,
        cmd: &mut ScsiCommand<'_>,
    ) -> ScsiResult<()> {
        perform_command(unit, host, cmd)
    }
}

/// The only two tables a unit can carry.
#[enum_dispatch(BlockOps)]
#[derive(Debug, Clone, Copy)]
pub enum UnitDispatch {
    UnsupportedOps,
    ReadyOps,
}

impl Default for UnitDispatch {
    fn default() -> Self {
        UnsupportedOps.into()
    }
}
