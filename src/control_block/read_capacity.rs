// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Result, anyhow};
use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout,
    byteorder::{BigEndian, U32, U64},
};

use crate::{
    control_block::common::{
        CDB10_LEN, CDB16_LEN, READ_CAPACITY_10, SA_READ_CAPACITY_16,
        SERVICE_ACTION_IN_16,
    },
    error::ScsiResult,
    models::command::request::{DataBuffer, ScsiCommand},
};

/// Parameter data length of READ CAPACITY(10).
pub const RC10_DATA_LEN: usize = 8;
/// Allocation length used for READ CAPACITY(16).
pub const RC16_DATA_LEN: usize = 32;

/// Build a padded 16-byte **SCSI READ CAPACITY(10)** CDB (opcode 0x25).
///
/// Only the opcode is set: no LBA hint, PMI=0. Targets return the **maximum
/// LBA** and the **logical block length** (8-byte response).
#[inline]
pub fn build_read_capacity10(cdb: &mut [u8; 16], control: u8) -> usize {
    cdb.fill(0);
    cdb[0] = READ_CAPACITY_10;
    cdb[9] = control;
    CDB10_LEN
}

/// Build a 16-byte **SCSI READ CAPACITY(16)** CDB via SERVICE ACTION IN(16)
/// (opcode 0x9E, SA=0x10).
///
/// - `alloc_len` : Allocation length for the parameter data (big-endian,
///   bytes 10..13). Use **32** to get full data.
#[inline]
pub fn build_read_capacity16(cdb: &mut [u8; 16], alloc_len: u32, control: u8) -> usize {
    cdb.fill(0);
    cdb[0] = SERVICE_ACTION_IN_16;
    cdb[1] = SA_READ_CAPACITY_16;
    cdb[10..14].copy_from_slice(&alloc_len.to_be_bytes());
    cdb[15] = control;
    CDB16_LEN
}

/// READ CAPACITY for `service_action`: 0x10 selects the 16-byte SERVICE
/// ACTION IN form with `buf.len()` as allocation length, anything else the
/// parameterless 10-byte form. The requested length is always `buf.len()`.
pub fn read_capacity(service_action: u8, buf: &mut [u8]) -> ScsiResult<ScsiCommand<'_>> {
    let len = buf.len() as u32;
    let mut cdb = [0u8; 16];
    let cdb_len = if service_action == SA_READ_CAPACITY_16 {
        build_read_capacity16(&mut cdb, len, 0)
    } else {
        build_read_capacity10(&mut cdb, 0)
    };
    ScsiCommand::from_cdb(cdb, cdb_len, DataBuffer::In(buf), len)
}

/// Raw 8-byte parameter data returned by READ CAPACITY(10) command
///
/// All fields are stored in big-endian format as per SCSI specification.
#[repr(C)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Debug)]
pub struct Rc10Raw {
    /// Maximum logical block address (bytes 0-3) - highest valid LBA on the device
    pub max_lba: U32<BigEndian>,
    /// Block length in bytes (bytes 4-7) - size of each logical block
    pub block_len: U32<BigEndian>,
}

/// Raw header (first 12 bytes) of READ CAPACITY(16) parameter data
#[repr(C)]
#[derive(FromBytes, IntoBytes, KnownLayout, Immutable, Debug)]
pub struct Rc16Raw {
    /// Maximum logical block address (bytes 0-7) - 64-bit LBA for large devices
    pub max_lba: U64<BigEndian>,
    /// Block length in bytes (bytes 8-11) - size of each logical block
    pub block_len: U32<BigEndian>,
}

/// Capacity as published on a unit: block count and block size, with a
/// zero block size already replaced by 512.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub blocks: u64,
    pub block_size: u32,
}

/// Block size assumed when a target reports zero.
pub const DEFAULT_BLOCK_SIZE: u32 = 512;

#[inline]
fn nonzero_block_size(v: u32) -> u32 {
    if v == 0 { DEFAULT_BLOCK_SIZE } else { v }
}

impl Rc10Raw {
    #[inline]
    pub fn capacity(&self) -> Capacity {
        Capacity {
            blocks: self.max_lba.get() as u64 + 1,
            block_size: nonzero_block_size(self.block_len.get()),
        }
    }

    /// If true, target likely needs READ CAPACITY(16).
    #[inline]
    pub fn indicates_overflow(&self) -> bool {
        self.max_lba.get() == u32::MAX
    }
}

impl Rc16Raw {
    #[inline]
    pub fn capacity(&self) -> Capacity {
        Capacity {
            blocks: self.max_lba.get().wrapping_add(1),
            block_size: nonzero_block_size(self.block_len.get()),
        }
    }
}

impl Capacity {
    #[inline]
    pub fn total_bytes(&self) -> u128 {
        self.blocks as u128 * self.block_size as u128
    }
}

/// Parse READ CAPACITY(10) parameter data (needs ≥ 8 bytes).
#[inline]
pub fn parse_read_capacity10_zerocopy(buf: &[u8]) -> Result<&Rc10Raw> {
    let (raw, _rest) = Rc10Raw::ref_from_prefix(buf)
        .map_err(|_| anyhow!("READ CAPACITY(10): need ≥ 8 bytes, got {}", buf.len()))?;
    Ok(raw)
}

/// Parse READ CAPACITY(16) parameter data head (needs ≥ 12 bytes).
#[inline]
pub fn parse_read_capacity16_zerocopy(buf: &[u8]) -> Result<&Rc16Raw> {
    let (raw, _rest) = Rc16Raw::ref_from_prefix(buf)
        .map_err(|_| anyhow!("READ CAPACITY(16): need ≥ 12 bytes, got {}", buf.len()))?;
    Ok(raw)
}
