// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! READ/WRITE (10) and (16) CDB fillers and the block I/O command builder.
//!
//! Layout (SBC):
//! - (10): byte 0 opcode, byte 1 flags, bytes 2..5 LBA (BE u32), byte 6
//!   group, bytes 7..8 TRANSFER LENGTH (BE u16), byte 9 CONTROL
//! - (16): byte 0 opcode, byte 1 flags, bytes 2..9 LBA (BE u64), bytes
//!   10..13 TRANSFER LENGTH (BE u32), byte 14 group, byte 15 CONTROL

use crate::{
    control_block::common::{CDB10_LEN, CDB16_LEN, READ_10, READ_16, WRITE_10, WRITE_16},
    error::{ScsiError, ScsiResult},
    models::command::request::{DataBuffer, ScsiCommand},
};

/// RDPROTECT[7:5] | DPO[4] | FUA[3]
const READ_FLAGS_MASK: u8 = 0b1111_1000;
/// WRPROTECT[7:5] | DPO[4] | FUA[3] | FUA_NV[1]
const WRITE_FLAGS_MASK: u8 = 0b1111_1010;

#[inline]
fn flags_for(write: bool, flags: u8) -> u8 {
    if write {
        flags & WRITE_FLAGS_MASK
    } else {
        flags & READ_FLAGS_MASK
    }
}

/// Fill a READ(10) or WRITE(10) CDB. A `blocks` of 0 means no transfer to
/// most targets and 65,536 blocks to some; callers should not send it.
#[inline]
pub fn build_rw10(
    cdb: &mut [u8; 16],
    write: bool,
    lba: u32,
    blocks: u16,
    flags: u8,
    control: u8,
) -> usize {
    cdb.fill(0);
    cdb[0] = if write { WRITE_10 } else { READ_10 };
    cdb[1] = flags_for(write, flags);
    cdb[2..6].copy_from_slice(&lba.to_be_bytes());
    cdb[7..9].copy_from_slice(&blocks.to_be_bytes());
    cdb[9] = control;
    CDB10_LEN
}

/// Fill a READ(16) or WRITE(16) CDB.
#[inline]
pub fn build_rw16(
    cdb: &mut [u8; 16],
    write: bool,
    lba: u64,
    blocks: u32,
    flags: u8,
    control: u8,
) -> usize {
    cdb.fill(0);
    cdb[0] = if write { WRITE_16 } else { READ_16 };
    cdb[1] = flags_for(write, flags);
    cdb[2..10].copy_from_slice(&lba.to_be_bytes());
    cdb[10..14].copy_from_slice(&blocks.to_be_bytes());
    cdb[15] = control;
    CDB16_LEN
}

/// Block read or write of `count` blocks at `block`.
///
/// The transfer length is `count * block_size`. `data` must be
/// [`DataBuffer::Out`] for a write and [`DataBuffer::In`] for a read. With
/// `use16 == false` the LBA must fit in 32 bits and the count in 16 bits;
/// out-of-range values are rejected rather than truncated.
pub fn read_write<'a>(
    block: u64,
    count: u32,
    block_size: u32,
    data: DataBuffer<'a>,
    write: bool,
    use16: bool,
) -> ScsiResult<ScsiCommand<'a>> {
    match (&data, write) {
        (DataBuffer::Out(_), true) | (DataBuffer::In(_), false) => {},
        _ => {
            return Err(ScsiError::InvalidRequest(
                "data buffer direction does not match operation",
            ));
        },
    }

    let transfer = count
        .checked_mul(block_size)
        .ok_or(ScsiError::InvalidRequest("transfer length overflows 32 bits"))?;

    let mut cdb = [0u8; 16];
    let cdb_len = if use16 {
        build_rw16(&mut cdb, write, block, count, 0, 0)
    } else {
        let lba = u32::try_from(block)
            .map_err(|_| ScsiError::InvalidRequest("LBA does not fit a 10-byte CDB"))?;
        let blocks = u16::try_from(count)
            .map_err(|_| ScsiError::InvalidRequest("count does not fit a 10-byte CDB"))?;
        build_rw10(&mut cdb, write, lba, blocks, 0, 0)
    };

    ScsiCommand::from_cdb(cdb, cdb_len, data, transfer)
}
