// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! REQUEST SENSE — 6-byte CDB filler written into a provided 16-byte buffer.
//!
//! CDB layout (SPC):
//!   [0] = 0x03 (REQUEST SENSE)
//!   [1] = DESC (bit 0), other bits reserved=0
//!   [2]..[3] = reserved (0)
//!   [4] = ALLOCATION LENGTH (number of bytes to return)
//!   [5] = CONTROL

use crate::{
    control_block::common::{CDB6_LEN, REQUEST_SENSE},
    error::{ScsiError, ScsiResult},
    models::command::request::{DataBuffer, ScsiCommand},
};

/// Fill a REQUEST SENSE (6) CDB into `cdb[0..6]`.
#[inline]
pub fn fill_request_sense(
    cdb: &mut [u8; 16],
    desc: bool,
    allocation_len: u8,
    control: u8,
) -> usize {
    cdb.fill(0);
    cdb[0] = REQUEST_SENSE;
    cdb[1] = (desc as u8) & 0x01; // DESC bit (bit 0)
    cdb[4] = allocation_len;
    cdb[5] = control;
    CDB6_LEN
}

/// REQUEST SENSE in fixed format; the allocation length is `buf.len()`.
pub fn request_sense(buf: &mut [u8]) -> ScsiResult<ScsiCommand<'_>> {
    let len = u8::try_from(buf.len())
        .map_err(|_| ScsiError::InvalidRequest("REQUEST SENSE allocation > 255"))?;
    let mut cdb = [0u8; 16];
    let cdb_len = fill_request_sense(&mut cdb, false, len, 0x00);
    ScsiCommand::from_cdb(cdb, cdb_len, DataBuffer::In(buf), len as u32)
}
