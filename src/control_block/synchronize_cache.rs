// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    control_block::common::{CDB10_LEN, SYNCHRONIZE_CACHE_10},
    error::ScsiResult,
    models::command::request::{DataBuffer, ScsiCommand},
};

/// Build a SYNCHRONIZE CACHE(10) CDB covering the whole medium
/// (LBA = 0, number of blocks = 0).
#[inline]
pub fn build_synchronize_cache10(cdb: &mut [u8; 16], immed: bool, control: u8) -> usize {
    cdb.fill(0);
    cdb[0] = SYNCHRONIZE_CACHE_10;
    cdb[1] = if immed { 0x02 } else { 0x00 }; // IMMED (bit 1)
    cdb[9] = control;
    CDB10_LEN
}

/// Flush the unit's volatile cache; no data phase.
pub fn synchronize_cache<'a>() -> ScsiResult<ScsiCommand<'a>> {
    let mut cdb = [0u8; 16];
    let len = build_synchronize_cache10(&mut cdb, false, 0);
    ScsiCommand::from_cdb(cdb, len, DataBuffer::None, 0)
}
