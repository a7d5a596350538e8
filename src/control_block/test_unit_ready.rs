// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::{
    control_block::common::{CDB6_LEN, TEST_UNIT_READY},
    error::ScsiResult,
    models::command::request::{DataBuffer, ScsiCommand},
};

/// Build a standard TEST UNIT READY CDB.
#[inline]
pub fn build_test_unit_ready(cdb: &mut [u8; 16], control: u8) -> usize {
    cdb.fill(0);
    cdb[0] = TEST_UNIT_READY;
    cdb[5] = control;
    CDB6_LEN
}

/// TEST UNIT READY with no data phase.
pub fn test_unit_ready<'a>() -> ScsiResult<ScsiCommand<'a>> {
    let mut cdb = [0u8; 16];
    let len = build_test_unit_ready(&mut cdb, 0);
    ScsiCommand::from_cdb(cdb, len, DataBuffer::None, 0)
}
