// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Operation codes and CDB lengths used by this crate (SPC-4 / SBC-3).

pub const TEST_UNIT_READY: u8 = 0x00;
pub const REQUEST_SENSE: u8 = 0x03;
pub const INQUIRY: u8 = 0x12;
pub const READ_CAPACITY_10: u8 = 0x25;
pub const READ_10: u8 = 0x28;
pub const WRITE_10: u8 = 0x2A;
pub const SYNCHRONIZE_CACHE_10: u8 = 0x35;
pub const READ_16: u8 = 0x88;
pub const WRITE_16: u8 = 0x8A;
pub const SERVICE_ACTION_IN_16: u8 = 0x9E;

/// SERVICE ACTION IN(16) service action selecting READ CAPACITY(16).
pub const SA_READ_CAPACITY_16: u8 = 0x10;

pub const CDB6_LEN: usize = 6;
pub const CDB10_LEN: usize = 10;
pub const CDB16_LEN: usize = 16;

/// Peripheral device type of a direct-access block device (disk).
pub const DEVICE_TYPE_DIRECT_ACCESS: u8 = 0x00;
pub const DEVICE_TYPE_CDROM: u8 = 0x05;

/// Human-readable name for a CDB opcode, for logs.
pub fn opcode_name(op: u8) -> &'static str {
    match op {
        TEST_UNIT_READY => "TEST UNIT READY",
        REQUEST_SENSE => "REQUEST SENSE",
        INQUIRY => "INQUIRY",
        READ_CAPACITY_10 => "READ CAPACITY(10)",
        READ_10 => "READ(10)",
        WRITE_10 => "WRITE(10)",
        SYNCHRONIZE_CACHE_10 => "SYNCHRONIZE CACHE(10)",
        READ_16 => "READ(16)",
        WRITE_16 => "WRITE(16)",
        SERVICE_ACTION_IN_16 => "SERVICE ACTION IN(16)",
        _ => "UNKNOWN",
    }
}
