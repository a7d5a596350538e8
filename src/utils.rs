// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Packs a unit address into the number reported by
/// [`Unit::number`](crate::unit::unit::Unit::number):
/// `bus << 8 | target << 4 | lun`.
///
/// Target and LUN are masked to their nibble.
#[inline]
pub fn unit_number(bus: u8, target: u8, lun: u8) -> u32 {
    ((bus as u32) << 8) | (((target & 0x0F) as u32) << 4) | (lun & 0x0F) as u32
}

/// Hex dump of the first `max` bytes, for trace logs.
pub fn hex_prefix(bytes: &[u8], max: usize) -> String {
    let n = bytes.len().min(max);
    let mut s = hex::encode(&bytes[..n]);
    if bytes.len() > n {
        s.push_str("..");
    }
    s
}
