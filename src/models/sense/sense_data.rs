// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt;

use anyhow::{Context, Result, anyhow};

use crate::models::sense::{SenseKey, SenseTriple, asc_ascq_to_str};

/// Sense data must be ≥ 18 bytes for fixed format.
pub const FIXED_MIN_LEN: usize = 18;
/// Shortest buffer that still carries sense key, ASC and ASCQ.
pub const TRIPLE_MIN_LEN: usize = 14;

/// Fixed-format response codes (current / deferred errors).
pub const RESPONSE_CODE_CURRENT: u8 = 0x70;
pub const RESPONSE_CODE_DEFERRED: u8 = 0x71;

/// SPC-4 Table 43 — Fixed format sense-data byte layout
#[repr(C)]
#[derive(Default, PartialEq)]
pub struct SenseData {
    pub valid: bool,        // bit7 of byte0
    pub response_code: u8,  // low-7 bits of byte0
    pub sense_key: u8,      // low-4 bits of byte2
    pub ili: bool,          // bit5 of byte2
    pub eom: bool,          // bit6 of byte2
    pub filemark: bool,     // bit7 of byte2
    pub information: u32,   // bytes 3-6
    pub additional_len: u8, // byte7
    pub cmd_specific: u32,  // bytes 8-11
    pub asc: u8,            // Additional Sense Code
    pub ascq: u8,           // Additional Sense Code Qualifier
}

impl SenseData {
    /// Parse *fixed-format* sense-data (SPC-4 § 4.5.3).
    ///
    /// The buffer must be at least 18 bytes long.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < FIXED_MIN_LEN {
            return Err(anyhow!(
                "sense buffer too small: {} < {FIXED_MIN_LEN}",
                buf.len()
            ));
        }

        let valid = buf[0] & 0x80 != 0;
        let response_code = buf[0] & 0x7F;
        let filemark = buf[2] & 0x80 != 0;
        let eom = buf[2] & 0x40 != 0;
        let ili = buf[2] & 0x20 != 0;
        let sense_key = buf[2] & 0x0F;

        let information = u32::from_be_bytes(
            buf[3..7]
                .try_into()
                .context("failed to read Information field (bytes 3‥6)")?,
        );

        let additional_len = buf[7];

        let cmd_specific = u32::from_be_bytes(
            buf[8..12]
                .try_into()
                .context("failed to read Cmd-specific field (bytes 8‥11)")?,
        );

        Ok(Self {
            valid,
            response_code,
            sense_key,
            ili,
            eom,
            filemark,
            information,
            additional_len,
            cmd_specific,
            asc: buf[12],
            ascq: buf[13],
        })
    }

    #[inline]
    pub fn triple(&self) -> SenseTriple {
        SenseTriple {
            key: self.sense_key,
            asc: self.asc,
            ascq: self.ascq,
        }
    }

    #[inline]
    pub fn is_deferred(&self) -> bool {
        self.response_code == RESPONSE_CODE_DEFERRED
    }
}

/// Pull the key/ASC/ASCQ triple out of a fixed-format sense buffer.
///
/// Returns `None` when fewer than [`TRIPLE_MIN_LEN`] bytes are available.
#[inline]
pub fn extract_triple(buf: &[u8]) -> Option<SenseTriple> {
    if buf.len() < TRIPLE_MIN_LEN {
        return None;
    }
    Some(SenseTriple {
        key: buf[2] & 0x0F,
        asc: buf[12],
        ascq: buf[13],
    })
}

/// Encode a minimal 18-byte fixed-format sense buffer (current error).
pub fn build_fixed_sense(key: SenseKey, asc: u8, ascq: u8) -> [u8; FIXED_MIN_LEN] {
    let mut b = [0u8; FIXED_MIN_LEN];
    b[0] = RESPONSE_CODE_CURRENT;
    b[2] = u8::from(key) & 0x0F;
    b[7] = (FIXED_MIN_LEN - 8) as u8; // additional sense length
    b[12] = asc;
    b[13] = ascq;
    b
}

impl fmt::Debug for SenseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SenseData")
            .field("valid", &self.valid)
            .field(
                "response_code",
                &format_args!("{:#04x}", self.response_code),
            )
            .field("sense_key", &SenseKey::from(self.sense_key))
            .field("filemark", &self.filemark)
            .field("eom", &self.eom)
            .field("ili", &self.ili)
            .field("information", &self.information)
            .field("additional_len", &self.additional_len)
            .field("cmd_specific", &self.cmd_specific)
            .field("asc", &format_args!("{:#04x}", self.asc))
            .field("ascq", &format_args!("{:#04x}", self.ascq))
            .field("description", &asc_ascq_to_str(self.asc, self.ascq))
            .finish()
    }
}
