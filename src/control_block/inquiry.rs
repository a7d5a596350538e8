// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! INQUIRY (6) — CDB fillers that write into a provided 16-byte buffer,
//! plus parsers for the standard and VPD responses.
//!
//! CDB layout (SPC):
//!   [0] = 0x12 (INQUIRY)
//!   [1] = EVPD (bit 0); other bits reserved (CMDDT obsolete → 0)
//!   [2] = Page Code (only when EVPD=1; else 0)
//!   [3] = Subpage Code / high byte of allocation length, kept 0
//!   [4] = Allocation Length (u8)
//!   [5] = Control

use anyhow::{Result, bail};

use crate::{
    control_block::common::{CDB6_LEN, INQUIRY},
    error::{ScsiError, ScsiResult},
    models::command::request::{DataBuffer, ScsiCommand},
};

/// Size of the raw standard INQUIRY data kept per unit.
pub const INQUIRY_DATA_LEN: usize = 96;
/// Minimum standard INQUIRY response carrying vendor/product/revision.
pub const INQUIRY_STANDARD_MIN: usize = 36;

/// Common VPD page codes (subset).
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VpdPage {
    SupportedPages = 0x00,
    UnitSerial = 0x80,
    DeviceId = 0x83,
    BlockLimits = 0xB0,
}

impl From<VpdPage> for u8 {
    #[inline]
    fn from(p: VpdPage) -> u8 {
        p as u8
    }
}

/// Fill an INQUIRY CDB for `page`. Page 0 selects standard INQUIRY data
/// (EVPD=0); any other page sets EVPD.
#[inline]
pub fn fill_inquiry(cdb: &mut [u8; 16], page: u8, allocation_len: u8, control: u8) -> usize {
    cdb.fill(0);
    cdb[0] = INQUIRY;
    cdb[1] = if page != 0 { 0x01 } else { 0x00 }; // EVPD
    cdb[2] = page;
    cdb[4] = allocation_len;
    cdb[5] = control;
    CDB6_LEN
}

/// Fill a **VPD INQUIRY (EVPD=1)** CDB for a well-known page.
#[inline]
pub fn fill_inquiry_vpd(cdb: &mut [u8; 16], page: VpdPage, allocation_len: u8) -> usize {
    let len = fill_inquiry(cdb, page.into(), allocation_len, 0x00);
    // Supported Pages is page 0x00 and still needs EVPD.
    cdb[1] = 0x01;
    len
}

/// INQUIRY command reading `buf.len()` bytes (at most 255) of `page`.
pub fn inquiry(page: u8, buf: &mut [u8]) -> ScsiResult<ScsiCommand<'_>> {
    let len = u8::try_from(buf.len())
        .map_err(|_| ScsiError::InvalidRequest("INQUIRY allocation > 255"))?;
    let mut cdb = [0u8; 16];
    let cdb_len = fill_inquiry(&mut cdb, page, len, 0x00);
    ScsiCommand::from_cdb(cdb, cdb_len, DataBuffer::In(buf), len as u32)
}

/// Parsed view of standard INQUIRY data (EVPD=0).
#[derive(Debug, Clone)]
pub struct InquiryStandard {
    pub peripheral_qualifier: u8, // bits 7..5 of byte0
    pub device_type: u8,          // bits 4..0 of byte0
    pub rmb: bool,                // byte1 bit7
    pub version: u8,              // byte2
    pub response_data_format: u8, // byte3 low nibble
    pub additional_length: u8,    // byte4
    pub vendor_id: String,        // bytes 8..16
    pub product_id: String,       // bytes 16..32
    pub product_rev: String,      // bytes 32..36
}

impl InquiryStandard {
    pub fn device_type_str(&self) -> &'static str {
        device_type_str(self.device_type)
    }
}

pub fn device_type_str(device_type: u8) -> &'static str {
    match device_type {
        0x00 => "Direct-access block (disk)",
        0x01 => "Sequential-access (tape)",
        0x03 => "Processor",
        0x04 => "WORM",
        0x05 => "CD/DVD",
        0x07 => "Optical memory",
        0x08 => "Medium changer",
        0x0C => "Storage array controller",
        0x0D => "Enclosure services",
        0x0E => "RBC",
        0x1F => "Unknown / no device",
        _ => "Unknown/Reserved",
    }
}

/// Parse a Standard INQUIRY (EVPD=0) response (minimum 36 bytes).
pub fn parse_inquiry_standard(buf: &[u8]) -> Result<InquiryStandard> {
    if buf.len() < INQUIRY_STANDARD_MIN {
        bail!("INQUIRY buffer too short: {}", buf.len());
    }
    let b0 = buf[0];

    Ok(InquiryStandard {
        peripheral_qualifier: (b0 >> 5) & 0x07,
        device_type: b0 & 0x1F,
        rmb: (buf[1] & 0x80) != 0,
        version: buf[2],
        response_data_format: buf[3] & 0x0F,
        additional_length: buf[4],
        vendor_id: trim_ascii(&buf[8..16]),
        product_id: trim_ascii(&buf[16..32]),
        product_rev: trim_ascii(&buf[32..36]),
    })
}

/// Generic VPD header view: returns (page_code, payload)
fn vpd_payload(buf: &[u8]) -> Result<(u8, &[u8])> {
    if buf.len() < 4 {
        bail!("VPD buffer too short: {}", buf.len());
    }
    let page_code = buf[1];
    let len = u16::from_be_bytes([buf[2], buf[3]]) as usize;
    if buf.len() < 4 + len {
        bail!(
            "VPD truncated: header says {} bytes, have {}",
            len,
            buf.len().saturating_sub(4)
        );
    }
    Ok((page_code, &buf[4..4 + len]))
}

/// VPD 0x00 — Supported VPD Pages
pub fn parse_vpd_supported_pages(buf: &[u8]) -> Result<Vec<u8>> {
    let (pc, payload) = vpd_payload(buf)?;
    if pc != 0x00 {
        bail!("expected VPD page 0x00, got 0x{:02X}", pc);
    }
    Ok(payload.to_vec())
}

/// VPD 0x80 — Unit Serial Number (ASCII, space-padded)
pub fn parse_vpd_unit_serial(buf: &[u8]) -> Result<String> {
    let (pc, payload) = vpd_payload(buf)?;
    if pc != 0x80 {
        bail!("expected VPD page 0x80, got 0x{:02X}", pc);
    }
    Ok(trim_ascii(payload))
}

fn trim_ascii(bytes: &[u8]) -> String {
    let s: String = bytes
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { '?' })
        .collect();
    s.trim().to_string()
}
