//! This module defines sense data: the fixed-format parser, the
//! key/ASC/ASCQ triple stored on a unit, and the ASC/ASCQ description table.

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{collections::HashMap, fmt};

use once_cell::sync::Lazy;

use crate::models::sense::asc_ascq::ASC_ASCQ;

mod asc_ascq;
/// Fixed-format sense parsing and encoding.
pub mod sense_data;

/// Represents an entry in the ASC/ASCQ table.
pub struct Entry {
    code: u16,
    desc: &'static str,
}

impl Entry {
    /// Looks up the description for a given ASC/ASCQ code.
    #[inline]
    pub fn lookup(asc: u8, ascq: u8) -> Option<&'static str> {
        let k = ((asc as u16) << 8) | (ascq as u16);
        ASC_ASCQ_MAP.get(&k).copied()
    }
}

static ASC_ASCQ_MAP: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    let mut m: HashMap<u16, &'static str> = HashMap::with_capacity(ASC_ASCQ.len());
    for e in ASC_ASCQ {
        m.entry(e.code).or_insert(e.desc);
    }
    m
});

/// Return the SPC-4 description for a given ASC/ASCQ pair.
///
/// * If the pair is not present in the table, returns `"UNSPECIFIED /
///   vendor specific"`.
#[inline]
pub fn asc_ascq_to_str(asc: u8, ascq: u8) -> &'static str {
    Entry::lookup(asc, ascq).unwrap_or("UNSPECIFIED / vendor specific")
}

/// SPC-4 sense keys (low nibble of fixed-format byte 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SenseKey {
    NoSense,
    RecoveredError,
    NotReady,
    MediumError,
    HardwareError,
    IllegalRequest,
    UnitAttention,
    DataProtect,
    BlankCheck,
    VendorSpecific,
    CopyAborted,
    AbortedCommand,
    VolumeOverflow,
    Miscompare,
    Completed,
    Reserved(u8),
}

impl From<u8> for SenseKey {
    fn from(v: u8) -> Self {
        use SenseKey::*;
        match v & 0x0F {
            0x0 => NoSense,
            0x1 => RecoveredError,
            0x2 => NotReady,
            0x3 => MediumError,
            0x4 => HardwareError,
            0x5 => IllegalRequest,
            0x6 => UnitAttention,
            0x7 => DataProtect,
            0x8 => BlankCheck,
            0x9 => VendorSpecific,
            0xA => CopyAborted,
            0xB => AbortedCommand,
            0xD => VolumeOverflow,
            0xE => Miscompare,
            0xF => Completed,
            r => Reserved(r),
        }
    }
}

impl From<SenseKey> for u8 {
    fn from(k: SenseKey) -> u8 {
        use SenseKey::*;
        match k {
            NoSense => 0x0,
            RecoveredError => 0x1,
            NotReady => 0x2,
            MediumError => 0x3,
            HardwareError => 0x4,
            IllegalRequest => 0x5,
            UnitAttention => 0x6,
            DataProtect => 0x7,
            BlankCheck => 0x8,
            VendorSpecific => 0x9,
            CopyAborted => 0xA,
            AbortedCommand => 0xB,
            VolumeOverflow => 0xD,
            Miscompare => 0xE,
            Completed => 0xF,
            Reserved(r) => r & 0x0F,
        }
    }
}

/// Last sense information recorded on a unit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SenseTriple {
    pub key: u8,
    pub asc: u8,
    pub ascq: u8,
}

impl SenseTriple {
    #[inline]
    pub fn sense_key(&self) -> SenseKey {
        SenseKey::from(self.key)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    #[inline]
    pub fn description(&self) -> &'static str {
        asc_ascq_to_str(self.asc, self.ascq)
    }
}

impl fmt::Display for SenseTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} asc={:#04x} ascq={:#04x}: {}",
            self.sense_key(),
            self.asc,
            self.ascq,
            self.description()
        )
    }
}
