// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::models::sense::Entry;

macro_rules! e {
    ($asc:literal, $ascq:literal, $desc:literal) => {
        Entry {
            code: (($asc as u16) << 8) | ($ascq as u16),
            desc: $desc,
        }
    };
}

/// Subset of the T10 ASC/ASCQ assignments seen from disks, optical drives
/// and host-adapter emulations.
pub(super) static ASC_ASCQ: &[Entry] = &[
    e!(0x00, 0x00, "No additional sense information"),
    e!(0x00, 0x06, "I/O process terminated"),
    e!(0x02, 0x00, "No seek complete"),
    e!(0x04, 0x00, "Logical unit not ready, cause not reportable"),
    e!(0x04, 0x01, "Logical unit is in process of becoming ready"),
    e!(0x04, 0x02, "Logical unit not ready, initializing command required"),
    e!(0x04, 0x03, "Logical unit not ready, manual intervention required"),
    e!(0x04, 0x04, "Logical unit not ready, format in progress"),
    e!(0x08, 0x00, "Logical unit communication failure"),
    e!(0x08, 0x01, "Logical unit communication time-out"),
    e!(0x0C, 0x00, "Write error"),
    e!(0x11, 0x00, "Unrecovered read error"),
    e!(0x14, 0x01, "Record not found"),
    e!(0x1A, 0x00, "Parameter list length error"),
    e!(0x20, 0x00, "Invalid command operation code"),
    e!(0x21, 0x00, "Logical block address out of range"),
    e!(0x24, 0x00, "Invalid field in CDB"),
    e!(0x25, 0x00, "Logical unit not supported"),
    e!(0x26, 0x00, "Invalid field in parameter list"),
    e!(0x27, 0x00, "Write protected"),
    e!(0x28, 0x00, "Not ready to ready change, medium may have changed"),
    e!(0x29, 0x00, "Power on, reset, or bus device reset occurred"),
    e!(0x29, 0x01, "Power on occurred"),
    e!(0x29, 0x02, "SCSI bus reset occurred"),
    e!(0x2A, 0x01, "Mode parameters changed"),
    e!(0x30, 0x00, "Incompatible medium installed"),
    e!(0x31, 0x00, "Medium format corrupted"),
    e!(0x3A, 0x00, "Medium not present"),
    e!(0x3A, 0x01, "Medium not present, tray closed"),
    e!(0x3A, 0x02, "Medium not present, tray open"),
    e!(0x3F, 0x0E, "Reported LUNs data has changed"),
    e!(0x40, 0x00, "Data integrity error"),
    e!(0x44, 0x00, "Internal target failure"),
    e!(0x47, 0x00, "SCSI parity error"),
    e!(0x48, 0x00, "Initiator detected error message received"),
    e!(0x49, 0x00, "Invalid message error"),
    e!(0x4E, 0x00, "Overlapped commands attempted"),
    e!(0x5D, 0x00, "Failure prediction threshold exceeded"),
];
