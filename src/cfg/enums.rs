// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::control_block::common::{DEVICE_TYPE_CDROM, DEVICE_TYPE_DIRECT_ACCESS};

/// Boolean enumeration with string serialization support
///
/// Represents yes/no values with support for various string representations
/// including "Yes"/"No", "true"/"false", and "1"/"0".
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YesNo {
    #[serde(
        rename = "Yes",
        alias = "yes",
        alias = "YES",
        alias = "true",
        alias = "True",
        alias = "1"
    )]
    Yes,
    #[default]
    #[serde(
        rename = "No",
        alias = "no",
        alias = "NO",
        alias = "false",
        alias = "False",
        alias = "0"
    )]
    No,
}
impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        })
    }
}
impl From<bool> for YesNo {
    fn from(b: bool) -> Self {
        if b { YesNo::Yes } else { YesNo::No }
    }
}
impl YesNo {
    pub fn as_bool(self) -> bool {
        matches!(self, YesNo::Yes)
    }
}

/// Peripheral device type reported by a configured target.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceType {
    #[default]
    #[serde(rename = "DirectAccess", alias = "disk", alias = "Disk")]
    DirectAccess,
    #[serde(rename = "CdRom", alias = "cdrom", alias = "CD")]
    CdRom,
    /// Any other 5-bit peripheral device type code.
    #[serde(rename = "Code")]
    Code(u8),
}

impl DeviceType {
    pub fn code(self) -> u8 {
        match self {
            DeviceType::DirectAccess => DEVICE_TYPE_DIRECT_ACCESS,
            DeviceType::CdRom => DEVICE_TYPE_CDROM,
            DeviceType::Code(c) => c & 0x1F,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceType::DirectAccess => f.write_str("DirectAccess"),
            DeviceType::CdRom => f.write_str("CdRom"),
            DeviceType::Code(c) => write!(f, "Code({c:#04x})"),
        }
    }
}

/// Where log records go.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    Stderr,
    File,
}

/// Rotation of the log file.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    Daily,
    #[default]
    Never,
}
