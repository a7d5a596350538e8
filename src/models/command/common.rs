// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt;

bitflags::bitflags! {
    #[derive(Default, Clone, Copy, PartialEq, Eq)]
    /// Per-command submission flags understood by host backends.
    pub struct CommandFlags: u8 {
        /// Backend must collect sense data on CHECK CONDITION.
        const AUTOSENSE = 1 << 0;
        const TAGGED    = 1 << 1;
        /// Backend should complete the command by polling, not interrupts.
        const POLL      = 1 << 2;
        const ORDERED   = 1 << 3;
        /// Suppress backend diagnostics for expected failures (probing).
        const QUIET     = 1 << 4;
    }
}

impl fmt::Debug for CommandFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CommandFlags as F;

        write!(f, "CommandFlags(")?;

        let mut sep = "";
        for (flag, name) in [
            (F::AUTOSENSE, "AUTOSENSE"),
            (F::TAGGED, "TAGGED"),
            (F::POLL, "POLL"),
            (F::ORDERED, "ORDERED"),
            (F::QUIET, "QUIET"),
        ] {
            if self.contains(flag) {
                write!(f, "{sep}{name}")?;
                sep = "|";
            }
        }

        write!(f, ")")
    }
}

/// Expected data phase of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataDirection {
    #[default]
    None,
    /// Device to host (reads, INQUIRY, READ CAPACITY).
    In,
    /// Host to device (writes).
    Out,
    Bidirectional,
}

/// The 1-byte SCSI status returned by a target (SAM-5 § 5.3)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScsiStatus {
    Good,
    CheckCondition,
    ConditionMet,
    Busy,
    /// Obsolete in SAM-4 but still reported by older linked-command targets.
    Intermediate,
    IntermediateConditionMet,
    ReservationConflict,
    TaskSetFull,
    AcaActive,
    TaskAborted,
    /// Any other status codes defined in SAM-x or reserved
    Other(u8),
}

impl ScsiStatus {
    pub const GOOD: u8 = 0x00;
    pub const CHECK_CONDITION: u8 = 0x02;
    pub const CONDITION_MET: u8 = 0x04;
    pub const BUSY: u8 = 0x08;
    pub const INTERMEDIATE: u8 = 0x10;
    pub const INTERMEDIATE_CONDITION_MET: u8 = 0x14;
    pub const RESERVATION_CONFLICT: u8 = 0x18;
    pub const TASK_SET_FULL: u8 = 0x28;
    pub const ACA_ACTIVE: u8 = 0x30;
    pub const TASK_ABORTED: u8 = 0x40;
}

impl From<u8> for ScsiStatus {
    fn from(b: u8) -> Self {
        match b {
            Self::GOOD => ScsiStatus::Good,
            Self::CHECK_CONDITION => ScsiStatus::CheckCondition,
            Self::CONDITION_MET => ScsiStatus::ConditionMet,
            Self::BUSY => ScsiStatus::Busy,
            Self::INTERMEDIATE => ScsiStatus::Intermediate,
            Self::INTERMEDIATE_CONDITION_MET => ScsiStatus::IntermediateConditionMet,
            Self::RESERVATION_CONFLICT => ScsiStatus::ReservationConflict,
            Self::TASK_SET_FULL => ScsiStatus::TaskSetFull,
            Self::ACA_ACTIVE => ScsiStatus::AcaActive,
            Self::TASK_ABORTED => ScsiStatus::TaskAborted,
            other => ScsiStatus::Other(other),
        }
    }
}

impl From<ScsiStatus> for u8 {
    fn from(value: ScsiStatus) -> Self {
        match value {
            ScsiStatus::Good => ScsiStatus::GOOD,
            ScsiStatus::CheckCondition => ScsiStatus::CHECK_CONDITION,
            ScsiStatus::ConditionMet => ScsiStatus::CONDITION_MET,
            ScsiStatus::Busy => ScsiStatus::BUSY,
            ScsiStatus::Intermediate => ScsiStatus::INTERMEDIATE,
            ScsiStatus::IntermediateConditionMet => {
                ScsiStatus::INTERMEDIATE_CONDITION_MET
            },
            ScsiStatus::ReservationConflict => ScsiStatus::RESERVATION_CONFLICT,
            ScsiStatus::TaskSetFull => ScsiStatus::TASK_SET_FULL,
            ScsiStatus::AcaActive => ScsiStatus::ACA_ACTIVE,
            ScsiStatus::TaskAborted => ScsiStatus::TASK_ABORTED,
            ScsiStatus::Other(v) => v,
        }
    }
}
