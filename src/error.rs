// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use thiserror::Error;

use crate::models::sense::SenseTriple;

/// Outcome of a command that did not complete with GOOD status.
///
/// None of these are retried inside the crate; every variant carries the
/// state a caller needs to pick its own policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScsiError {
    /// The bus has no host capability set; nothing reached the hardware.
    #[error("bus has no host interface installed")]
    Configuration,
    /// `submit()` failed at the transport level, or the target returned a
    /// status byte this layer does not recognise.
    #[error("transport or protocol phase error")]
    ProtocolPhase,
    /// Target answered BUSY.
    #[error("device busy")]
    DeviceBusy,
    /// Target answered CHECK CONDITION. `sense` is present only when the
    /// backend returned at least 14 sense bytes.
    #[error("check condition{}", sense_suffix(.sense))]
    DeviceCheckCondition { sense: Option<SenseTriple> },
    /// The unit has not been configured by discovery.
    #[error("operation not supported by unit")]
    Unsupported,
    /// Caller-side argument error caught before submission.
    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),
}

fn sense_suffix(sense: &Option<SenseTriple>) -> String {
    match sense {
        Some(s) => format!(" ({s})"),
        None => String::new(),
    }
}

impl ScsiError {
    /// BUSY is the only condition a caller can reasonably retry blind.
    #[inline]
    pub fn is_busy(&self) -> bool {
        matches!(self, ScsiError::DeviceBusy)
    }

    #[inline]
    pub fn sense(&self) -> Option<SenseTriple> {
        match self {
            ScsiError::DeviceCheckCondition { sense } => *sense,
            _ => None,
        }
    }
}

pub type ScsiResult<T> = Result<T, ScsiError>;
