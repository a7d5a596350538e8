// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use tracing::{debug, warn};

use crate::{
    error::{ScsiError, ScsiResult},
    models::{
        command::{common::ScsiStatus, request::ScsiCommand},
        sense::sense_data::{SenseData, extract_triple},
    },
    unit::unit::Unit,
};

/// Translates the status of a completed command into a result.
///
/// On CHECK CONDITION with at least 14 sense bytes the sense key, ASC and
/// ASCQ are written onto `unit`; shorter sense leaves the unit's (already
/// zeroed) triple untouched.
pub fn map_status(unit: &mut Unit, cmd: &ScsiCommand<'_>) -> ScsiResult<()> {
    match ScsiStatus::from(cmd.status) {
        ScsiStatus::Good | ScsiStatus::Intermediate => Ok(()),
        ScsiStatus::CheckCondition => {
            let sense = extract_triple(cmd.sense());
            if let Some(triple) = sense {
                unit.sense = triple;
            }
            match SenseData::parse(cmd.sense()) {
                Ok(full) => debug!(
                    unit = unit.number(),
                    deferred = full.is_deferred(),
                    information = full.information,
                    "CHECK CONDITION: {}",
                    full.triple()
                ),
                Err(_) => debug!(
                    unit = unit.number(),
                    sense = %hex::encode(cmd.sense()),
                    "CHECK CONDITION: {:?}",
                    sense
                ),
            }
            Err(ScsiError::DeviceCheckCondition { sense })
        },
        ScsiStatus::Busy => Err(ScsiError::DeviceBusy),
        other => {
            warn!(unit = unit.number(), "unexpected SCSI status {:?}", other);
            Err(ScsiError::ProtocolPhase)
        },
    }
}
