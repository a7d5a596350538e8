// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use tracing::{debug, trace, warn};

use crate::{
    bus::interface::HostInterface,
    control_block::common::opcode_name,
    error::{ScsiError, ScsiResult},
    handlers::status::map_status,
    models::{
        command::{common::CommandFlags, request::ScsiCommand},
        sense::SenseTriple,
    },
    unit::unit::Unit,
    utils::hex_prefix,
};

/// Submits `cmd` to the host on behalf of `unit` and maps the outcome.
///
/// Target and LUN come from the unit, a zero timeout becomes the unit's
/// default and autosense is always requested. Completion fields of the
/// command and the unit's sense triple are cleared before submission.
/// Without a host interface the command fails with
/// [`ScsiError::Configuration`] and never reaches a backend.
pub fn perform_command(
    unit: &mut Unit,
    host: Option<&mut HostInterface>,
    cmd: &mut ScsiCommand<'_>,
) -> ScsiResult<()> {
    cmd.target = unit.target();
    cmd.lun = unit.lun();
    if cmd.timeout_ms == 0 {
        cmd.timeout_ms = unit.default_timeout_ms;
    }
    cmd.flags |= CommandFlags::AUTOSENSE;
    cmd.reset_completion();
    unit.sense = SenseTriple::default();
    unit.last_actual = 0;

    let Some(host) = host else {
        warn!(unit = unit.number(), "no host interface, {} dropped", opcode_name(cmd.opcode()));
        return Err(ScsiError::Configuration);
    };

    debug!(
        unit = unit.number(),
        cdb = %hex::encode(cmd.cdb()),
        len = cmd.data_length,
        "submit {}",
        opcode_name(cmd.opcode())
    );
    if let Some(out) = cmd.data_out() {
        trace!(unit = unit.number(), data = %hex_prefix(out, 16), "data-out");
    }

    if !host.submit(cmd) {
        warn!(unit = unit.number(), "{} transport failure", opcode_name(cmd.opcode()));
        return Err(ScsiError::ProtocolPhase);
    }

    map_status(unit, cmd)?;
    unit.last_actual = cmd.actual_length;
    Ok(())
}
