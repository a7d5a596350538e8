// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use scsi_bus_rs::{
    bus::interface::{HostInterface, NullCapabilities},
    control_block::{inquiry, test_unit_ready},
    error::ScsiError,
    handlers::perform_command::perform_command,
    models::command::common::CommandFlags,
    unit::unit::{DEFAULT_TIMEOUT_MS, Unit},
};

use crate::unit_tests::common::{Reply, ScriptedHost, fixed_sense, host};

#[test]
fn test_fills_addressing_timeout_and_autosense() -> Result<()> {
    let backend = ScriptedHost::new(vec![]);
    let mut iface = host(&backend);
    let mut unit = Unit::new(0, 5, 3);

    let mut cmd = test_unit_ready()?;
    perform_command(&mut unit, Some(&mut iface), &mut cmd)?;

    assert_eq!((cmd.target, cmd.lun), (5, 3));
    assert_eq!(cmd.timeout_ms, DEFAULT_TIMEOUT_MS);
    assert!(cmd.flags.contains(CommandFlags::AUTOSENSE));
    assert_eq!(cmd.retries, 0);
    assert_eq!(backend.calls(), 1);
    Ok(())
}

#[test]
fn test_caller_timeout_is_kept() -> Result<()> {
    let backend = ScriptedHost::new(vec![]);
    let mut iface = host(&backend);
    let mut unit = Unit::new(0, 0, 0).with_default_timeout(5_000);

    let mut cmd = test_unit_ready()?;
    cmd.timeout_ms = 1_234;
    perform_command(&mut unit, Some(&mut iface), &mut cmd)?;
    assert_eq!(cmd.timeout_ms, 1_234);

    let mut cmd = test_unit_ready()?;
    perform_command(&mut unit, Some(&mut iface), &mut cmd)?;
    assert_eq!(cmd.timeout_ms, 5_000);
    Ok(())
}

#[test]
fn test_stale_sense_is_cleared_between_calls() -> Result<()> {
    let backend = ScriptedHost::new(vec![
        Reply::check(&fixed_sense(0x02, 0x04, 0x01)),
        Reply::good(&[]),
    ]);
    let mut iface = host(&backend);
    let mut unit = Unit::new(0, 0, 0);

    let mut cmd = test_unit_ready()?;
    let err = perform_command(&mut unit, Some(&mut iface), &mut cmd).expect_err("CHECK");
    assert!(matches!(err, ScsiError::DeviceCheckCondition { sense: Some(_) }));
    assert_eq!((unit.sense().key, unit.sense().asc, unit.sense().ascq), (0x02, 0x04, 0x01));

    // The same command record resubmitted must not carry the old sense.
    perform_command(&mut unit, Some(&mut iface), &mut cmd)?;
    assert!(unit.sense().is_zero());
    assert!(cmd.sense().is_empty());
    assert_eq!(cmd.status, 0);
    Ok(())
}

#[test]
fn test_actual_length_is_recorded_on_unit() -> Result<()> {
    let backend = ScriptedHost::new(vec![Reply::good(&[0xAB; 40]), Reply::lost()]);
    let mut iface = host(&backend);
    let mut unit = Unit::new(0, 0, 0);

    let mut buf = [0u8; 96];
    let mut cmd = inquiry(0, &mut buf)?;
    perform_command(&mut unit, Some(&mut iface), &mut cmd)?;
    assert_eq!(cmd.actual_length, 40);
    assert_eq!(unit.last_actual(), 40);

    let err = perform_command(&mut unit, Some(&mut iface), &mut cmd).expect_err("lost");
    assert_eq!(err, ScsiError::ProtocolPhase);
    assert_eq!(cmd.actual_length, 0);
    assert_eq!(unit.last_actual(), 0);
    Ok(())
}

#[test]
fn test_without_host_nothing_is_submitted() -> Result<()> {
    let backend = ScriptedHost::new(vec![]);
    let mut unit = Unit::new(0, 0, 0);

    let mut cmd = test_unit_ready()?;
    assert_eq!(
        perform_command(&mut unit, None, &mut cmd),
        Err(ScsiError::Configuration)
    );
    assert_eq!(backend.calls(), 0);
    Ok(())
}

#[test]
fn test_null_capabilities_report_phase_error() -> Result<()> {
    let mut iface = HostInterface::new(Box::new(NullCapabilities), 64);
    let mut unit = Unit::new(0, 0, 0);

    let mut cmd = test_unit_ready()?;
    assert_eq!(
        perform_command(&mut unit, Some(&mut iface), &mut cmd),
        Err(ScsiError::ProtocolPhase)
    );
    Ok(())
}
