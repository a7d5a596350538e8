// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use scsi_bus_rs::{
    error::ScsiError,
    handlers::status::map_status,
    models::{
        command::{
            common::ScsiStatus,
            request::{DataBuffer, ScsiCommand},
        },
        sense::{SenseKey, SenseTriple},
    },
    unit::unit::Unit,
};

use crate::unit_tests::common::fixed_sense;

fn completed(status: u8, sense: &[u8]) -> ScsiCommand<'static> {
    let mut cmd = ScsiCommand::from_cdb_bytes(&[0x28, 0, 0, 0, 0, 0, 0, 0, 1, 0], DataBuffer::None, 0)
        .expect("WTF");
    cmd.status = status;
    cmd.set_sense(sense);
    cmd
}

#[test]
fn test_good_and_intermediate_succeed() {
    let mut unit = Unit::new(0, 0, 0);
    assert!(map_status(&mut unit, &completed(ScsiStatus::GOOD, &[])).is_ok());
    assert!(map_status(&mut unit, &completed(ScsiStatus::INTERMEDIATE, &[])).is_ok());
    assert!(unit.sense().is_zero());
}

#[test]
fn test_check_condition_with_full_sense() {
    let mut unit = Unit::new(0, 0, 0);
    let cmd = completed(ScsiStatus::CHECK_CONDITION, &fixed_sense(0x05, 0x21, 0x00));

    let err = map_status(&mut unit, &cmd).expect_err("CHECK CONDITION");
    let expected = SenseTriple {
        key: 0x05,
        asc: 0x21,
        ascq: 0x00,
    };
    assert_eq!(err, ScsiError::DeviceCheckCondition {
        sense: Some(expected)
    });
    assert_eq!(err.sense(), Some(expected));
    assert_eq!(unit.sense(), expected);
    assert_eq!(unit.sense().sense_key(), SenseKey::IllegalRequest);
}

#[test]
fn test_check_condition_with_fourteen_byte_sense() {
    let mut unit = Unit::new(0, 0, 0);
    let sense = fixed_sense(0x06, 0x29, 0x00);
    let cmd = completed(ScsiStatus::CHECK_CONDITION, &sense[..14]);

    let err = map_status(&mut unit, &cmd).expect_err("CHECK CONDITION");
    assert_eq!(err.sense().map(|s| s.asc), Some(0x29));
    assert_eq!(unit.sense().key, 0x06);
}

#[test]
fn test_check_condition_without_sense() {
    let mut unit = Unit::new(0, 0, 0);
    let cmd = completed(ScsiStatus::CHECK_CONDITION, &[]);
    assert_eq!(
        map_status(&mut unit, &cmd),
        Err(ScsiError::DeviceCheckCondition { sense: None })
    );
    assert!(unit.sense().is_zero());
}

#[test]
fn test_busy_is_distinguishable() {
    let mut unit = Unit::new(0, 0, 0);
    let err = map_status(&mut unit, &completed(ScsiStatus::BUSY, &[])).expect_err("BUSY");
    assert_eq!(err, ScsiError::DeviceBusy);
    assert!(err.is_busy());
}

#[test]
fn test_unrecognised_statuses_are_phase_errors() {
    let mut unit = Unit::new(0, 0, 0);
    for status in [
        ScsiStatus::RESERVATION_CONFLICT,
        ScsiStatus::TASK_SET_FULL,
        ScsiStatus::TASK_ABORTED,
        0x7F,
    ] {
        assert_eq!(
            map_status(&mut unit, &completed(status, &[])),
            Err(ScsiError::ProtocolPhase),
            "status {status:#04x}"
        );
    }
}
