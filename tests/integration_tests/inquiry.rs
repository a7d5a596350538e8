// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::{Context, Result};
use scsi_bus_rs::{
    control_block::{
        inquiry,
        inquiry::{
            VpdPage, fill_inquiry_vpd, parse_inquiry_standard, parse_vpd_supported_pages,
            parse_vpd_unit_serial,
        },
    },
    error::ScsiError,
    models::{
        command::request::{DataBuffer, ScsiCommand},
        sense::SenseKey,
    },
};

use crate::integration_tests::common::scanned_bus;

#[test]
fn standard_inquiry_is_cached_on_unit() -> Result<()> {
    let (bus, _disk, md) = scanned_bus()?;
    let unit = bus.unit(md.target, md.lun).context("unit")?;

    let id = parse_inquiry_standard(unit.inquiry_data())?;
    assert_eq!(id.device_type, 0x00);
    assert!(!id.rmb);
    assert_eq!(id.vendor_id, "SCSIBUS");
    assert_eq!(id.product_id, "MEM DISK");
    assert_eq!(id.product_rev, "0008");
    Ok(())
}

#[test]
fn vpd_pages_via_direct_scsi() -> Result<()> {
    let (mut bus, _disk, md) = scanned_bus()?;
    let mut h = bus.unit_handle(md.target, md.lun).context("unit")?;

    let mut buf = [0u8; 64];
    let mut cdb = [0u8; 16];
    let len = fill_inquiry_vpd(&mut cdb, VpdPage::SupportedPages, 64);
    let mut cmd = ScsiCommand::from_cdb(cdb, len, DataBuffer::In(&mut buf), 64)?;
    h.direct_scsi(&mut cmd)?;
    let n = cmd.actual_length as usize;
    assert_eq!(parse_vpd_supported_pages(&buf[..n])?, vec![0x00, 0x80]);

    let mut buf = [0u8; 64];
    let mut cmd = inquiry(VpdPage::UnitSerial.into(), &mut buf)?;
    h.direct_scsi(&mut cmd)?;
    let n = cmd.actual_length as usize;
    let serial = parse_vpd_unit_serial(&buf[..n])?;
    assert_eq!(serial, format!("MD{:02X}{:02X}", md.target, md.lun));
    Ok(())
}

#[test]
fn unknown_vpd_page_is_illegal_request() -> Result<()> {
    let (mut bus, _disk, md) = scanned_bus()?;
    let mut h = bus.unit_handle(md.target, md.lun).context("unit")?;

    let mut buf = [0u8; 32];
    let mut cmd = inquiry(0xB0, &mut buf)?;
    let err = h.direct_scsi(&mut cmd).expect_err("page not supported");
    let sense = err.sense().context("sense expected")?;
    assert!(matches!(err, ScsiError::DeviceCheckCondition { .. }));
    assert_eq!(sense.sense_key(), SenseKey::IllegalRequest);
    assert_eq!(sense.asc, 0x24);
    Ok(())
}
