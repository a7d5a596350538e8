// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use hex_literal::hex;
use scsi_bus_rs::{
    control_block::{
        common::{SA_READ_CAPACITY_16, SYNCHRONIZE_CACHE_10, TEST_UNIT_READY},
        inquiry, read_capacity,
        read_capacity::{parse_read_capacity10_zerocopy, parse_read_capacity16_zerocopy},
        read_write,
        read_write::{build_rw10, build_rw16},
        request_sense, synchronize_cache, test_unit_ready,
    },
    error::ScsiError,
    models::command::{common::DataDirection, request::DataBuffer},
};

use crate::unit_tests::common::load_fixture;

#[test]
fn test_read10_layout() -> Result<()> {
    let expected = load_fixture("tests/unit_tests/fixtures/cdb/read10.hex")?;

    let mut buf = vec![0u8; 0x0102 * 512];
    let cmd = read_write(0x1234_5678, 0x0102, 512, DataBuffer::In(&mut buf), false, false)?;

    assert_eq!(cmd.cdb(), &expected[..]);
    assert_eq!(cmd.data_length, 0x0102 * 512);
    assert_eq!(cmd.direction(), DataDirection::In);

    let cdb = cmd.cdb();
    assert_eq!(u32::from_be_bytes([cdb[2], cdb[3], cdb[4], cdb[5]]), 0x1234_5678);
    assert_eq!(u16::from_be_bytes([cdb[7], cdb[8]]), 0x0102);
    Ok(())
}

#[test]
fn test_write16_layout() -> Result<()> {
    let expected = load_fixture("tests/unit_tests/fixtures/cdb/write16.hex")?;

    let data = vec![0xA5u8; 0x0001_0000 * 4];
    let cmd = read_write(0x1_2345_6789, 0x0001_0000, 4, DataBuffer::Out(&data), true, true)?;

    assert_eq!(cmd.cdb(), &expected[..]);
    assert_eq!(cmd.cdb().len(), 16);
    assert_eq!(cmd.direction(), DataDirection::Out);
    assert_eq!(cmd.data_length, 0x0004_0000);
    Ok(())
}

fn decode10(cdb: &[u8]) -> (u64, u32) {
    (
        u32::from_be_bytes([cdb[2], cdb[3], cdb[4], cdb[5]]) as u64,
        u16::from_be_bytes([cdb[7], cdb[8]]) as u32,
    )
}

fn decode16(cdb: &[u8]) -> (u64, u32) {
    let mut lba = [0u8; 8];
    lba.copy_from_slice(&cdb[2..10]);
    (
        u64::from_be_bytes(lba),
        u32::from_be_bytes([cdb[10], cdb[11], cdb[12], cdb[13]]),
    )
}

#[test]
fn test_rw_boundary_values_decode_back() -> Result<()> {
    let mut buf = vec![0u8; u16::MAX as usize];
    for lba in [0u64, 1, u32::MAX as u64] {
        for count in [1u32, 2, u16::MAX as u32] {
            let cmd = read_write(lba, count, 1, DataBuffer::In(&mut buf), false, false)?;
            assert_eq!(cmd.cdb().len(), 10);
            assert_eq!(decode10(cmd.cdb()), (lba, count), "10-byte {lba:#x}/{count}");
        }
    }
    for lba in [0u64, u32::MAX as u64 + 1, u64::MAX] {
        for count in [1u32, u16::MAX as u32 + 1] {
            let data = vec![0u8; count as usize];
            let cmd = read_write(lba, count, 1, DataBuffer::Out(&data), true, true)?;
            assert_eq!(cmd.cdb().len(), 16);
            assert_eq!(decode16(cmd.cdb()), (lba, count), "16-byte {lba:#x}/{count}");
        }
    }

    // Counts too large to back with a buffer go through the raw fillers.
    let mut cdb = [0u8; 16];
    for (lba, count) in [(0u32, u16::MAX), (u32::MAX, 1), (u32::MAX, u16::MAX)] {
        let n = build_rw10(&mut cdb, true, lba, count, 0, 0);
        assert_eq!(decode10(&cdb[..n]), (lba as u64, count as u32));
    }
    for (lba, count) in [(0u64, u32::MAX), (u64::MAX, 1), (u64::MAX, u32::MAX)] {
        let n = build_rw16(&mut cdb, false, lba, count, 0, 0);
        assert_eq!(decode16(&cdb[..n]), (lba, count));
    }
    Ok(())
}

#[test]
fn test_rw10_rejects_wide_lba_and_count() {
    let mut buf = vec![0u8; 512];
    let err = read_write(1 << 32, 1, 512, DataBuffer::In(&mut buf), false, false)
        .err()
        .expect("LBA over 32 bits");
    assert!(matches!(err, ScsiError::InvalidRequest(_)));

    let data = vec![0u8; 0x1_0000];
    let err = read_write(0, 0x1_0000, 1, DataBuffer::Out(&data), true, false)
        .err()
        .expect("count over 16 bits");
    assert!(matches!(err, ScsiError::InvalidRequest(_)));
}

#[test]
fn test_rw_rejects_short_buffer_and_overflow() {
    let mut buf = vec![0u8; 511];
    assert!(read_write(0, 1, 512, DataBuffer::In(&mut buf), false, true).is_err());

    let mut buf = vec![0u8; 16];
    let err = read_write(0, u32::MAX, 2, DataBuffer::In(&mut buf), false, true)
        .err()
        .expect("overflow");
    assert!(matches!(err, ScsiError::InvalidRequest(_)));
}

#[test]
fn test_inquiry_standard_and_vpd() -> Result<()> {
    let mut buf = [0u8; 96];
    let cmd = inquiry(0, &mut buf)?;
    assert_eq!(cmd.cdb(), &hex!("12 00 00 00 60 00"));
    assert_eq!(cmd.data_length, 96);

    let expected = load_fixture("tests/unit_tests/fixtures/cdb/inquiry_vpd80.hex")?;
    let mut buf = [0u8; 255];
    let cmd = inquiry(0x80, &mut buf)?;
    assert_eq!(cmd.cdb(), &expected[..]);
    assert_eq!(cmd.cdb()[1] & 0x01, 0x01, "EVPD must be set for a VPD page");

    let mut big = [0u8; 256];
    assert!(inquiry(0, &mut big).is_err());
    Ok(())
}

#[test]
fn test_read_capacity_forms() -> Result<()> {
    let expected = load_fixture("tests/unit_tests/fixtures/cdb/read_capacity16.hex")?;
    let mut buf = [0u8; 32];
    let cmd = read_capacity(SA_READ_CAPACITY_16, &mut buf)?;
    assert_eq!(cmd.cdb(), &expected[..]);
    assert_eq!(u32::from_be_bytes([0, 0, 0, cmd.cdb()[13]]), 32);

    let mut buf = [0u8; 8];
    let cmd = read_capacity(0, &mut buf)?;
    assert_eq!(cmd.cdb(), &hex!("25 00 00 00 00 00 00 00 00 00"));
    assert_eq!(cmd.data_length, 8);
    Ok(())
}

#[test]
fn test_parameterless_commands() -> Result<()> {
    let tur = test_unit_ready()?;
    assert_eq!(tur.cdb(), &[TEST_UNIT_READY, 0, 0, 0, 0, 0]);
    assert_eq!(tur.direction(), DataDirection::None);
    assert_eq!(tur.data_length, 0);

    let sync = synchronize_cache()?;
    assert_eq!(sync.cdb().len(), 10);
    assert_eq!(sync.opcode(), SYNCHRONIZE_CACHE_10);
    assert_eq!(sync.direction(), DataDirection::None);

    let mut sense = [0u8; 18];
    let rs = request_sense(&mut sense)?;
    assert_eq!(rs.cdb(), &hex!("03 00 00 00 12 00"));
    Ok(())
}

#[test]
fn test_parse_read_capacity_payloads() -> Result<()> {
    let rc10 = hex!("00 00 03 e7 00 00 08 00");
    let cap = parse_read_capacity10_zerocopy(&rc10)?.capacity();
    assert_eq!(cap.blocks, 1000);
    assert_eq!(cap.block_size, 2048);

    let rc16 = hex!(
        "00 00 00 00 00 00 00 1f 00 00 02 00 00 00 00 00
         00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00"
    );
    let cap = parse_read_capacity16_zerocopy(&rc16)?.capacity();
    assert_eq!(cap.blocks, 32);
    assert_eq!(cap.block_size, 512);

    assert!(parse_read_capacity10_zerocopy(&rc10[..7]).is_err());
    Ok(())
}
