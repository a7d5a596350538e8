// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use anyhow::Result;
use scsi_bus_rs::{
    bus::{
        attributes::{AttrValue, Attributes, BusAttribute, UnitAttribute},
        bus::{Bus, BusConfig},
        interface::BusFeatures,
    },
    unit::unit::UnitFlags,
};

use crate::unit_tests::common::{Reply, ScriptedHost, inquiry_data, rc16_data};

#[test]
fn test_bus_attributes() {
    let cfg = BusConfig {
        max_targets: 8,
        features: BusFeatures::SYNC | BusFeatures::AUTOSENSE,
        queue_depth: 16,
        ..Default::default()
    };
    let bus = Bus::new(cfg, None);

    assert_eq!(
        bus.get_attribute(BusAttribute::MaxTargets as u32, |_| None),
        Some(AttrValue::Int(8))
    );
    assert_eq!(
        bus.get_attribute(BusAttribute::MaxLuns as u32, |_| None),
        Some(AttrValue::Int(8))
    );
    assert_eq!(
        bus.get_attribute(BusAttribute::Features as u32, |_| None),
        Some(AttrValue::Int((BusFeatures::SYNC | BusFeatures::AUTOSENSE).bits() as u64))
    );
    assert_eq!(
        bus.get_attribute(BusAttribute::CommandQueueDepth as u32, |_| None),
        Some(AttrValue::Int(16))
    );

    // Not served by the bus itself: defer to the caller.
    let v = bus.get_attribute(BusAttribute::MinTransferPeriod as u32, |raw| {
        Some(AttrValue::Int(raw as u64 & 0xFF))
    });
    assert_eq!(v, Some(AttrValue::Int(6)));
    assert_eq!(bus.get_attribute(0xDEAD_BEEF, |_| None), None);
}

#[test]
fn test_unit_attributes_after_discovery() -> Result<()> {
    let backend = ScriptedHost::new(vec![
        Reply::good(&inquiry_data(0x00, true)),
        Reply::good(&rc16_data(2047, 4096)),
    ]);
    let cfg = BusConfig {
        max_targets: 1,
        max_luns: 1,
        ..Default::default()
    };
    let mut bus = Bus::new(cfg, Some(Box::new(backend.clone())));
    bus.discover(0, 0)?;
    let unit = bus.unit(0, 0).expect("WTF");

    let int = |id: UnitAttribute| unit.get_attribute(id as u32, |_| None);
    assert_eq!(int(UnitAttribute::TargetId), Some(AttrValue::Int(0)));
    assert_eq!(int(UnitAttribute::DeviceType), Some(AttrValue::Int(0)));
    assert_eq!(int(UnitAttribute::BlockSize), Some(AttrValue::Int(4096)));
    assert_eq!(int(UnitAttribute::Capacity), Some(AttrValue::Int(2048)));
    assert_eq!(
        int(UnitAttribute::Flags),
        Some(AttrValue::Int((UnitFlags::REMOVABLE | UnitFlags::PRESENT).bits() as u64))
    );
    match unit.get_attribute(UnitAttribute::InquiryData as u32, |_| None) {
        Some(AttrValue::Bytes(b)) => assert_eq!(&b[16..32], b"SCRIPTED TARGET "),
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}
