// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use anyhow::Result;
use scsi_bus_rs::{
    bus::{
        bus::{Bus, BusConfig, UnitAddress},
        interface::{BusFeatures, HostCapabilities, ResetFlags, TargetFlags, TargetSettings},
    },
    error::ScsiError,
    models::command::request::ScsiCommand,
};

use crate::unit_tests::common::{Reply, ScriptedHost, inquiry_data, rc16_data};

/// Backend that only answers reset/configure/poll and counts them.
#[derive(Debug, Default)]
struct AdminOnly {
    resets: AtomicUsize,
    configured: AtomicUsize,
    polls: AtomicUsize,
}

impl HostCapabilities for AdminOnly {
    fn submit(&self, _private: &mut [u8], _cmd: &mut ScsiCommand<'_>) -> bool {
        false
    }

    fn reset(&self, private: &mut [u8], flags: ResetFlags) -> bool {
        self.resets.fetch_add(1, Ordering::SeqCst);
        private[0] = flags.bits() as u8;
        true
    }

    fn configure_target(&self, private: &mut [u8], target: u8, s: &TargetSettings) -> bool {
        self.configured.fetch_add(1, Ordering::SeqCst);
        private[1] = target;
        private[2] = s.max_offset;
        s.flags.contains(TargetFlags::ALLOW_DISC)
    }

    fn poll(&self, _private: &mut [u8]) {
        self.polls.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_defaults_apply_for_zero_limits() {
    let bus = Bus::new(BusConfig::default(), None);
    assert_eq!(bus.max_targets(), 16);
    assert_eq!(bus.max_luns(), 8);
    assert_eq!(bus.features(), BusFeatures::empty());
    assert_eq!(bus.queue_depth(), 0);
    assert!(!bus.has_interface());
    assert_eq!(bus.private_size(), 0);
    assert!(bus.host_private().is_none());
}

#[test]
fn test_declared_configuration_is_reported() {
    let cfg = BusConfig {
        bus_number: 2,
        max_targets: 8,
        max_luns: 4,
        features: BusFeatures::WIDE | BusFeatures::TAGGED,
        queue_depth: 32,
        ..Default::default()
    };
    let bus = Bus::new(cfg, Some(Box::new(AdminOnly::default())));
    assert_eq!(bus.number(), 2);
    assert_eq!(bus.max_targets(), 8);
    assert_eq!(bus.max_luns(), 4);
    assert!(bus.features().contains(BusFeatures::TAGGED));
    assert_eq!(bus.queue_depth(), 32);
    assert!(bus.has_interface());
}

#[test]
fn test_null_vector_bus_fails_deterministically() {
    let mut bus = Bus::new(BusConfig::default(), None);

    assert_eq!(bus.start(), Err(ScsiError::Configuration));
    assert_eq!(bus.reset(ResetFlags::BUS), Err(ScsiError::Configuration));
    assert_eq!(
        bus.configure_target(0, &TargetSettings::default()),
        Err(ScsiError::Configuration)
    );
    bus.poll();
    assert_eq!(bus.scan(false), Err(ScsiError::Configuration));

    bus.add_unit(0, 0).expect("WTF");
    let mut h = bus.unit_handle(0, 0).expect("WTF");
    assert_eq!(h.test_unit_ready(), Err(ScsiError::Configuration));
    assert!(h.discover().is_err());
    assert!(!h.unit().is_ready());
}

#[test]
fn test_private_block_without_vectors_degrades() {
    let cfg = BusConfig {
        private_size: 128,
        ..Default::default()
    };
    let mut bus = Bus::new(cfg, None);
    assert!(bus.has_interface());
    assert_eq!(bus.private_size(), 128);
    assert!(bus.start().is_ok());
    assert_eq!(bus.reset(ResetFlags::DEVICE), Err(ScsiError::ProtocolPhase));

    bus.add_unit(0, 0).expect("WTF");
    let mut h = bus.unit_handle(0, 0).expect("WTF");
    assert_eq!(h.test_unit_ready(), Err(ScsiError::ProtocolPhase));
}

#[test]
fn test_admin_wrappers_reach_backend_with_private_block() {
    let backend = Arc::new(AdminOnly::default());
    let cfg = BusConfig {
        max_targets: 4,
        private_size: 16,
        ..Default::default()
    };
    let mut bus = Bus::new(cfg, Some(Box::new(backend.clone())));

    bus.reset(ResetFlags::BUS | ResetFlags::ABORT).expect("WTF");
    let settings = TargetSettings {
        transfer_period_ns: 50,
        max_offset: 15,
        bus_width: 1,
        flags: TargetFlags::ALLOW_DISC,
    };
    bus.configure_target(3, &settings).expect("WTF");
    assert_eq!(
        bus.configure_target(3, &TargetSettings::default()),
        Err(ScsiError::ProtocolPhase)
    );
    assert!(matches!(
        bus.configure_target(4, &settings),
        Err(ScsiError::InvalidRequest(_))
    ));
    bus.poll();
    bus.poll();

    let private = bus.host_private().expect("WTF");
    assert_eq!(private[0], (ResetFlags::BUS | ResetFlags::ABORT).bits() as u8);
    assert_eq!(&private[1..3], &[3, 0]);
    assert_eq!(backend.resets.load(Ordering::SeqCst), 1);
    assert_eq!(backend.configured.load(Ordering::SeqCst), 2);
    assert_eq!(backend.polls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_dispose_is_idempotent() -> Result<()> {
    let cfg = BusConfig {
        private_size: 32,
        ..Default::default()
    };
    let mut bus = Bus::new(cfg, Some(Box::new(AdminOnly::default())));
    bus.add_unit(1, 0)?;

    bus.dispose();
    assert!(!bus.has_interface());
    assert_eq!(bus.private_size(), 0);
    assert_eq!(bus.units().count(), 0);
    bus.dispose();
    assert_eq!(bus.start(), Err(ScsiError::Configuration));
    Ok(())
}

#[test]
fn test_unit_addressing_limits() -> Result<()> {
    let cfg = BusConfig {
        bus_number: 1,
        max_targets: 2,
        max_luns: 2,
        ..Default::default()
    };
    let mut bus = Bus::new(cfg, None);
    assert_eq!(bus.add_unit(1, 1)?.number(), 0x0111);
    assert!(bus.add_unit(2, 0).is_err());
    assert!(bus.add_unit(0, 2).is_err());
    assert!(bus.unit_handle(0, 0).is_none());
    assert!(bus.unit_handle(1, 1).is_some());
    assert_eq!(bus.selected_unit(), Some(UnitAddress { target: 1, lun: 1 }));
    Ok(())
}

#[test]
fn test_scan_keeps_only_configured_units() -> Result<()> {
    // Target 0 answers, every other probe is lost.
    let mut replies = vec![
        Reply::good(&inquiry_data(0x00, false)),
        Reply::good(&rc16_data(63, 512)),
    ];
    replies.extend((0..3).map(|_| Reply::lost()));
    let backend = ScriptedHost::new(replies);

    let cfg = BusConfig {
        max_targets: 4,
        ..Default::default()
    };
    let mut bus = Bus::new(cfg, Some(Box::new(backend.clone())));

    let found = bus.scan(false)?;
    assert_eq!(found, vec![UnitAddress { target: 0, lun: 0 }]);
    assert_eq!(bus.units().count(), 1);
    assert_eq!(bus.unit(0, 0).map(|u| u.capacity()), Some(64));
    assert!(bus.unit(1, 0).is_none());
    assert_eq!(bus.selected_unit(), None);
    Ok(())
}
