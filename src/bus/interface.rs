// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fmt, sync::Arc};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::models::command::request::ScsiCommand;

bitflags! {
    /// Features a host adapter declares for its bus.
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BusFeatures: u32 {
        const PARITY    = 1 << 0;
        const DMA       = 1 << 1;
        const SYNC      = 1 << 2;
        const WIDE      = 1 << 3;
        const TAGGED    = 1 << 4;
        const AUTOSENSE = 1 << 5;
    }
}

bitflags! {
    /// Scope of a reset request passed to [`HostCapabilities::reset`].
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResetFlags: u32 {
        const BUS    = 1 << 0;
        const DEVICE = 1 << 1;
        const ABORT  = 1 << 2;
    }
}

bitflags! {
    /// Per-target negotiation flags.
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TargetFlags: u8 {
        const ALLOW_DISC = 1 << 0;
        const TAGGED     = 1 << 1;
    }
}

macro_rules! flags_debug {
    ($ty:ident) => {
        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($ty), "("))?;
                let mut first = true;
                for (name, _) in self.iter_names() {
                    if !first {
                        f.write_str("|")?;
                    }
                    f.write_str(name)?;
                    first = false;
                }
                f.write_str(")")
            }
        }
    };
}

flags_debug!(BusFeatures);
flags_debug!(ResetFlags);
flags_debug!(TargetFlags);

/// Feature names accepted in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BusFeature {
    Parity,
    Dma,
    Sync,
    Wide,
    Tagged,
    AutoSense,
}

impl From<BusFeature> for BusFeatures {
    fn from(f: BusFeature) -> Self {
        match f {
            BusFeature::Parity => BusFeatures::PARITY,
            BusFeature::Dma => BusFeatures::DMA,
            BusFeature::Sync => BusFeatures::SYNC,
            BusFeature::Wide => BusFeatures::WIDE,
            BusFeature::Tagged => BusFeatures::TAGGED,
            BusFeature::AutoSense => BusFeatures::AUTOSENSE,
        }
    }
}

impl FromIterator<BusFeature> for BusFeatures {
    fn from_iter<I: IntoIterator<Item = BusFeature>>(iter: I) -> Self {
        iter.into_iter()
            .fold(BusFeatures::empty(), |acc, f| acc | BusFeatures::from(f))
    }
}

/// Transfer negotiation parameters for one target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetSettings {
    /// Requested synchronous period; 0 means asynchronous.
    pub transfer_period_ns: u16,
    /// REQ/ACK offset.
    pub max_offset: u8,
    /// 0 = 8-bit, 1 = 16-bit, etc.
    pub bus_width: u8,
    pub flags: TargetFlags,
}

/// Operations a host adapter backend supplies to a bus.
///
/// Every method receives the backend's private data block, allocated by the
/// bus from the size the backend declared. Defaults report "not
/// implemented": `false` for the fallible calls, nothing for `poll`.
///
/// `submit` must complete the command before returning (status, sense and
/// `actual_length` filled in) or return `false` for a transport failure,
/// including an expired timeout.
pub trait HostCapabilities: Send + Sync {
    fn submit(&self, _private: &mut [u8], _cmd: &mut ScsiCommand<'_>) -> bool {
        false
    }

    fn reset(&self, _private: &mut [u8], _flags: ResetFlags) -> bool {
        false
    }

    fn configure_target(
        &self,
        _private: &mut [u8],
        _target: u8,
        _settings: &TargetSettings,
    ) -> bool {
        false
    }

    /// Lets the backend make progress with no command in flight.
    fn poll(&self, _private: &mut [u8]) {}
}

impl<T: HostCapabilities + ?Sized> HostCapabilities for Arc<T> {
    fn submit(&self, private: &mut [u8], cmd: &mut ScsiCommand<'_>) -> bool {
        (**self).submit(private, cmd)
    }

    fn reset(&self, private: &mut [u8], flags: ResetFlags) -> bool {
        (**self).reset(private, flags)
    }

    fn configure_target(
        &self,
        private: &mut [u8],
        target: u8,
        settings: &TargetSettings,
    ) -> bool {
        (**self).configure_target(private, target, settings)
    }

    fn poll(&self, private: &mut [u8]) {
        (**self).poll(private)
    }
}

/// Capability set installed when a backend declares private data but no
/// vectors; every call degrades to "not implemented".
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCapabilities;

impl HostCapabilities for NullCapabilities {}

/// The capability set plus the backend's private block, owned by a bus and
/// released with it.
pub struct HostInterface {
    caps: Box<dyn HostCapabilities>,
    private: Box<[u8]>,
}

impl HostInterface {
    pub fn new(caps: Box<dyn HostCapabilities>, private_size: usize) -> Self {
        Self {
            caps,
            private: vec![0u8; private_size].into_boxed_slice(),
        }
    }

    #[inline]
    pub fn submit(&mut self, cmd: &mut ScsiCommand<'_>) -> bool {
        self.caps.submit(&mut self.private, cmd)
    }

    #[inline]
    pub fn reset(&mut self, flags: ResetFlags) -> bool {
        self.caps.reset(&mut self.private, flags)
    }

    #[inline]
    pub fn configure_target(&mut self, target: u8, settings: &TargetSettings) -> bool {
        self.caps.configure_target(&mut self.private, target, settings)
    }

    #[inline]
    pub fn poll(&mut self) {
        self.caps.poll(&mut self.private)
    }

    #[inline]
    pub fn private_data(&self) -> &[u8] {
        &self.private
    }

    #[inline]
    pub fn private_data_mut(&mut self) -> &mut [u8] {
        &mut self.private
    }

    #[inline]
    pub fn private_size(&self) -> usize {
        self.private.len()
    }
}

impl fmt::Debug for HostInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostInterface")
            .field("private_size", &self.private.len())
            .finish_non_exhaustive()
    }
}
