// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Read-only attribute ids exposed by buses and units.
//!
//! A recognised id yields the stored value; anything else goes to the
//! caller's default handler.

use crate::{bus::bus::Bus, unit::unit::Unit};

/// Bus attribute ids.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusAttribute {
    MaxTargets = 0x0800_0000,
    MaxLuns,
    Features,
    InterfaceDataSize,
    InterfaceVectors,
    CommandQueueDepth,
    MinTransferPeriod,
    MaxTransferPeriod,
}

impl TryFrom<u32> for BusAttribute {
    type Error = u32;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        Ok(match v {
            0x0800_0000 => Self::MaxTargets,
            0x0800_0001 => Self::MaxLuns,
            0x0800_0002 => Self::Features,
            0x0800_0003 => Self::InterfaceDataSize,
            0x0800_0004 => Self::InterfaceVectors,
            0x0800_0005 => Self::CommandQueueDepth,
            0x0800_0006 => Self::MinTransferPeriod,
            0x0800_0007 => Self::MaxTransferPeriod,
            other => return Err(other),
        })
    }
}

/// Unit attribute ids.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitAttribute {
    TargetId = 0x0800_0100,
    Lun,
    DeviceType,
    BlockSize,
    Capacity,
    Flags,
    InquiryData,
}

impl TryFrom<u32> for UnitAttribute {
    type Error = u32;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        Ok(match v {
            0x0800_0100 => Self::TargetId,
            0x0800_0101 => Self::Lun,
            0x0800_0102 => Self::DeviceType,
            0x0800_0103 => Self::BlockSize,
            0x0800_0104 => Self::Capacity,
            0x0800_0105 => Self::Flags,
            0x0800_0106 => Self::InquiryData,
            other => return Err(other),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrValue<'a> {
    Int(u64),
    Bytes(&'a [u8]),
}

pub trait Attributes {
    type Id: TryFrom<u32>;

    /// Stored value for `id`, or `None` when this entity does not serve it.
    fn attribute(&self, id: Self::Id) -> Option<AttrValue<'_>>;

    /// Looks up a raw id, deferring to `default` for anything not served.
    fn get_attribute<'s, F>(&'s self, raw: u32, default: F) -> Option<AttrValue<'s>>
    where
        F: FnOnce(u32) -> Option<AttrValue<'s>>,
    {
        match Self::Id::try_from(raw) {
            Ok(id) => match self.attribute(id) {
                Some(v) => Some(v),
                None => default(raw),
            },
            Err(_) => default(raw),
        }
    }
}

impl Attributes for Bus {
    type Id = BusAttribute;

    fn attribute(&self, id: BusAttribute) -> Option<AttrValue<'_>> {
        match id {
            BusAttribute::MaxTargets => Some(AttrValue::Int(self.max_targets() as u64)),
            BusAttribute::MaxLuns => Some(AttrValue::Int(self.max_luns() as u64)),
            BusAttribute::Features => Some(AttrValue::Int(self.features().bits() as u64)),
            BusAttribute::CommandQueueDepth => Some(AttrValue::Int(self.queue_depth() as u64)),
            BusAttribute::InterfaceDataSize
            | BusAttribute::InterfaceVectors
            | BusAttribute::MinTransferPeriod
            | BusAttribute::MaxTransferPeriod => None,
        }
    }
}

impl Attributes for Unit {
    type Id = UnitAttribute;

    fn attribute(&self, id: UnitAttribute) -> Option<AttrValue<'_>> {
        Some(match id {
            UnitAttribute::TargetId => AttrValue::Int(self.target() as u64),
            UnitAttribute::Lun => AttrValue::Int(self.lun() as u64),
            UnitAttribute::DeviceType => AttrValue::Int(self.device_type() as u64),
            UnitAttribute::BlockSize => AttrValue::Int(self.block_size() as u64),
            UnitAttribute::Capacity => AttrValue::Int(self.capacity()),
            UnitAttribute::Flags => AttrValue::Int(self.flags().bits() as u64),
            UnitAttribute::InquiryData => AttrValue::Bytes(self.inquiry_data()),
        })
    }
}
