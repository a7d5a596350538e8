// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::fmt;

use crate::{
    error::{ScsiError, ScsiResult},
    models::command::common::{CommandFlags, DataDirection},
};

/// Longest CDB a backend is required to carry (SERVICE ACTION IN(16)).
pub const MAX_CDB_LEN: usize = 16;
/// Size of the autosense buffer handed to backends.
pub const MAX_SENSE_LEN: usize = 32;

/// Host memory attached to a command. The variant fixes the transfer
/// direction, so a command can never claim a data-in phase without a buffer
/// to land it in.
#[derive(Default)]
pub enum DataBuffer<'a> {
    #[default]
    None,
    In(&'a mut [u8]),
    Out(&'a [u8]),
    Bidirectional(&'a mut [u8]),
}

impl DataBuffer<'_> {
    #[inline]
    pub fn direction(&self) -> DataDirection {
        match self {
            DataBuffer::None => DataDirection::None,
            DataBuffer::In(_) => DataDirection::In,
            DataBuffer::Out(_) => DataDirection::Out,
            DataBuffer::Bidirectional(_) => DataDirection::Bidirectional,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            DataBuffer::None => 0,
            DataBuffer::In(b) | DataBuffer::Bidirectional(b) => b.len(),
            DataBuffer::Out(b) => b.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single SCSI command as exchanged with a host backend.
///
/// The record is wire-shaped and carries no behaviour beyond bounds
/// checking: CDB bytes, the data phase, and the completion fields
/// (`status`, sense, `actual_length`) that the backend fills in.
pub struct ScsiCommand<'a> {
    /// Target identifier (0..=15 on a wide bus).
    pub target: u8,
    /// Logical unit number (0..=7).
    pub lun: u8,
    cdb: [u8; MAX_CDB_LEN],
    cdb_len: u8,
    /// Data buffer; its variant is the transfer direction.
    pub data: DataBuffer<'a>,
    /// Requested transfer size in bytes.
    pub data_length: u32,
    /// Bytes actually moved; zero until a submission completes.
    pub actual_length: u32,
    /// Advisory timeout, enforced by the backend.
    pub timeout_ms: u32,
    /// Raw status byte returned by the target.
    pub status: u8,
    sense: [u8; MAX_SENSE_LEN],
    sense_len: u8,
    pub flags: CommandFlags,
    /// Retry counter for callers that wrap dispatch in a retry loop.
    pub retries: u8,
}

impl<'a> ScsiCommand<'a> {
    /// Builds a command from a zero-padded CDB array of which the first
    /// `cdb_len` bytes are meaningful.
    pub fn from_cdb(
        cdb: [u8; MAX_CDB_LEN],
        cdb_len: usize,
        data: DataBuffer<'a>,
        data_length: u32,
    ) -> ScsiResult<Self> {
        if cdb_len > MAX_CDB_LEN {
            return Err(ScsiError::InvalidRequest("CDB longer than 16 bytes"));
        }
        if data.len() < data_length as usize {
            return Err(ScsiError::InvalidRequest(
                "data buffer shorter than requested transfer",
            ));
        }
        Ok(Self {
            target: 0,
            lun: 0,
            cdb,
            cdb_len: cdb_len as u8,
            data,
            data_length,
            actual_length: 0,
            timeout_ms: 0,
            status: 0,
            sense: [0u8; MAX_SENSE_LEN],
            sense_len: 0,
            flags: CommandFlags::empty(),
            retries: 0,
        })
    }

    /// Builds a command from an arbitrary CDB slice (pass-through path).
    pub fn from_cdb_bytes(
        cdb: &[u8],
        data: DataBuffer<'a>,
        data_length: u32,
    ) -> ScsiResult<Self> {
        if cdb.len() > MAX_CDB_LEN {
            return Err(ScsiError::InvalidRequest("CDB longer than 16 bytes"));
        }
        let mut raw = [0u8; MAX_CDB_LEN];
        raw[..cdb.len()].copy_from_slice(cdb);
        Self::from_cdb(raw, cdb.len(), data, data_length)
    }

    /// The meaningful CDB bytes.
    #[inline]
    pub fn cdb(&self) -> &[u8] {
        &self.cdb[..self.cdb_len as usize]
    }

    #[inline]
    pub fn opcode(&self) -> u8 {
        self.cdb[0]
    }

    #[inline]
    pub fn direction(&self) -> DataDirection {
        self.data.direction()
    }

    /// Valid sense bytes collected by the backend.
    #[inline]
    pub fn sense(&self) -> &[u8] {
        &self.sense[..self.sense_len as usize]
    }

    #[inline]
    pub fn sense_len(&self) -> usize {
        self.sense_len as usize
    }

    /// Stores autosense data, truncating to [`MAX_SENSE_LEN`].
    pub fn set_sense(&mut self, bytes: &[u8]) {
        let n = bytes.len().min(MAX_SENSE_LEN);
        self.sense.fill(0);
        self.sense[..n].copy_from_slice(&bytes[..n]);
        self.sense_len = n as u8;
    }

    /// Buffer the backend should fill for a data-in phase, limited to the
    /// requested length.
    pub fn data_in(&mut self) -> Option<&mut [u8]> {
        let len = self.data_length as usize;
        match &mut self.data {
            DataBuffer::In(b) | DataBuffer::Bidirectional(b) => b.get_mut(..len),
            _ => None,
        }
    }

    /// Bytes the backend should transmit for a data-out phase.
    pub fn data_out(&self) -> Option<&[u8]> {
        let len = self.data_length as usize;
        match &self.data {
            DataBuffer::Out(b) => b.get(..len),
            DataBuffer::Bidirectional(b) => b.get(..len),
            _ => None,
        }
    }

    /// Clears every completion field before a (re)submission.
    pub(crate) fn reset_completion(&mut self) {
        self.actual_length = 0;
        self.status = 0;
        self.sense.fill(0);
        self.sense_len = 0;
    }
}

impl fmt::Debug for ScsiCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScsiCommand")
            .field("target", &self.target)
            .field("lun", &self.lun)
            .field("cdb", &hex::encode(self.cdb()))
            .field("direction", &self.direction())
            .field("data_length", &self.data_length)
            .field("actual_length", &self.actual_length)
            .field("timeout_ms", &self.timeout_ms)
            .field("status", &format_args!("{:#04x}", self.status))
            .field("sense", &hex::encode(self.sense()))
            .field("flags", &self.flags)
            .finish()
    }
}
