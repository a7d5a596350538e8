// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! RAM-backed target answering the command set this crate issues.
//!
//! The medium lives in the bus-owned private block, so the bus must be
//! built with `private_size` = [`MemDisk::private_size`]. Faults can be
//! injected for the next N commands: BUSY, CHECK CONDITION, or a transport
//! failure.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use tracing::{debug, trace};

use crate::{
    bus::interface::{HostCapabilities, ResetFlags},
    cfg::config::MemDiskConfig,
    control_block::{
        common::{
            INQUIRY, READ_10, READ_16, READ_CAPACITY_10, REQUEST_SENSE, SA_READ_CAPACITY_16,
            SERVICE_ACTION_IN_16, SYNCHRONIZE_CACHE_10, TEST_UNIT_READY, WRITE_10, WRITE_16,
        },
        inquiry::INQUIRY_DATA_LEN,
    },
    models::{
        command::{
            common::{CommandFlags, ScsiStatus},
            request::ScsiCommand,
        },
        sense::{SenseKey, SenseTriple, sense_data::build_fixed_sense},
    },
};

const VENDOR: &[u8; 8] = b"SCSIBUS ";
const PRODUCT: &[u8; 16] = b"MEM DISK        ";
const REVISION: &[u8; 4] = b"0008";

const SENSE_VALID: u32 = 1 << 24;

/// Outcome of handling one CDB inside the target.
enum Reply {
    Good(u32),
    Check(SenseKey, u8, u8),
}

/// In-memory direct-access (or other typed) target on one `target:lun`.
/// Commands addressed elsewhere fail at the transport level, like a
/// selection timeout.
#[derive(Debug)]
pub struct MemDisk {
    cfg: MemDiskConfig,
    target: u8,
    lun: u8,

    busy_next: AtomicU32,
    fail_next: AtomicU32,
    check_next: AtomicU32,
    pending_sense: AtomicU32,
    submitted: AtomicUsize,
}

impl MemDisk {
    pub fn new(cfg: MemDiskConfig) -> Self {
        Self {
            target: cfg.target,
            lun: cfg.lun,
            cfg,
            busy_next: AtomicU32::new(0),
            fail_next: AtomicU32::new(0),
            check_next: AtomicU32::new(0),
            pending_sense: AtomicU32::new(0),
            submitted: AtomicUsize::new(0),
        }
    }

    /// Private block size needed to hold the medium.
    pub fn private_size(cfg: &MemDiskConfig) -> usize {
        (cfg.block_size as usize).saturating_mul(cfg.blocks as usize)
    }

    /// Answer BUSY to the next `n` commands.
    pub fn inject_busy(&self, n: u32) {
        self.busy_next.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` submissions at the transport level.
    pub fn inject_transport_failure(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Answer CHECK CONDITION with `sense` to the next command.
    pub fn inject_check_condition(&self, sense: SenseTriple) {
        self.check_next.store(pack(sense), Ordering::SeqCst);
    }

    /// Number of `submit` calls seen, including rejected ones.
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::SeqCst)
    }

    fn take_counter(c: &AtomicU32) -> bool {
        c.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn execute(&self, medium: &mut [u8], cmd: &mut ScsiCommand<'_>) -> Reply {
        let cdb = cmd.cdb();
        match cdb[0] {
            TEST_UNIT_READY | SYNCHRONIZE_CACHE_10 => Reply::Good(0),
            INQUIRY => self.inquiry(cmd),
            REQUEST_SENSE => {
                let t = unpack(self.pending_sense.swap(0, Ordering::SeqCst))
                    .unwrap_or_default();
                let sense = build_fixed_sense(SenseKey::from(t.key), t.asc, t.ascq);
                Reply::Good(copy_in(cmd, &sense))
            },
            READ_CAPACITY_10 => {
                let max_lba = self.cfg.blocks.saturating_sub(1).min(u32::MAX as u64) as u32;
                let mut data = [0u8; 8];
                data[..4].copy_from_slice(&max_lba.to_be_bytes());
                data[4..].copy_from_slice(&self.cfg.block_size.to_be_bytes());
                Reply::Good(copy_in(cmd, &data))
            },
            SERVICE_ACTION_IN_16
                if cdb[1] & 0x1F == SA_READ_CAPACITY_16 && self.cfg.supports_read_capacity16.as_bool() =>
            {
                let mut data = [0u8; 32];
                data[..8].copy_from_slice(&self.cfg.blocks.saturating_sub(1).to_be_bytes());
                data[8..12].copy_from_slice(&self.cfg.block_size.to_be_bytes());
                Reply::Good(copy_in(cmd, &data))
            },
            READ_10 | WRITE_10 => {
                let lba = u32::from_be_bytes([cdb[2], cdb[3], cdb[4], cdb[5]]) as u64;
                let count = u16::from_be_bytes([cdb[7], cdb[8]]) as u64;
                self.transfer(medium, cmd, lba, count)
            },
            READ_16 | WRITE_16 => {
                let mut lba = [0u8; 8];
                lba.copy_from_slice(&cdb[2..10]);
                let count = u32::from_be_bytes([cdb[10], cdb[11], cdb[12], cdb[13]]) as u64;
                self.transfer(medium, cmd, u64::from_be_bytes(lba), count)
            },
            // INVALID COMMAND OPERATION CODE
            _ => Reply::Check(SenseKey::IllegalRequest, 0x20, 0x00),
        }
    }

    fn inquiry(&self, cmd: &mut ScsiCommand<'_>) -> Reply {
        let cdb = cmd.cdb();
        let (evpd, page) = (cdb[1] & 0x01 != 0, cdb[2]);

        if !evpd {
            let mut data = [0u8; INQUIRY_DATA_LEN];
            data[0] = self.cfg.device_type.code();
            data[1] = if self.cfg.removable.as_bool() { 0x80 } else { 0x00 };
            data[2] = 0x06; // SPC-4
            data[3] = 0x02;
            data[4] = (INQUIRY_DATA_LEN - 5) as u8;
            data[8..16].copy_from_slice(VENDOR);
            data[16..32].copy_from_slice(PRODUCT);
            data[32..36].copy_from_slice(REVISION);
            return Reply::Good(copy_in(cmd, &data));
        }

        match page {
            0x00 => Reply::Good(copy_in(cmd, &[0x00, 0x00, 0x00, 0x02, 0x00, 0x80])),
            0x80 => {
                let serial = format!("MD{:02X}{:02X}", self.target, self.lun);
                let mut data = vec![0x00, 0x80, 0x00, serial.len() as u8];
                data.extend_from_slice(serial.as_bytes());
                Reply::Good(copy_in(cmd, &data))
            },
            // INVALID FIELD IN CDB
            _ => Reply::Check(SenseKey::IllegalRequest, 0x24, 0x00),
        }
    }

    fn transfer(
        &self,
        medium: &mut [u8],
        cmd: &mut ScsiCommand<'_>,
        lba: u64,
        count: u64,
    ) -> Reply {
        let in_range = lba
            .checked_add(count)
            .is_some_and(|end| end <= self.cfg.blocks);
        if !in_range {
            // LOGICAL BLOCK ADDRESS OUT OF RANGE
            return Reply::Check(SenseKey::IllegalRequest, 0x21, 0x00);
        }

        let bs = self.cfg.block_size as usize;
        let start = lba as usize * bs;
        let len = count as usize * bs;
        let Some(region) = medium.get_mut(start..start + len) else {
            return Reply::Check(SenseKey::HardwareError, 0x44, 0x00);
        };

        let write = matches!(cmd.opcode(), WRITE_10 | WRITE_16);
        if write {
            match cmd.data_out() {
                Some(src) if src.len() >= len => region.copy_from_slice(&src[..len]),
                _ => return Reply::Check(SenseKey::IllegalRequest, 0x24, 0x00),
            }
        } else {
            match cmd.data_in() {
                Some(dst) if dst.len() >= len => dst[..len].copy_from_slice(region),
                _ => return Reply::Check(SenseKey::IllegalRequest, 0x24, 0x00),
            }
        }
        Reply::Good(len as u32)
    }
}

impl HostCapabilities for MemDisk {
    fn submit(&self, private: &mut [u8], cmd: &mut ScsiCommand<'_>) -> bool {
        self.submitted.fetch_add(1, Ordering::SeqCst);

        if cmd.target != self.target || cmd.lun != self.lun {
            trace!("no device at {}:{}", cmd.target, cmd.lun);
            return false;
        }
        if Self::take_counter(&self.fail_next) {
            debug!("injected transport failure");
            return false;
        }
        if Self::take_counter(&self.busy_next) {
            cmd.status = ScsiStatus::BUSY;
            return true;
        }

        let injected = unpack(self.check_next.swap(0, Ordering::SeqCst));
        let reply = match injected {
            Some(t) => Reply::Check(SenseKey::from(t.key), t.asc, t.ascq),
            None => self.execute(private, cmd),
        };

        match reply {
            Reply::Good(n) => {
                if cmd.opcode() != REQUEST_SENSE {
                    self.pending_sense.store(0, Ordering::SeqCst);
                }
                cmd.actual_length = n;
                cmd.status = ScsiStatus::GOOD;
            },
            Reply::Check(key, asc, ascq) => {
                let triple = SenseTriple {
                    key: u8::from(key),
                    asc,
                    ascq,
                };
                // Sense stays pending for REQUEST SENSE either way.
                self.pending_sense.store(pack(triple), Ordering::SeqCst);
                if cmd.flags.contains(CommandFlags::AUTOSENSE) {
                    cmd.set_sense(&build_fixed_sense(key, asc, ascq));
                }
                debug!("{:#04x} -> CHECK CONDITION {}", cmd.opcode(), triple);
                cmd.status = ScsiStatus::CHECK_CONDITION;
            },
        }
        true
    }

    fn reset(&self, _private: &mut [u8], _flags: ResetFlags) -> bool {
        self.busy_next.store(0, Ordering::SeqCst);
        self.check_next.store(0, Ordering::SeqCst);
        self.pending_sense.store(0, Ordering::SeqCst);
        true
    }
}

fn pack(t: SenseTriple) -> u32 {
    SENSE_VALID | ((t.key as u32) << 16) | ((t.asc as u32) << 8) | t.ascq as u32
}

fn unpack(v: u32) -> Option<SenseTriple> {
    if v & SENSE_VALID == 0 {
        return None;
    }
    Some(SenseTriple {
        key: (v >> 16) as u8 & 0x0F,
        asc: (v >> 8) as u8,
        ascq: v as u8,
    })
}

/// Copies as much of `data` as the command's data-in buffer accepts.
fn copy_in(cmd: &mut ScsiCommand<'_>, data: &[u8]) -> u32 {
    match cmd.data_in() {
        Some(dst) => {
            let n = dst.len().min(data.len());
            dst[..n].copy_from_slice(&data[..n]);
            n as u32
        },
        None => 0,
    }
}
