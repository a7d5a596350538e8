// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! CDB builders. Every public builder returns a populated
//! [`ScsiCommand`](crate::models::command::request::ScsiCommand) and performs
//! no I/O; the `build_*`/`fill_*` helpers write raw CDB bytes only.

pub mod common;
pub mod inquiry;
pub mod read_capacity;
pub mod read_write;
pub mod request_sense;
pub mod synchronize_cache;
pub mod test_unit_ready;

pub use inquiry::inquiry;
pub use read_capacity::read_capacity;
pub use read_write::read_write;
pub use request_sense::request_sense;
pub use synchronize_cache::synchronize_cache;
pub use test_unit_ready::test_unit_ready;
