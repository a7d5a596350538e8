//! SCSI command translation and host bus abstraction: CDB builders,
//! status/sense mapping, a pluggable host adapter interface, and unit
//! discovery.
// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Host adapter backends shipped with the crate.
pub mod backends;
/// Bus lifecycle, host capability interface, and attributes.
pub mod bus;
/// Handles configuration, command-line parsing, and logging.
pub mod cfg;
/// Builders for the SCSI command descriptor blocks this layer issues.
pub mod control_block;
/// Error type returned by command dispatch.
pub mod error;
/// Command dispatch and status mapping.
pub mod handlers;
/// Command record and sense data models.
pub mod models;
/// State machines driving multi-command sequences such as discovery.
pub mod state_machine;
/// Logical units and their dispatch tables.
pub mod unit;
/// Provides utility functions used throughout the crate.
pub mod utils;
