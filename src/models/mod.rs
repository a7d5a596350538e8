//! This module defines the command record and sense data structures.

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Defines the SCSI command record exchanged with host backends.
pub mod command;
/// Defines sense keys, ASC/ASCQ tables, and fixed-format sense parsing.
pub mod sense;
