//! This module defines the command record exchanged with host backends.

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Status codes, transfer direction, and submission flags.
pub mod common;
/// The [`request::ScsiCommand`] record and its data buffer.
pub mod request;
