//! Command dispatch: submission to the host and status mapping.

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Submits one command on behalf of a unit.
pub mod perform_command;
/// Maps a completed command's status byte and sense onto a result.
pub mod status;
