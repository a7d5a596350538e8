//! This module contains state machines for multi-command sequences.

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

/// Common structures and traits for state machines.
pub mod common;
/// State machine probing a unit and installing its dispatch table.
pub mod discovery_states;
