// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Host adapter backends shipped with the crate.

/// RAM-backed reference target.
pub mod mem_disk;
