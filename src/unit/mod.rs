// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Logical units: descriptor state and the block I/O dispatch table.

#![allow(clippy::module_inception)]
pub mod dispatch;
pub mod handle;
pub mod unit;
