// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

//! Bus lifecycle and the host adapter capability interface.

#![allow(clippy::module_inception)]
pub mod attributes;
pub mod bus;
pub mod interface;
