// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Common Modul for the bus tracker
//!
//! Provides the common data types that are used across every modul.

pub mod config;
pub mod position;
pub mod serde;
pub mod tracking;
