// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Common Modul for the location mirror
//!
//! Provides the data types that are shared by every modul: position samples,
//! watch errors and the page address that gets rewritten.

pub mod address;
pub mod position;
pub mod serde;
