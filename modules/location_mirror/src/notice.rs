// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::position::PositionError;
use std::fmt;
use tracing::error;

/// Diagnostics the location mirror reports to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// Tracking was requested but the host has no location capability.
    CapabilityUnavailable,
    /// A watch failed to deliver a sample.
    SampleFailed(PositionError),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::CapabilityUnavailable => {
                write!(f, "Geolocation is not supported by this browser.")
            }
            Notice::SampleFailed(e) => write!(f, "Geolocation error (code {}): {e}", e.code()),
        }
    }
}

/// Destination of [`Notice`]s, e.g. a developer console or a blocking alert.
pub trait NoticeSink {
    fn notify(&mut self, notice: &Notice);
}

/// Writes notices to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotices;

impl NoticeSink for LogNotices {
    fn notify(&mut self, notice: &Notice) {
        error!("{notice}");
    }
}
