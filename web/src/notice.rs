// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use location_mirror::notice::{Notice, NoticeSink};
use std::str::FromStr;
use tracing::error;

/// How the page shows [`Notice`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageNotices {
    /// `console.error`
    #[default]
    Console,
    /// A blocking `window.alert`.
    Alert,
}

impl FromStr for PageNotices {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(PageNotices::Console),
            "alert" => Ok(PageNotices::Alert),
            _ => Err(format!("unknown notice style '{s}', expected console or alert")),
        }
    }
}

impl NoticeSink for PageNotices {
    fn notify(&mut self, notice: &Notice) {
        let message = notice.to_string();
        match self {
            PageNotices::Console => web_sys::console::error_1(&message.into()),
            PageNotices::Alert => {
                let shown = web_sys::window().map(|window| window.alert_with_message(&message));
                if !matches!(shown, Some(Ok(()))) {
                    error!("Failed to show alert: {message}");
                }
            }
        }
    }
}
