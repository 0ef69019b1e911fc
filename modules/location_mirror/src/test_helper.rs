// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::notice::{Notice, NoticeSink};
use std::sync::{Arc, Mutex};

/// Notice sink that keeps every notice.
///
/// Clones share the recorded notices.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotices {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotices {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(|notices| notices.into_inner())
            .clone()
    }
}

impl NoticeSink for RecordingNotices {
    fn notify(&mut self, notice: &Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|notices| notices.into_inner())
            .push(*notice);
    }
}
