// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Decisions `mount` takes before touching the page.

use trigger::TriggerMode;

/// `true` once `document.readyState` has left `loading`, i.e. the document
/// has been parsed and `DOMContentLoaded` will not fire again.
pub fn is_document_parsed(ready_state: &str) -> bool {
    ready_state != "loading"
}

/// Clicks only matter if one of them can start or stop tracking.
pub fn needs_click_delegation(mode: &TriggerMode, stop_element: Option<&str>) -> bool {
    matches!(mode, TriggerMode::Click(_)) || stop_element.is_some()
}
