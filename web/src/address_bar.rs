// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::address::PageAddress;
use location_mirror::address_bar::{AddressBar, AddressError};
use wasm_bindgen::JsValue;

/// The address bar of the current window, backed by `window.location` and
/// `window.history`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserAddressBar;

fn window() -> Result<web_sys::Window, String> {
    web_sys::window().ok_or_else(|| "no global window".to_string())
}

fn describe(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

impl AddressBar for BrowserAddressBar {
    fn current(&self) -> Result<PageAddress, AddressError> {
        let location = window().map_err(AddressError::Unreadable)?.location();
        let read = |part: Result<String, JsValue>| {
            part.map_err(|e| AddressError::Unreadable(describe(e)))
        };
        let address = format!(
            "{}{}{}",
            read(location.pathname())?,
            read(location.search())?,
            read(location.hash())?
        );
        Ok(PageAddress::parse(&address))
    }

    fn replace(&mut self, address: &PageAddress) -> Result<(), AddressError> {
        let history = window()
            .map_err(AddressError::Rejected)?
            .history()
            .map_err(|e| AddressError::Rejected(describe(e)))?;
        history
            .replace_state_with_url(&js_sys::Object::new(), "", Some(&address.to_string()))
            .map_err(|e| AddressError::Rejected(describe(e)))
    }
}
