// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Browser host of the location mirror.
//!
//! Wires `navigator.geolocation`, `window.history` and the page's click and
//! load events to the location mirror and trigger modules. The host page
//! calls [`mount`] once, e.g.
//!
//! ```js
//! import init, { mount } from "./location_mirror_web.js";
//! await init();
//! mount("click:start-tracking", "console", "stop-tracking");
//! ```
//!
//! Everything but [`setup`] only builds for wasm32.

pub mod setup;

#[cfg(target_arch = "wasm32")]
mod address_bar;
#[cfg(target_arch = "wasm32")]
pub mod console;
#[cfg(target_arch = "wasm32")]
mod geolocation;
#[cfg(target_arch = "wasm32")]
mod notice;
#[cfg(target_arch = "wasm32")]
pub mod page;

#[cfg(target_arch = "wasm32")]
mod host;

#[cfg(target_arch = "wasm32")]
pub use {
    address_bar::BrowserAddressBar, geolocation::BrowserGeolocation, host::*,
    notice::PageNotices,
};
