// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Entry points exported to the host page.

use crate::{
    address_bar::BrowserAddressBar, console, geolocation::BrowserGeolocation,
    notice::PageNotices, page, setup::needs_click_delegation,
};
use location_mirror::LocationMirror;
use module_core::{Event, EventBus, EventKind, Module};
use std::cell::RefCell;
use tracing::{error, info};
use trigger::{Intent, Trigger, TriggerMode};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

thread_local! {
    static EVENT_BUS: RefCell<Option<EventBus>> = const { RefCell::new(None) };
}

fn publish(kind: EventKind) -> Result<(), JsValue> {
    EVENT_BUS.with(|bus| match bus.borrow().as_ref() {
        Some(eb) => {
            eb.publish(&Event { kind });
            Ok(())
        }
        None => Err(JsValue::from_str("location mirror is not mounted")),
    })
}

/// Starts the location mirror on the current page.
///
/// `trigger` is `page-ready`, `immediate`, `click` or `click:<element id>`,
/// `notices` is `console` or `alert`. Clicks on `stop_element` stop tracking.
#[wasm_bindgen]
pub fn mount(trigger: &str, notices: &str, stop_element: Option<String>) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console::init_logging();

    let mode = trigger
        .parse::<TriggerMode>()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let notices = notices
        .parse::<PageNotices>()
        .map_err(|e| JsValue::from_str(&e))?;
    if EVENT_BUS.with(|bus| bus.borrow().is_some()) {
        return Err(JsValue::from_str("location mirror is already mounted"));
    }

    let eb = EventBus::default();
    let mut mirror =
        LocationMirror::new(eb.context(), BrowserGeolocation, BrowserAddressBar, notices);
    let mut trigger = Trigger::new(eb.context(), mode.clone());
    if let Some(element_id) = &stop_element {
        trigger = trigger.with_route(element_id, Intent::StopTracking);
    }

    if needs_click_delegation(&mode, stop_element.as_deref()) {
        page::delegate_clicks(eb.sender())?;
    }
    spawn_local(async move {
        if mirror.run().await.is_err() {
            error!("Location mirror stopped with an error");
        }
    });
    spawn_local(async move {
        if trigger.run().await.is_err() {
            error!("Trigger stopped with an error");
        }
    });
    page::notify_when_ready(eb.sender())?;

    info!("Location mirror mounted with trigger {mode}");
    EVENT_BUS.with(|bus| *bus.borrow_mut() = Some(eb));
    Ok(())
}

/// Requests tracking independent of the configured trigger.
#[wasm_bindgen]
pub fn start_tracking() -> Result<(), JsValue> {
    publish(EventKind::StartTrackingRequestEvent)
}

#[wasm_bindgen]
pub fn stop_tracking() -> Result<(), JsValue> {
    publish(EventKind::StopTrackingRequestEvent)
}

/// Clears the active watch and shuts the modules down.
#[wasm_bindgen]
pub fn unmount() -> Result<(), JsValue> {
    publish(EventKind::QuitEvent)?;
    EVENT_BUS.with(|bus| bus.borrow_mut().take());
    Ok(())
}
