// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Page lifecycle and click events of the document.

use module_core::{Event, EventKind};
use std::sync::Arc;
use tokio::sync::broadcast::Sender;
use tracing::debug;
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use crate::setup::is_document_parsed;
use web_sys::{Document, Element};

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn publish(sender: &Sender<Event>, kind: EventKind) {
    if let Err(e) = sender.send(Event { kind }) {
        debug!("Page event without receivers: {e}");
    }
}

/// Publishes `PageReadyEvent` once the document has been parsed.
pub fn notify_when_ready(sender: Sender<Event>) -> Result<(), JsValue> {
    let document = document()?;
    if is_document_parsed(&document.ready_state()) {
        publish(&sender, EventKind::PageReadyEvent);
        return Ok(());
    }
    let on_ready = Closure::once_into_js(move |_: web_sys::Event| {
        publish(&sender, EventKind::PageReadyEvent);
    });
    document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
}

fn clicked_element_id(event: &web_sys::Event) -> Option<String> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let element = target.closest("[id]").ok()??;
    let id = element.id();
    (!id.is_empty()).then_some(id)
}

/// Listens for clicks anywhere in the document and publishes the id of the
/// nearest clicked element that carries one.
///
/// The listener sits on the document itself, so it can be installed before
/// the body has been parsed.
pub fn delegate_clicks(sender: Sender<Event>) -> Result<(), JsValue> {
    let document = document()?;
    let on_click = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        if let Some(id) = clicked_element_id(&event) {
            publish(&sender, EventKind::ElementClickedEvent(Arc::from(id.as_str())));
        }
    });
    document.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    on_click.forget();
    Ok(())
}
