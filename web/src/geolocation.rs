// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use chrono::{DateTime, Utc};
use common::position::{PositionError, PositionSample, WatchId};
use geolocation::{GeolocationError, LocationSource, PositionSink, WatchOptions};
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};
use tracing::{debug, error};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{
    Position as GeolocationPosition, PositionError as GeolocationPositionError, PositionOptions,
};

type SuccessCallback = Closure<dyn FnMut(GeolocationPosition)>;
type ErrorCallback = Closure<dyn FnMut(GeolocationPositionError)>;

thread_local! {
    // Callbacks must outlive the watch, the browser calls them until cleared.
    static CALLBACKS: RefCell<HashMap<i32, (SuccessCallback, ErrorCallback)>> =
        RefCell::new(HashMap::new());
}

/// `navigator.geolocation` of the current window.
///
/// Holds no JavaScript handles itself, so it can be moved into the event loop
/// of the location mirror.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserGeolocation;

impl BrowserGeolocation {
    fn geolocation() -> Result<web_sys::Geolocation, GeolocationError> {
        let window = web_sys::window().ok_or(GeolocationError::Unavailable)?;
        window
            .navigator()
            .geolocation()
            .map_err(|_| GeolocationError::Unavailable)
    }
}

fn js_error(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn duration_ms(duration: std::time::Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

fn to_sample(position: &GeolocationPosition) -> PositionSample {
    let coords = position.coords();
    let timestamp =
        DateTime::from_timestamp_millis(position.timestamp() as i64).unwrap_or_else(Utc::now);
    PositionSample::with_details(
        coords.latitude(),
        coords.longitude(),
        Some(coords.accuracy()),
        &timestamp,
    )
}

impl LocationSource for BrowserGeolocation {
    fn is_available(&self) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        js_sys::Reflect::has(&window.navigator(), &JsValue::from_str("geolocation"))
            .unwrap_or(false)
    }

    fn watch_position(
        &mut self,
        options: &WatchOptions,
        sink: PositionSink,
    ) -> Result<WatchId, GeolocationError> {
        let geolocation = Self::geolocation()?;

        let position_options = PositionOptions::new();
        position_options.set_enable_high_accuracy(options.enable_high_accuracy);
        position_options.set_maximum_age(duration_ms(options.maximum_age));
        position_options.set_timeout(duration_ms(options.timeout));

        // The id is only known after registration, callbacks read it from here.
        let id_cell = Rc::new(Cell::new(0));

        let on_sample = {
            let sink = sink.clone();
            let id_cell = id_cell.clone();
            SuccessCallback::new(move |position: GeolocationPosition| {
                sink.sample(WatchId(id_cell.get()), to_sample(&position));
            })
        };
        let on_failure = {
            let id_cell = id_cell.clone();
            ErrorCallback::new(move |e: GeolocationPositionError| {
                debug!("Browser reported position error: {}", e.message());
                sink.failure(WatchId(id_cell.get()), PositionError::from_code(e.code()));
            })
        };

        let id = geolocation
            .watch_position_with_error_callback_and_options(
                on_sample.as_ref().unchecked_ref(),
                Some(on_failure.as_ref().unchecked_ref()),
                &position_options,
            )
            .map_err(|e| GeolocationError::WatchRejected(js_error(&e)))?;
        id_cell.set(id);

        CALLBACKS.with(|callbacks| {
            callbacks.borrow_mut().insert(id, (on_sample, on_failure));
        });
        Ok(WatchId(id))
    }

    fn clear_watch(&mut self, watch_id: WatchId) {
        match Self::geolocation() {
            Ok(geolocation) => geolocation.clear_watch(watch_id.0),
            Err(e) => error!("Failed to clear {watch_id}. Error: {e}"),
        }
        CALLBACKS.with(|callbacks| {
            callbacks.borrow_mut().remove(&watch_id.0);
        });
    }
}
