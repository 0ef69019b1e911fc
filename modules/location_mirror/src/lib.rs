// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Location mirror Modul
//!
//! Keeps the `lat` and `lon` query parameters of the page address in sync
//! with the latest sample of a continuous position watch.

use address_bar::AddressBar;
use async_trait::async_trait;
use common::position::WatchId;
use geolocation::{LocationSource, PositionSink, WatchOptions};
use module_core::{EventKind, Module, ModuleCtx, PositionFailure, PositionUpdate};
use notice::{Notice, NoticeSink};
use std::sync::Arc;
use tracker::{StartOutcome, Tracker, TrackerError};
use tracing::{debug, error, info};

pub mod address_bar;
pub mod notice;
pub mod test_helper;
pub mod tracker;

/// The `LocationMirror` module owns the position watch of a page and mirrors
/// every sample of it into the page address.
///
/// Tracking starts on a `StartTrackingRequestEvent` and stops on a
/// `StopTrackingRequestEvent` or when the module quits. Samples replace the
/// current history entry, failures are reported through the notice sink and
/// leave the address untouched.
pub struct LocationMirror<S, A, N>
where
    S: LocationSource,
    A: AddressBar,
    N: NoticeSink,
{
    ctx: ModuleCtx,
    tracker: Tracker<S>,
    address_bar: A,
    notices: N,
}

impl<S, A, N> LocationMirror<S, A, N>
where
    S: LocationSource,
    A: AddressBar,
    N: NoticeSink,
{
    /// Creates a location mirror that watches with the default
    /// [`WatchOptions`]: high accuracy, no cached samples, 5 s timeout.
    pub fn new(ctx: ModuleCtx, source: S, address_bar: A, notices: N) -> Self {
        Self::with_options(ctx, source, WatchOptions::default(), address_bar, notices)
    }

    pub fn with_options(
        ctx: ModuleCtx,
        source: S,
        options: WatchOptions,
        address_bar: A,
        notices: N,
    ) -> Self {
        let sink = PositionSink::new(ctx.sender.clone());
        LocationMirror {
            ctx,
            tracker: Tracker::new(source, options, sink),
            address_bar,
            notices,
        }
    }

    pub fn tracker(&self) -> &Tracker<S> {
        &self.tracker
    }

    /// Starts tracking unless a watch is already active.
    ///
    /// A missing location capability is reported through the notice sink and
    /// as `CapabilityUnavailableEvent`; no watch is registered in that case.
    pub fn start_tracking(&mut self) -> Result<StartOutcome, TrackerError> {
        let result = self.tracker.start();
        match &result {
            Ok(StartOutcome::Started(id)) => {
                let _ = self.ctx.publish_event(EventKind::TrackingStartedEvent(*id));
            }
            Ok(StartOutcome::AlreadyTracking(_)) => (),
            Err(TrackerError::CapabilityUnavailable) => {
                error!("Tracking not started, no location capability available");
                self.notices.notify(&Notice::CapabilityUnavailable);
                let _ = self.ctx.publish_event(EventKind::CapabilityUnavailableEvent);
            }
            Err(e) => error!("Failed to start tracking. Error: {e}"),
        }
        result
    }

    /// Stops tracking and returns the id of the cleared watch.
    pub fn stop_tracking(&mut self) -> Option<WatchId> {
        let id = self.tracker.stop()?;
        let _ = self.ctx.publish_event(EventKind::TrackingStoppedEvent(id));
        Some(id)
    }

    fn is_active_watch(&self, watch_id: WatchId) -> bool {
        if self.tracker.active_watch() == Some(watch_id) {
            return true;
        }
        debug!("Ignoring event of inactive {watch_id}");
        false
    }

    fn on_position(&mut self, update: &PositionUpdate) {
        if !self.is_active_watch(update.watch_id) {
            return;
        }
        let mut address = match self.address_bar.current() {
            Ok(address) => address,
            Err(e) => {
                error!("Dropping position sample. Error: {e}");
                return;
            }
        };
        address.set_position(&update.sample);
        if let Err(e) = self.address_bar.replace(&address) {
            error!("Dropping position sample. Error: {e}");
            return;
        }
        info!(
            "Position updated lat: {}, lon: {}, address: {address}",
            update.sample.latitude(),
            update.sample.longitude()
        );
        let _ = self
            .ctx
            .publish_event(EventKind::AddressChangedEvent(Arc::new(address)));
    }

    fn on_position_error(&mut self, failure: &PositionFailure) {
        if !self.is_active_watch(failure.watch_id) {
            return;
        }
        self.notices.notify(&Notice::SampleFailed(failure.error));
    }
}

#[async_trait]
impl<S, A, N> Module for LocationMirror<S, A, N>
where
    S: LocationSource + Send,
    A: AddressBar + Send,
    N: NoticeSink + Send,
{
    async fn run(&mut self) -> Result<(), ()> {
        let mut run = true;
        while run {
            tokio::select! {
                event = self.ctx.receiver.recv() => {
                    match event {
                        Ok(event) => {
                            match event.kind {
                                EventKind::QuitEvent => {
                                    self.stop_tracking();
                                    run = false;
                                }
                                EventKind::StartTrackingRequestEvent => {
                                    let _ = self.start_tracking();
                                }
                                EventKind::StopTrackingRequestEvent => {
                                    self.stop_tracking();
                                }
                                EventKind::PositionEvent(update) => self.on_position(&update),
                                EventKind::PositionErrorEvent(failure) => self.on_position_error(&failure),
                                _ => (),
                            }
                        }
                        Err(e) => error!("Failed to receive event in module LocationMirror. Error: {e}"),
                    }
                }
            }
        }
        Ok(())
    }
}
