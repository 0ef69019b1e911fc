// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Geolocation Modul for the location mirror
//!
//! Provides the interface every position source implements and the sink the
//! sources report their samples through.

use common::position::{PositionError, PositionSample, WatchId};
use module_core::{Event, EventKind, PositionFailure, PositionUpdate};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::debug;

pub mod samples_file;
pub mod scripted_source;

/// Configuration of a continuous position watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchOptions {
    /// Ask the source for the most accurate fix it can deliver.
    pub enable_high_accuracy: bool,
    /// Maximum age of a cached fix the source may hand out. Zero forces a fresh fix.
    pub maximum_age: Duration,
    /// Time the source may take to acquire a fix before it reports a timeout.
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        WatchOptions {
            enable_high_accuracy: true,
            maximum_age: Duration::ZERO,
            timeout: Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("location capability is not available")]
    Unavailable,
    #[error("position watch was rejected: {0}")]
    WatchRejected(String),
}

/// Publishes the outcome of a position watch on the event bus.
///
/// Every sample and failure is tagged with the id of the watch that produced
/// it. Events of a watch are published in the order the source reports them.
#[derive(Clone, Debug)]
pub struct PositionSink {
    sender: tokio::sync::broadcast::Sender<Event>,
}

impl PositionSink {
    pub fn new(sender: tokio::sync::broadcast::Sender<Event>) -> Self {
        PositionSink { sender }
    }

    /// Reports a new sample of the watch `watch_id`.
    pub fn sample(&self, watch_id: WatchId, sample: PositionSample) {
        debug!(
            "{watch_id} reported lat: {}, lon: {}",
            sample.latitude(),
            sample.longitude()
        );
        let _ = self.sender.send(Event {
            kind: EventKind::PositionEvent(Arc::new(PositionUpdate { watch_id, sample })),
        });
    }

    /// Reports that the watch `watch_id` failed to deliver a sample.
    pub fn failure(&self, watch_id: WatchId, error: PositionError) {
        debug!("{watch_id} reported failure: {error}");
        let _ = self.sender.send(Event {
            kind: EventKind::PositionErrorEvent(Arc::new(PositionFailure { watch_id, error })),
        });
    }
}

/// Common interface that every position source must support.
pub trait LocationSource {
    /// Returns `false` if the host offers no location capability at all.
    fn is_available(&self) -> bool;

    /// Registers a continuous position watch.
    ///
    /// Samples and failures are reported through `sink` until the watch is
    /// cleared. Returns the id that identifies the new watch.
    fn watch_position(
        &mut self,
        options: &WatchOptions,
        sink: PositionSink,
    ) -> Result<WatchId, GeolocationError>;

    /// Cancels the watch `watch_id`. Unknown ids are ignored.
    fn clear_watch(&mut self, watch_id: WatchId);
}
