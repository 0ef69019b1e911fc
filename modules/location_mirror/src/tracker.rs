// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use common::position::WatchId;
use geolocation::{GeolocationError, LocationSource, PositionSink, WatchOptions};
use thiserror::Error;
use tracing::{debug, info};

/// Lifecycle state of a [`Tracker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerState {
    /// No watch is registered.
    NotStarted,
    /// The watch with the given id delivers samples.
    Tracking(WatchId),
}

/// Result of a successful [`Tracker::start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new watch was registered.
    Started(WatchId),
    /// A watch was already active, nothing was registered.
    AlreadyTracking(WatchId),
}

impl StartOutcome {
    pub fn watch_id(&self) -> WatchId {
        match self {
            StartOutcome::Started(id) | StartOutcome::AlreadyTracking(id) => *id,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("location capability is not available")]
    CapabilityUnavailable,
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),
}

/// Owns the position watch of a page.
///
/// At most one watch is active at a time: starting while tracking is a no-op
/// and stopping while not tracking does nothing.
pub struct Tracker<S: LocationSource> {
    source: S,
    options: WatchOptions,
    sink: PositionSink,
    state: TrackerState,
}

impl<S: LocationSource> Tracker<S> {
    pub fn new(source: S, options: WatchOptions, sink: PositionSink) -> Self {
        Tracker {
            source,
            options,
            sink,
            state: TrackerState::NotStarted,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Returns the id of the active watch.
    pub fn active_watch(&self) -> Option<WatchId> {
        match self.state {
            TrackerState::Tracking(id) => Some(id),
            TrackerState::NotStarted => None,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.active_watch().is_some()
    }

    /// Registers a continuous watch with the configured options.
    ///
    /// Fails with [`TrackerError::CapabilityUnavailable`] without touching the
    /// source if the host has no location capability.
    pub fn start(&mut self) -> Result<StartOutcome, TrackerError> {
        if let TrackerState::Tracking(id) = self.state {
            debug!("Start requested while {id} is active, ignoring");
            return Ok(StartOutcome::AlreadyTracking(id));
        }
        if !self.source.is_available() {
            return Err(TrackerError::CapabilityUnavailable);
        }
        let id = self
            .source
            .watch_position(&self.options, self.sink.clone())
            .map_err(|e| match e {
                GeolocationError::Unavailable => TrackerError::CapabilityUnavailable,
                e => TrackerError::Geolocation(e),
            })?;
        self.state = TrackerState::Tracking(id);
        info!(
            "Tracking started with {id} (high accuracy: {}, maximum age: {:?}, timeout: {:?})",
            self.options.enable_high_accuracy, self.options.maximum_age, self.options.timeout
        );
        Ok(StartOutcome::Started(id))
    }

    /// Clears the active watch and returns its id.
    pub fn stop(&mut self) -> Option<WatchId> {
        let id = self.active_watch()?;
        self.source.clear_watch(id);
        self.state = TrackerState::NotStarted;
        info!("Tracking stopped, cleared {id}");
        Some(id)
    }
}
