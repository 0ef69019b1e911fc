// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::{GeolocationError, LocationSource, PositionSink, WatchOptions};
use chrono::Utc;
use common::position::{PositionError, PositionSample, WatchId};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use tracing::{debug, info, warn};

/// Latitude and longitude the simulated walk starts at.
pub const WALK_START: (f64, f64) = (48.8566, 2.3522);

/// Latitude change of the simulated walk per tick in degrees.
pub const WALK_STEP_DEG: f64 = 0.0001;

/// Shortest interval between two script steps.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// One entry of a position script.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScriptStep {
    /// Report the sample, stamped with the time it is emitted.
    Sample(PositionSample),
    /// Report the failure.
    Failure(PositionError),
    /// Stay silent. A stall that reaches the watch timeout ends with a
    /// [`PositionError::Timeout`].
    Stall(Duration),
}

struct ScriptedState {
    available: bool,
    next_watch_id: i32,
    watches: HashMap<WatchId, tokio::task::JoinHandle<()>>,
    registrations: Vec<WatchOptions>,
}

impl Drop for ScriptedState {
    fn drop(&mut self) {
        for (_, handle) in self.watches.drain() {
            handle.abort();
        }
    }
}

/// A position source that replays a fixed script, one step per interval.
///
/// Every watch replays the whole script from the start on its own task.
/// Clones share the registered watches, so a clone kept by a test or a host
/// can observe what the tracker did with the source.
#[derive(Clone)]
pub struct ScriptedLocationSource {
    steps: Arc<Vec<ScriptStep>>,
    interval: Duration,
    state: Arc<Mutex<ScriptedState>>,
}

impl ScriptedLocationSource {
    /// Creates a source that replays `steps`. Intervals below
    /// [`MIN_INTERVAL`] are raised to it.
    pub fn new(steps: Vec<ScriptStep>, interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            warn!("Interval {interval:?} too short, using {MIN_INTERVAL:?}");
        }
        ScriptedLocationSource {
            steps: Arc::new(steps),
            interval: interval.max(MIN_INTERVAL),
            state: Arc::new(Mutex::new(ScriptedState {
                available: true,
                next_watch_id: 1,
                watches: HashMap::new(),
                registrations: vec![],
            })),
        }
    }

    /// Creates a source that replays the samples in order.
    pub fn from_samples(samples: &[PositionSample], interval: Duration) -> Self {
        Self::new(
            samples.iter().copied().map(ScriptStep::Sample).collect(),
            interval,
        )
    }

    /// Creates a source that simulates a walker heading north from
    /// [`WALK_START`] by [`WALK_STEP_DEG`] per tick.
    pub fn walk(count: usize, interval: Duration) -> Self {
        Self::walk_from(WALK_START, (WALK_STEP_DEG, 0.0), count, interval)
    }

    /// Creates a source that moves from `start` by `step` (latitude, longitude)
    /// per tick. The walker has already taken one step when the first sample
    /// is reported, so `start` itself is never emitted.
    pub fn walk_from(start: (f64, f64), step: (f64, f64), count: usize, interval: Duration) -> Self {
        let steps = (1..=count)
            .map(|tick| {
                let tick = tick as f64;
                ScriptStep::Sample(PositionSample::new(
                    start.0 + step.0 * tick,
                    start.1 + step.1 * tick,
                ))
            })
            .collect();
        Self::new(steps, interval)
    }

    /// Creates a source of a host without any location capability.
    pub fn unavailable() -> Self {
        let source = Self::new(vec![], Duration::from_secs(1));
        source.lock().available = false;
        source
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of watches that are registered and not cleared.
    pub fn active_watches(&self) -> usize {
        self.lock().watches.len()
    }

    /// Options of every watch registration so far, in order.
    pub fn registrations(&self) -> Vec<WatchOptions> {
        self.lock().registrations.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptedState> {
        self.state.lock().unwrap_or_else(|state| state.into_inner())
    }
}

impl LocationSource for ScriptedLocationSource {
    fn is_available(&self) -> bool {
        self.lock().available
    }

    fn watch_position(
        &mut self,
        options: &WatchOptions,
        sink: PositionSink,
    ) -> Result<WatchId, GeolocationError> {
        let mut state = self.lock();
        if !state.available {
            return Err(GeolocationError::Unavailable);
        }
        let watch_id = WatchId(state.next_watch_id);
        state.next_watch_id += 1;
        state.registrations.push(*options);
        let steps = self.steps.clone();
        let interval = self.interval;
        let timeout = options.timeout;
        let handle = tokio::spawn(async move {
            replay_script(watch_id, steps, interval, timeout, sink).await;
        });
        state.watches.insert(watch_id, handle);
        info!("Registered scripted {watch_id} with {} steps", self.steps.len());
        Ok(watch_id)
    }

    fn clear_watch(&mut self, watch_id: WatchId) {
        if let Some(handle) = self.lock().watches.remove(&watch_id) {
            handle.abort();
            debug!("Cleared scripted {watch_id}");
        }
    }
}

async fn replay_script(
    watch_id: WatchId,
    steps: Arc<Vec<ScriptStep>>,
    interval: Duration,
    timeout: Duration,
    sink: PositionSink,
) {
    let mut timer = tokio::time::interval(interval);
    for step in steps.iter() {
        timer.tick().await;
        match step {
            ScriptStep::Sample(sample) => {
                let sample = PositionSample::with_details(
                    sample.latitude(),
                    sample.longitude(),
                    sample.accuracy(),
                    &Utc::now(),
                );
                sink.sample(watch_id, sample);
            }
            ScriptStep::Failure(error) => sink.failure(watch_id, *error),
            ScriptStep::Stall(duration) => {
                if *duration >= timeout {
                    tokio::time::sleep(timeout).await;
                    sink.failure(watch_id, PositionError::Timeout);
                } else {
                    tokio::time::sleep(*duration).await;
                }
                timer.reset();
            }
        }
    }
    debug!("Scripted {watch_id} finished its script");
}
