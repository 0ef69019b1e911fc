// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

use crate::serde::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single reading of the device location sensor.
///
/// Latitude values range from -90.0 to 90.0 and longitude values range from
/// -180.0 to 180.0, both in decimal degrees. The accuracy is the radius of
/// the 95% confidence circle in meters, when the source reports one.
///
/// # Example
///
/// ```rust
/// use common::position::PositionSample;
///
/// let sample = PositionSample::new(48.8566, 2.3522);
/// assert_eq!(sample.latitude(), 48.8566);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    latitude: f64,
    longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accuracy: Option<f64>,
    #[serde(with = "timestamp", default = "Utc::now")]
    timestamp: DateTime<Utc>,
}

impl PositionSample {
    /// Creates a new [`PositionSample`] stamped with the current time and
    /// without accuracy information.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        PositionSample {
            latitude,
            longitude,
            accuracy: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a [`PositionSample`] with all fields given explicitly.
    ///
    /// # Arguments
    ///
    /// * `latitude` – Latitude in decimal degrees. Positive for northern hemisphere.
    /// * `longitude` – Longitude in decimal degrees. Positive for eastern hemisphere.
    /// * `accuracy` – Accuracy radius in meters, if known.
    /// * `timestamp` – Time the fix was acquired.
    pub fn with_details(
        latitude: f64,
        longitude: f64,
        accuracy: Option<f64>,
        timestamp: &DateTime<Utc>,
    ) -> Self {
        PositionSample {
            latitude,
            longitude,
            accuracy,
            timestamp: *timestamp,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Returns the latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns the accuracy radius in meters.
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Reasons a position source fails to deliver a sample.
///
/// The numeric codes match the ones browsers report for a
/// `GeolocationPositionError`.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionError {
    #[error("permission to access the location was denied")]
    PermissionDenied,
    #[error("the position of the device could not be determined")]
    PositionUnavailable,
    #[error("no position was acquired within the timeout")]
    Timeout,
}

impl PositionError {
    /// Returns the numeric error code of the failure.
    pub fn code(&self) -> u16 {
        match self {
            PositionError::PermissionDenied => 1,
            PositionError::PositionUnavailable => 2,
            PositionError::Timeout => 3,
        }
    }

    /// Maps a numeric error code back to a [`PositionError`].
    ///
    /// Unknown codes are reported as [`PositionError::PositionUnavailable`].
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => PositionError::PermissionDenied,
            3 => PositionError::Timeout,
            _ => PositionError::PositionUnavailable,
        }
    }
}

/// Opaque token that identifies an active position watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WatchId(pub i32);

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "watch#{}", self.0)
    }
}
