// SPDX-FileCopyrightText: 2025 All contributors
//
// SPDX-License-Identifier: GPL-2.0-or-later

//! Position samples stored as CSV with a `latitude,longitude[,accuracy]`
//! header.

use chrono::Utc;
use common::position::PositionSample;
use serde::Deserialize;
use std::{io, path::Path};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SampleRecord {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    accuracy: Option<f64>,
}

/// Reads all samples of `reader`. Every sample is stamped with the current
/// time; the replay restamps it when it is emitted.
pub fn read_samples<R: io::Read>(reader: R) -> Result<Vec<PositionSample>, csv::Error> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut samples = Vec::new();
    for result in rdr.deserialize() {
        let record: SampleRecord = result?;
        samples.push(PositionSample::with_details(
            record.latitude,
            record.longitude,
            record.accuracy,
            &Utc::now(),
        ));
    }
    debug!("length of samples: {}", samples.len());
    Ok(samples)
}

pub fn read_samples_from_file(file_path: &Path) -> Result<Vec<PositionSample>, csv::Error> {
    let file = std::fs::File::open(file_path)?;
    read_samples(io::BufReader::new(file))
}
