//! CSV telemetry logs
//!
//! Two append-only logs: every raw observation as it arrives, and every
//! sealed position record as it is produced. Both are plain CSV so field
//! crews can pull them into anything.

use crate::core::ObservationBatch;
use crate::utils::config::TelemetrySettings;
use csv::Writer;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Errors raised by the telemetry appenders
#[derive(Debug)]
pub enum TelemetryError {
    /// Opening a log file failed
    Open { path: String, details: String },
    /// Appending a row failed
    Write { details: String },
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Open { path, details } => {
                write!(f, "cannot open telemetry log {}: {}", path, details)
            }
            TelemetryError::Write { details } => {
                write!(f, "cannot append telemetry row: {}", details)
            }
        }
    }
}

impl std::error::Error for TelemetryError {}

impl From<csv::Error> for TelemetryError {
    fn from(error: csv::Error) -> Self {
        TelemetryError::Write {
            details: error.to_string(),
        }
    }
}

/// Append-mode CSV writers for observations and sealed positions
#[derive(Debug)]
pub struct TelemetryLog {
    observations: Writer<File>,
    positions: Writer<File>,
}

impl TelemetryLog {
    /// Open (or create) both logs in append mode
    pub fn open(settings: &TelemetrySettings) -> Result<Self, TelemetryError> {
        Ok(Self {
            observations: Self::open_writer(&settings.observation_log)?,
            positions: Self::open_writer(&settings.position_log)?,
        })
    }

    fn open_writer(path: &Path) -> Result<Writer<File>, TelemetryError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| TelemetryError::Open {
                path: path.display().to_string(),
                details: e.to_string(),
            })?;
        Ok(Writer::from_writer(file))
    }

    /// Append one row per reading: timestamp, anchor id, raw RSSI
    pub fn record_observations(
        &mut self,
        timestamp_ms: u64,
        batch: &ObservationBatch,
    ) -> Result<(), TelemetryError> {
        for reading in &batch.readings {
            self.observations.write_record([
                timestamp_ms.to_string().as_str(),
                reading.anchor_id.as_str(),
                reading.rssi.to_string().as_str(),
            ])?;
        }
        self.observations
            .flush()
            .map_err(|e| TelemetryError::Write {
                details: e.to_string(),
            })
    }

    /// Append a sealed position row: timestamp, tag id, ciphertext
    pub fn record_position(
        &mut self,
        timestamp_ms: u64,
        tag_id: &str,
        sealed: &str,
    ) -> Result<(), TelemetryError> {
        self.positions
            .write_record([timestamp_ms.to_string().as_str(), tag_id, sealed])?;
        self.positions.flush().map_err(|e| TelemetryError::Write {
            details: e.to_string(),
        })
    }
}
