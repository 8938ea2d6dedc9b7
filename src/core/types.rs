//! Core data types for the positioning system

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Fixed 2D anchor position in a shared planar unit (meters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_vector2(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// Single RSSI measurement reported by one anchor receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorReading {
    /// Identifier of the reporting anchor
    pub anchor_id: String,
    /// Received signal strength (dBm)
    pub rssi: i16,
}

impl AnchorReading {
    pub fn new(anchor_id: impl Into<String>, rssi: i16) -> Self {
        Self {
            anchor_id: anchor_id.into(),
            rssi,
        }
    }
}

/// Ordered per-anchor readings collected for one tag within one
/// reporting cycle. Duplicate anchor ids are legal and applied to the
/// signal history in sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationBatch {
    /// Identifier of the mobile tag being located
    pub tag_id: String,
    /// Readings in arrival order
    pub readings: Vec<AnchorReading>,
}

impl ObservationBatch {
    pub fn new(tag_id: impl Into<String>, readings: Vec<AnchorReading>) -> Self {
        Self {
            tag_id: tag_id.into(),
            readings,
        }
    }
}

/// Weighted-centroid location estimate for one batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionEstimate {
    pub x: f64,
    pub y: f64,
}

impl PositionEstimate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Timestamped estimate handed to egress and telemetry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub tag_id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    pub x: f64,
    pub y: f64,
}

impl PositionRecord {
    pub fn from_estimate(
        tag_id: impl Into<String>,
        timestamp_ms: u64,
        estimate: PositionEstimate,
    ) -> Self {
        Self {
            tag_id: tag_id.into(),
            timestamp_ms,
            x: estimate.x,
            y: estimate.y,
        }
    }
}
