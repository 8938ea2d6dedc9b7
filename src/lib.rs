//! BLE Tag Positioning System
//!
//! Estimates the 2D location of a mobile BLE tag from RSSI reports
//! published by fixed anchor receivers: per-anchor readings are smoothed
//! over a short sliding window and combined into an inverse-square
//! weighted centroid over the anchors' known coordinates.

pub mod algorithms;
pub mod core;
pub mod processing;
pub mod securer;
pub mod telemetry;
pub mod transport;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use crate::algorithms::PositionEstimator;
pub use crate::core::{
    AnchorReading, AnchorRegistry, Coordinate, ObservationBatch, PositionEstimate, PositionRecord,
    RSSI_WINDOW,
};
pub use crate::processing::{DecodeError, ScanDecoder, SignalHistoryStore};
pub use crate::securer::{OutputSecurer, SecurerError};
pub use crate::telemetry::{TelemetryError, TelemetryLog};
pub use crate::transport::{ChannelHandler, MqttIngestor, ScanHandler, TransportError};
pub use crate::utils::config::SystemConfig;
pub use crate::validation::{PositioningError, PositioningResult};
