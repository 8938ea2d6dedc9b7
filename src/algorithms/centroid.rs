//! Inverse-square weighted centroid positioning

use crate::core::{AnchorRegistry, ObservationBatch, PositionEstimate, RSSI_WINDOW};
use crate::processing::SignalHistoryStore;
use crate::validation::{PositioningError, PositioningResult};
use nalgebra::Vector2;
use std::sync::Arc;

/// Weighted-centroid position estimator for a single tag.
///
/// Consumes one [`ObservationBatch`] at a time: readings are folded into
/// the per-anchor smoothing windows, each contributing anchor gets the
/// inverse square of its smoothed RSSI as weight, and the estimate is the
/// weight-normalized centroid of the registered anchor coordinates. The
/// estimator itself carries no state beyond its history store; tracking
/// several tags concurrently means one estimator per tag.
#[derive(Debug, Clone)]
pub struct PositionEstimator {
    registry: Arc<AnchorRegistry>,
    history: SignalHistoryStore,
}

impl PositionEstimator {
    /// Create an estimator with the default smoothing window
    pub fn new(registry: Arc<AnchorRegistry>) -> Self {
        Self::with_window(registry, RSSI_WINDOW)
    }

    /// Create an estimator with a custom smoothing window capacity
    pub fn with_window(registry: Arc<AnchorRegistry>, capacity: usize) -> Self {
        Self {
            registry,
            history: SignalHistoryStore::new(capacity),
        }
    }

    /// Read access to the per-anchor smoothing windows
    pub fn history(&self) -> &SignalHistoryStore {
        &self.history
    }

    /// Inverse-square weight for an anchor's current smoothed signal.
    ///
    /// The raw dBm mean feeds `1 / mean²` directly: a numerically larger
    /// perceived signal pulls the centroid harder toward that anchor. A
    /// smoothed value of exactly zero has no defined weight and excludes
    /// the anchor for the cycle.
    pub fn weight_of(&self, anchor_id: &str) -> PositioningResult<f64> {
        let smoothed = self.history.smoothed_value(anchor_id)?;
        if smoothed == 0.0 {
            return Err(PositioningError::InvalidWeight {
                anchor_id: anchor_id.to_string(),
                smoothed,
            });
        }
        Ok(1.0 / (smoothed * smoothed))
    }

    /// Estimate the tag position for one observation cycle.
    ///
    /// Readings naming an unregistered anchor are excluded. Registered
    /// readings update the smoothing windows in batch order, duplicates
    /// included; each contributing anchor is then weighted once. Anchors
    /// whose weight is undefined drop out of the cycle. With no surviving
    /// anchor there is no estimate, reported as [`PositioningError::NoValidAnchors`]
    /// rather than a fabricated position.
    pub fn estimate(&mut self, batch: &ObservationBatch) -> PositioningResult<PositionEstimate> {
        let mut contributing: Vec<&str> = Vec::new();
        for reading in &batch.readings {
            if !self.registry.contains(&reading.anchor_id) {
                continue;
            }
            self.history.record_sample(&reading.anchor_id, reading.rssi);
            if !contributing.contains(&reading.anchor_id.as_str()) {
                contributing.push(reading.anchor_id.as_str());
            }
        }

        let mut weighted_sum: Vector2<f64> = Vector2::zeros();
        let mut sum_weights = 0.0;
        let mut surviving = 0usize;

        for &anchor_id in &contributing {
            let weight = match self.weight_of(anchor_id) {
                Ok(weight) => weight,
                Err(_) => continue,
            };
            let Some(coordinate) = self.registry.coordinate_of(anchor_id) else {
                continue;
            };

            weighted_sum += coordinate.to_vector2() * weight;
            sum_weights += weight;
            surviving += 1;
        }

        if surviving == 0 || sum_weights == 0.0 {
            return Err(PositioningError::NoValidAnchors {
                observed: batch.readings.len(),
                registered: contributing.len(),
            });
        }

        let centroid = weighted_sum / sum_weights;
        Ok(PositionEstimate::new(centroid.x, centroid.y))
    }
}
