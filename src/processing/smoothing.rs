//! Per-anchor RSSI smoothing windows

use crate::core::RSSI_WINDOW;
use crate::validation::{PositioningError, PositioningResult};
use std::collections::{HashMap, VecDeque};

/// Bounded FIFO history of recent RSSI samples for each anchor.
///
/// The fixed-size window acts as a low-pass filter on noisy RSSI: the
/// default capacity of five trades responsiveness to tag movement against
/// smoothing of multipath and noise spikes. Histories are created lazily
/// on the first observation of an anchor and persist for the lifetime of
/// the store.
#[derive(Debug, Clone)]
pub struct SignalHistoryStore {
    /// Window capacity shared by every anchor's history
    capacity: usize,
    histories: HashMap<String, VecDeque<i16>>,
}

impl Default for SignalHistoryStore {
    fn default() -> Self {
        Self::new(RSSI_WINDOW)
    }
}

impl SignalHistoryStore {
    /// Create a store whose windows hold `capacity` samples
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            histories: HashMap::new(),
        }
    }

    /// Window capacity configured for this store
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a sample to the anchor's history, evicting the oldest
    /// sample once the window is full. Anchors do not need to be known in
    /// advance; a first sample creates the history.
    pub fn record_sample(&mut self, anchor_id: &str, rssi: i16) {
        let history = self
            .histories
            .entry(anchor_id.to_string())
            .or_insert_with(|| VecDeque::with_capacity(self.capacity));

        history.push_back(rssi);
        while history.len() > self.capacity {
            history.pop_front();
        }
    }

    /// Arithmetic mean of the anchor's current window.
    ///
    /// Fails with `EmptyHistory` when no sample has ever been recorded
    /// for the anchor, so the mean never divides by zero.
    pub fn smoothed_value(&self, anchor_id: &str) -> PositioningResult<f64> {
        let history = self
            .histories
            .get(anchor_id)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| PositioningError::EmptyHistory {
                anchor_id: anchor_id.to_string(),
            })?;

        let sum: i64 = history.iter().map(|&rssi| i64::from(rssi)).sum();
        Ok(sum as f64 / history.len() as f64)
    }

    /// Current window contents for an anchor, oldest first
    pub fn history(&self, anchor_id: &str) -> Option<&VecDeque<i16>> {
        self.histories.get(anchor_id)
    }

    /// Number of anchors with at least one recorded sample
    pub fn tracked_anchors(&self) -> usize {
        self.histories.len()
    }

    /// Drop all recorded histories
    pub fn clear(&mut self) {
        self.histories.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_fifo_eviction() {
        let mut store = SignalHistoryStore::new(5);
        for rssi in [-70, -72, -68, -75, -71, -60] {
            store.record_sample("ESP32-01", rssi);
        }

        let history: Vec<i16> = store.history("ESP32-01").unwrap().iter().copied().collect();
        assert_eq!(history, vec![-72, -68, -75, -71, -60]);
    }

    #[test]
    fn test_smoothed_value_uses_only_last_window() {
        let mut store = SignalHistoryStore::new(5);

        // Seven samples; the first two must have no effect on the mean.
        for rssi in [-10, -90, -70, -70, -70, -70, -70] {
            store.record_sample("ESP32-01", rssi);
        }

        let smoothed = store.smoothed_value("ESP32-01").unwrap();
        assert!((smoothed - (-70.0)).abs() < 1e-12);
    }

    #[test]
    fn test_smoothed_value_partial_window() {
        let mut store = SignalHistoryStore::default();
        store.record_sample("ESP32-01", -70);
        store.record_sample("ESP32-01", -74);

        let smoothed = store.smoothed_value("ESP32-01").unwrap();
        assert!((smoothed - (-72.0)).abs() < 1e-12);
    }

    #[test]
    fn test_never_sampled_anchor_is_empty_history() {
        let store = SignalHistoryStore::default();

        let error = store.smoothed_value("ESP32-01").unwrap_err();
        assert_eq!(
            error,
            PositioningError::EmptyHistory {
                anchor_id: "ESP32-01".to_string()
            }
        );
    }

    #[test]
    fn test_histories_created_lazily() {
        let mut store = SignalHistoryStore::default();
        assert_eq!(store.tracked_anchors(), 0);

        store.record_sample("ESP32-01", -70);
        store.record_sample("ESP32-02", -60);

        assert_eq!(store.tracked_anchors(), 2);
        assert_eq!(store.history("ESP32-03"), None);
    }

    #[test]
    fn test_histories_are_independent_per_anchor() {
        let mut store = SignalHistoryStore::new(5);
        store.record_sample("ESP32-01", -70);
        store.record_sample("ESP32-02", -40);

        assert!((store.smoothed_value("ESP32-01").unwrap() - (-70.0)).abs() < 1e-12);
        assert!((store.smoothed_value("ESP32-02").unwrap() - (-40.0)).abs() < 1e-12);
    }
}
