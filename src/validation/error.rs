//! Error classification for the positioning core

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for core positioning operations
pub type PositioningResult<T> = Result<T, PositioningError>;

/// Failures raised while turning an observation batch into an estimate.
///
/// Everything here is recoverable: `EmptyHistory` and `InvalidWeight`
/// exclude a single anchor from the current cycle, `NoValidAnchors` means
/// the whole cycle produced no estimate. None of them may abort the
/// ingestion loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PositioningError {
    /// No RSSI sample has ever been recorded for this anchor
    EmptyHistory { anchor_id: String },
    /// Smoothed signal of zero, for which the inverse-square weight is
    /// undefined
    InvalidWeight { anchor_id: String, smoothed: f64 },
    /// The batch yielded no anchor usable for weighting
    NoValidAnchors {
        /// Readings present in the batch
        observed: usize,
        /// Readings that matched a registered anchor
        registered: usize,
    },
}

impl PositioningError {
    /// Whether the failure invalidates the whole cycle rather than a
    /// single anchor's contribution
    pub fn is_cycle_failure(&self) -> bool {
        matches!(self, PositioningError::NoValidAnchors { .. })
    }
}

impl fmt::Display for PositioningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositioningError::EmptyHistory { anchor_id } => {
                write!(f, "no RSSI history recorded for anchor {}", anchor_id)
            }
            PositioningError::InvalidWeight { anchor_id, smoothed } => {
                write!(
                    f,
                    "anchor {} has degenerate smoothed signal {} (inverse-square weight undefined)",
                    anchor_id, smoothed
                )
            }
            PositioningError::NoValidAnchors { observed, registered } => {
                write!(
                    f,
                    "no usable anchors in batch ({} readings, {} registered)",
                    observed, registered
                )
            }
        }
    }
}

impl std::error::Error for PositioningError {}
