//! Positioning algorithms

pub mod centroid;

pub use centroid::PositionEstimator;
