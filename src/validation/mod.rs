//! Failure taxonomy for the positioning core

pub mod error;

pub use error::{PositioningError, PositioningResult};
