//! Signal smoothing and message decoding

pub mod decoder;
pub mod smoothing;

pub use decoder::{DecodeError, ScanDecoder};
pub use smoothing::SignalHistoryStore;
