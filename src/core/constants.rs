//! System-wide constants and default parameters

/// Number of recent RSSI samples kept per anchor for smoothing
pub const RSSI_WINDOW: usize = 5;

/// Default SHA-512 chain length applied to a record before sealing
pub const DIGEST_ITERATIONS: u32 = 1_000_000;
