//! Core types and constants for the tag positioning system

pub mod constants;
pub mod registry;
pub mod types;

pub use constants::*;
pub use registry::AnchorRegistry;
pub use types::*;
