//! PunchMeter Common Utilities
//!
//! Shared infrastructure for all PunchMeter crates:
//! - Error types and result aliases
//! - Session clock for timing a sampling round
//! - Tracing/logging initialization
//! - Configuration loading and the named session constants

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
