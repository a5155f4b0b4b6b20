//! PunchMeter Motion Model
//!
//! Defines the data contracts shared by sources, the session engine and
//! the CLI:
//! - **Samples:** instantaneous 3-axis accelerometer readings
//! - **Traces:** recorded sample sequences in JSONL form, for replay
//! - **Results:** the tiered outcome of a finished session
//!
//! Magnitudes are in m/s², the unit accelerometer backends report.

pub mod result;
pub mod sample;
pub mod trace;

pub use result::*;
pub use sample::*;
pub use trace::*;
