//! Loudness measurement for Loudness Match
//!
//! Feeds the main and side signals through EBU R128 meters and hands
//! [`Measurement`](lmatch_core::Measurement)s to a
//! [`GainTracker`](lmatch_core::GainTracker).
//!
//! ```text
//! main ─┐     ┌──────────────────┐  Measurement  ┌──────────────┐
//!       ├───► │ LoudnessMonitor  │ ────────────► │ GainTracker  │
//! side ─┘     └──────────────────┘               └──────────────┘
//! ```

#![deny(unsafe_code)]

mod error;
mod monitor;

pub use error::{MonitorError, Result};
pub use monitor::{LoudnessMonitor, MonitorConfig};
