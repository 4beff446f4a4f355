//! Loudness Match core
//!
//! Tracks the loudness difference between a main signal and a side (reference)
//! signal over the playback timeline, and turns it into a gain for the main
//! signal at any position.
//!
//! This crate provides:
//! - [`Snapshot`]: immutable loudness measurements valid at a sample position
//! - [`GainTracker`]: position-ordered snapshot history with lock-free policy
//!   parameters and a locality-biased interval lookup
//! - Persistence of the history as base64 records, and of the policy as JSON
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  Measurement  ┌──────────────┐  get_diff()  ┌────────────┐
//! │   Monitor   │ ────────────► │ GainTracker  │ ───────────► │ Audio path │
//! └─────────────┘  learn()      └──────────────┘  gain (dB)   └────────────┘
//!                                      ▲
//!                        setters ──────┘
//! ```
//!
//! # Example
//!
//! ```
//! use lmatch_core::{db_to_linear, GainTracker, LoudnessKind, Measurement};
//!
//! let tracker = GainTracker::<f64>::new();
//! tracker.set_loudness_kind(LoudnessKind::Integrated);
//!
//! tracker.set_position(96_000);
//! tracker.learn(&Measurement {
//!     main: [-24.0, -24.0, -24.0],
//!     target: [-18.0, -18.0, -18.0],
//!     peak: -10.0,
//! });
//!
//! tracker.set_position(1024);
//! let gain_db = tracker.get_diff();
//! assert_eq!(gain_db, 6.0);
//! assert!((db_to_linear(gain_db) - 1.995).abs() < 0.001);
//! ```

#![forbid(unsafe_code)]

mod error;
mod params;
pub mod persist;
mod sample;
mod search;
mod settings;
mod snapshot;
mod tracker;
mod types;

pub use error::{MatchError, Result};
pub use params::{GainPolicy, MatchParams};
pub use sample::{AtomicSample, Sample};
pub use search::find_from_hint;
pub use settings::{MatchSettings, TrackerState};
pub use snapshot::Snapshot;
pub use tracker::{GainTracker, History};
pub use types::{LoudnessKind, LoudnessValues, Measurement, SideSelector, LOUDNESS_KINDS};

/// Default maximum correction in dB
pub const DEFAULT_BOUND_DB: f64 = 24.0;

/// Default absolute target (-14 LUFS, common for streaming platforms)
pub const DEFAULT_TARGET_LUFS: f64 = -14.0;

/// Loudness reported for silence (absolute gate of BS.1770)
pub const SILENCE_FLOOR_LUFS: f64 = -70.0;

/// Sample peak reported for a silent window
pub const SILENCE_FLOOR_DBFS: f64 = -70.0;

/// Convert a gain in dB to a linear factor
pub fn db_to_linear(gain_db: f64) -> f64 {
    10.0_f64.powf(gain_db / 20.0)
}
