//! Error types for loudness monitoring

use thiserror::Error;

/// Result type for monitor operations
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors that can occur while measuring loudness
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Invalid sample rate
    #[error("Invalid sample rate: {0} Hz (must be between 8000 and 384000)")]
    InvalidSampleRate(u32),

    /// Invalid channel count
    #[error("Invalid channel count: {0} (must be 1-8)")]
    InvalidChannelCount(u32),

    /// Update interval must be a positive duration
    #[error("Invalid update interval: {0} s")]
    InvalidInterval(f64),

    /// Main and side blocks differ in length
    #[error("Block length mismatch: main has {main} samples, side has {side}")]
    LengthMismatch { main: usize, side: usize },

    /// Block length is not a whole number of frames
    #[error("Sample count {len} is not divisible by channel count {channels}")]
    PartialFrame { len: usize, channels: u32 },

    /// EBU R128 analysis error
    #[error("EBU R128 analysis failed: {0}")]
    AnalysisError(String),
}

impl From<ebur128::Error> for MonitorError {
    fn from(err: ebur128::Error) -> Self {
        Self::AnalysisError(format!("{:?}", err))
    }
}
