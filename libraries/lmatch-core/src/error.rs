//! Error types for loudness tracking

use thiserror::Error;

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, MatchError>;

/// Errors that can occur while configuring or restoring a tracker
#[derive(Error, Debug)]
pub enum MatchError {
    /// Persisted history is not valid base64
    #[error("Invalid history encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded byte length does not split into whole records
    #[error("History length {len} bytes is not a multiple of the {record_size}-byte record size")]
    RecordLength { len: usize, record_size: usize },

    /// Decoded records are not strictly increasing in position
    #[error("History record {index} at position {position} does not follow position {previous}")]
    UnorderedHistory {
        index: usize,
        position: i64,
        previous: i64,
    },

    /// Decoded record carries a NaN or infinite value
    #[error("History record {index} at position {position} holds a non-finite value")]
    NonFiniteRecord { index: usize, position: i64 },

    /// Settings value out of range
    #[error("Invalid setting {name}: {value}")]
    InvalidSetting { name: &'static str, value: f64 },

    /// Settings or state (de)serialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl MatchError {
    /// Create an invalid setting error
    pub fn invalid_setting(name: &'static str, value: f64) -> Self {
        Self::InvalidSetting { name, value }
    }
}
