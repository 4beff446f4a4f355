//! Persistent matcher settings and host state

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::types::{LoudnessKind, SideSelector};
use crate::{DEFAULT_BOUND_DB, DEFAULT_TARGET_LUFS};

/// User-facing policy, as stored in a host's state blob
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Keep the main peak at or below 0 dBFS
    pub ceiling: bool,
    /// Loudness definition to compare
    pub loudness: LoudnessKind,
    /// Reference to match against
    pub side: SideSelector,
    /// Maximum correction in either direction (dB)
    pub bound_db: f64,
    /// Absolute target (LUFS), used with [`SideSelector::Value`]
    pub target_lufs: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            ceiling: false,
            loudness: LoudnessKind::default(),
            side: SideSelector::default(),
            bound_db: DEFAULT_BOUND_DB,
            target_lufs: DEFAULT_TARGET_LUFS,
        }
    }
}

impl MatchSettings {
    /// Reject values the tracker cannot use
    pub fn validate(&self) -> Result<()> {
        if !self.bound_db.is_finite() || self.bound_db < 0.0 {
            return Err(MatchError::invalid_setting("bound_db", self.bound_db));
        }
        if !self.target_lufs.is_finite() {
            return Err(MatchError::invalid_setting("target_lufs", self.target_lufs));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Everything a tracker needs to resume: settings plus encoded history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    #[serde(default)]
    pub settings: MatchSettings,
    /// Base64 history records
    #[serde(default)]
    pub history: String,
}

impl TrackerState {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
