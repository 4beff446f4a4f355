//! Loudness definitions, side selection and measurements

use serde::{Deserialize, Serialize};

/// Number of loudness definitions tracked per signal
pub const LOUDNESS_KINDS: usize = 3;

/// One loudness value per [`LoudnessKind`], indexed by [`LoudnessKind::index`]
pub type LoudnessValues<T> = [T; LOUDNESS_KINDS];

/// Loudness definition used to compare the two signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoudnessKind {
    /// 400 ms momentary loudness
    Momentary,
    /// 3 s short-term loudness
    #[default]
    ShortTerm,
    /// Gated integrated loudness since the last reset
    Integrated,
}

impl LoudnessKind {
    /// All definitions, in record order
    pub const ALL: [Self; LOUDNESS_KINDS] = [Self::Momentary, Self::ShortTerm, Self::Integrated];

    /// Position of this definition inside [`LoudnessValues`]
    pub fn index(self) -> usize {
        match self {
            Self::Momentary => 0,
            Self::ShortTerm => 1,
            Self::Integrated => 2,
        }
    }

    /// Map a parameter index back to a definition
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parse from string (for settings persistence)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "momentary" | "m" => Some(Self::Momentary),
            "short_term" | "shortterm" | "short-term" | "s" => Some(Self::ShortTerm),
            "integrated" | "i" => Some(Self::Integrated),
            _ => None,
        }
    }

    /// Convert to string for settings persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Momentary => "momentary",
            Self::ShortTerm => "short_term",
            Self::Integrated => "integrated",
        }
    }
}

/// What the main signal is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideSelector {
    /// Follow the loudness of the side (reference) signal
    #[default]
    Side,
    /// Follow a fixed absolute target value
    Value,
}

impl SideSelector {
    pub fn index(self) -> usize {
        match self {
            Self::Side => 0,
            Self::Value => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Side),
            1 => Some(Self::Value),
            _ => None,
        }
    }

    /// Parse from string (for settings persistence)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "side" | "reference" => Some(Self::Side),
            "value" | "absolute" | "target" => Some(Self::Value),
            _ => None,
        }
    }

    /// Convert to string for settings persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Side => "side",
            Self::Value => "value",
        }
    }

    pub fn uses_absolute_target(self) -> bool {
        self == Self::Value
    }
}

/// A completed measurement window delivered by a monitor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement<T> {
    /// Main signal loudness per definition (LUFS)
    pub main: LoudnessValues<T>,
    /// Side signal loudness per definition (LUFS)
    pub target: LoudnessValues<T>,
    /// Main signal peak over the window (dBFS)
    pub peak: T,
}
