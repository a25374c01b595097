// ── Playback domain types ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::item::Item;

/// Repeat mode shared by every engine.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RepeatMode {
    #[default]
    Off,
    Track,
    Context,
}

impl RepeatMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Track => "track",
            Self::Context => "context",
        }
    }

    /// `(repeating_track, repeating_context)` flags.
    pub fn flags(self) -> (bool, bool) {
        match self {
            Self::Off => (false, false),
            Self::Track => (true, false),
            Self::Context => (false, true),
        }
    }

    pub fn from_flags(track: bool, context: bool) -> Self {
        if track {
            Self::Track
        } else if context {
            Self::Context
        } else {
            Self::Off
        }
    }
}

/// A playback target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    /// 0–100.
    #[serde(rename = "volume_percent")]
    pub volume: u32,
    #[serde(rename = "is_active")]
    pub active: bool,
    #[serde(rename = "is_restricted")]
    pub restricted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub progress_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    pub device: Device,
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Queue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currently_playing: Option<Item>,
    pub queue: Vec<Item>,
}
