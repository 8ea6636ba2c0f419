//! Host settings
//!
//! Loaded from an optional JSON file; anything missing or unreadable falls
//! back to the defaults. Game timings and physics are not host settings: a
//! session built from these always runs on [`Tuning::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Tuning;
use crate::sim::arena::Arena;

/// How the autoplay host chooses where to drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DropStrategy {
    /// Uniform across the arena
    #[default]
    Random,
    /// Always the middle
    Center,
    /// Left to right and back
    Sweep,
}

impl DropStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropStrategy::Random => "random",
            DropStrategy::Center => "center",
            DropStrategy::Sweep => "sweep",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "random" | "rand" => Some(DropStrategy::Random),
            "center" | "centre" | "middle" => Some(DropStrategy::Center),
            "sweep" => Some(DropStrategy::Sweep),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Host viewport size in pixels; the arena width is capped separately
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Fixed seed; `None` seeds from the clock
    pub seed: Option<u64>,
    /// Autoplay stops after this much simulated time (seconds)
    pub max_play_secs: u64,
    pub strategy: DropStrategy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            viewport_width: 400.0,
            viewport_height: 800.0,
            seed: None,
            max_play_secs: 600,
            strategy: DropStrategy::Random,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from `path`, using defaults if it is missing or invalid
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not read {}: {}; using default settings", path.display(), e);
                return Self::default();
            }
        };
        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Invalid settings in {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    pub fn arena(&self) -> Arena {
        Arena::from_viewport(self.viewport_width, self.viewport_height)
    }

    /// Balance values for a session; always the compile-time defaults
    pub fn tuning(&self) -> Tuning {
        Tuning::default()
    }
}
