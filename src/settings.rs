//! Game settings and preferences
//!
//! Stored as JSON under the user's config directory. A missing or malformed
//! file falls back to defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::SIM_HZ;
use crate::error::Result;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    /// Simulation and render rate
    pub frame_rate: u32,

    /// Where the high score table is kept
    pub high_score_path: PathBuf,

    // === Accessibility ===
    /// Reduced motion (no damage, wall or nuke flashes)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            frame_rate: SIM_HZ,
            high_score_path: PathBuf::from(".babaam_high_score.json"),
            reduced_motion: false,
        }
    }
}

impl Settings {
    const FILE_NAME: &'static str = "settings.json";

    /// `$HOME/.config/babaam/settings.json`, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("babaam")
                .join(Self::FILE_NAME)
        })
    }

    /// Load settings from the default location
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::info!("No home directory, using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from a file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings.sanitized()
            }
            Err(e) => {
                log::info!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save settings to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved");
        Ok(())
    }

    /// Clamp out-of-range values from hand-edited files
    fn sanitized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        if self.frame_rate == 0 {
            self.frame_rate = SIM_HZ;
        }
        self
    }

    /// Effective flash effects (respects reduced_motion)
    pub fn effective_flashes(&self) -> bool {
        !self.reduced_motion
    }
}
