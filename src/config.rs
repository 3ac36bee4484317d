// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::source;
use crate::errors::{AppError, AppResult};
use crate::filters::FilterMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory name under the user's config directory
const CONFIG_DIR_NAME: &str = "visionedge";

/// Config file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Persistent user settings
///
/// Every field has a default, so a partial file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filter mode selected at startup
    pub default_mode: FilterMode,
    /// Frame rate of the built-in sources
    pub fps: u32,
    /// Test pattern width
    pub width: u32,
    /// Test pattern height
    pub height: u32,
    /// Where exported frames go (pictures directory when unset)
    pub export_dir: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: FilterMode::Edge,
            fps: source::DEFAULT_FPS,
            width: source::DEFAULT_WIDTH,
            height: source::DEFAULT_HEIGHT,
            export_dir: None,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> AppResult<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`
    ///
    /// A missing file yields the defaults; an unreadable or malformed file
    /// is an error.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(AppError::Config(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut config: Config = serde_json::from_str(&contents)?;
        config.normalize();
        debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("Failed to create config dir: {}", e)))?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| AppError::Storage(format!("Failed to write config: {}", e)))?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Write to the default location
    pub fn save(&self) -> AppResult<()> {
        let path = Self::config_path()
            .ok_or_else(|| AppError::Config("No config directory available".to_string()))?;
        self.save_to(&path)
    }

    /// Clamp values into their accepted ranges
    pub fn normalize(&mut self) {
        self.fps = self.fps.clamp(source::MIN_FPS, source::MAX_FPS);
        if self.width == 0 {
            self.width = source::DEFAULT_WIDTH;
        }
        if self.height == 0 {
            self.height = source::DEFAULT_HEIGHT;
        }
    }
}
