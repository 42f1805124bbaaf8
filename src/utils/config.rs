//! Configuration management for Liveframe
//!
//! This module handles loading and managing the playback core
//! configuration from config files and environment variables.

use crate::session::SessionConfig;
use crate::utils::error::{IntoLiveframeError, LiveframeError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Playback resilience tuning
    pub player: PlayerConfig,

    /// Adaptive playback session tuning
    pub session: SessionConfig,

    /// Overlay interaction tuning
    pub overlay: OverlayConfig,

    /// General application settings
    pub general: GeneralConfig,
}

/// Playback resilience configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Automatic retry budget for fatal stream errors
    pub max_retries: u32,

    /// Window in which repeated errors are reported as one (ms)
    pub error_debounce_ms: u64,

    /// Distance from the live edge still considered "live" (seconds)
    pub live_edge_threshold_secs: f64,

    /// Durations beyond this are treated as live streams (seconds)
    pub live_duration_threshold_secs: f64,

    /// Controls auto-hide delay while playing (ms)
    pub controls_hide_ms: u64,

    /// Initial volume (0.0 - 1.0)
    pub default_volume: f32,
}

/// Overlay interaction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Minimum overlay width kept visible when dragging (screen px)
    pub min_footprint_width: f32,

    /// Minimum overlay height kept visible when dragging (screen px)
    pub min_footprint_height: f32,

    /// Quiet period before a drag position is persisted (ms)
    pub persist_debounce_ms: u64,
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            error_debounce_ms: 5000,
            live_edge_threshold_secs: 10.0,
            live_duration_threshold_secs: 86_400.0,
            controls_hide_ms: 3000,
            default_volume: 1.0,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            min_footprint_width: 50.0,
            min_footprint_height: 20.0,
            persist_debounce_ms: 300,
        }
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from various sources
    ///
    /// Configuration is loaded in the following order (later sources
    /// override earlier):
    /// 1. Default values
    /// 2. User config file (~/.config/liveframe/config.toml on Linux)
    /// 3. Environment variables (LIVEFRAME_* prefix)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config = Self::load_from(&user_path)?;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).config_err("Failed to read config file")?;
        toml::from_str(&contents).config_err("Failed to parse config file")
    }

    /// Save configuration to user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| LiveframeError::Config("Cannot determine user config path".to_string()))?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).config_err("Failed to create config directory")?;
        }

        let toml = toml::to_string_pretty(self).config_err("Failed to serialize config")?;
        std::fs::write(path, toml).config_err("Failed to write config file")?;

        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(volume) = std::env::var("LIVEFRAME_DEFAULT_VOLUME") {
            self.player.default_volume = volume
                .parse()
                .map_err(|_| LiveframeError::Config("Invalid LIVEFRAME_DEFAULT_VOLUME".to_string()))?;
        }

        if let Ok(retries) = std::env::var("LIVEFRAME_MAX_RETRIES") {
            self.player.max_retries = retries
                .parse()
                .map_err(|_| LiveframeError::Config("Invalid LIVEFRAME_MAX_RETRIES".to_string()))?;
        }

        if let Ok(log_level) = std::env::var("LIVEFRAME_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.player.default_volume) {
            return Err(LiveframeError::Config(
                "Default volume must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.player.max_retries == 0 {
            return Err(LiveframeError::Config(
                "Retry budget must be non-zero".to_string(),
            ));
        }

        if self.overlay.min_footprint_width <= 0.0 || self.overlay.min_footprint_height <= 0.0 {
            return Err(LiveframeError::Config(
                "Overlay footprint must be positive".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(LiveframeError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        Ok(())
    }

    /// Get user config file path
    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("liveframe").join("config.toml"))
    }
}
